/*
 * This file is part of smcread.
 *
 * Copyright (C) 2025 smcread contributors
 *
 * smcread is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * smcread is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with smcread. If not, see <https://www.gnu.org/licenses/>.
 */

//! Sensor reads
//!
//! [`SensorReader`] wraps a [`Controller`] and performs complete logical reads:
//! open, key info, byte fetch, decode, close. [`SensorReader::read_sensor`] is
//! the host entry point and never fails: any error becomes `0.0`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::decode::decode;
use crate::error::Result;
use crate::key::Key;
use crate::platform::SystemController;
use crate::reader::{read_key, SizePolicy};
use crate::session::{Controller, Session};

/// A decoded key value along with what it was decoded from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub key: String,
    pub data_type: String,
    pub size: u32,
    pub value: f64,
}

/// Keys sampled for the CPU temperature aggregate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CpuKeys {
    pub package: String,
    pub cores: Vec<String>,
}

impl Default for CpuKeys {
    fn default() -> Self {
        Self {
            package: "TC0P".to_string(),
            cores: (1..=8).map(|i| format!("TC{}C", i)).collect(),
        }
    }
}

/// CPU temperatures in °C; only positive readings are counted
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CpuTemperature {
    pub main: Option<f64>,
    pub cores: Vec<f64>,
    pub max: Option<f64>,
}

pub struct SensorReader<C: Controller> {
    controller: C,
    size_policy: SizePolicy,
}

impl<C: Controller> SensorReader<C> {
    pub fn new(controller: C) -> Self {
        Self {
            controller,
            size_policy: SizePolicy::default(),
        }
    }

    pub fn with_size_policy(mut self, size_policy: SizePolicy) -> Self {
        self.size_policy = size_policy;
        self
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    /// Read and decode one key in its own session, keeping error detail.
    pub fn read(&self, name: &str) -> Result<Reading> {
        let key = Key::new(name)?;
        let mut session = Session::open(&self.controller)?;
        let raw = read_key(&mut session, key, self.size_policy)?;
        session.close();

        Ok(Reading {
            key: key.to_string(),
            data_type: raw.data_type.to_string(),
            size: raw.size,
            value: decode(&raw),
        })
    }

    /// Read one key, returning `0.0` on any failure.
    pub fn read_sensor(&self, name: &str) -> f64 {
        match self.read(name) {
            Ok(reading) => reading.value,
            Err(e) => {
                debug!(key = name, error = %e, "sensor read failed, using 0.0");
                0.0
            }
        }
    }

    /// Read several keys inside one session. Entries that fail are `0.0`;
    /// if the session cannot be opened every entry is `0.0`.
    pub fn read_many<I, S>(&self, names: I) -> Vec<(String, f64)>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<String> = names.into_iter().map(|s| s.as_ref().to_string()).collect();
        let mut session = match Session::open(&self.controller) {
            Ok(session) => session,
            Err(e) => {
                debug!(error = %e, "controller unavailable, all readings 0.0");
                return names.into_iter().map(|n| (n, 0.0)).collect();
            }
        };

        let readings: Vec<(String, f64)> = names
            .into_iter()
            .map(|name| {
                let value = Key::new(&name)
                    .and_then(|key| read_key(&mut session, key, self.size_policy))
                    .map(|raw| decode(&raw))
                    .unwrap_or_else(|e| {
                        debug!(key = %name, error = %e, "sensor read failed, using 0.0");
                        0.0
                    });
                (name, value)
            })
            .collect();
        session.close();
        readings
    }

    /// Package and per-core CPU temperatures, read in one session.
    pub fn cpu_temperature(&self, keys: &CpuKeys) -> CpuTemperature {
        let names = std::iter::once(keys.package.as_str()).chain(keys.cores.iter().map(String::as_str));
        let mut values = self.read_many(names).into_iter().map(|(_, v)| v);

        let mut result = CpuTemperature::default();
        if let Some(package) = values.next() {
            if package > 0.0 {
                result.main = Some(package);
                result.max = Some(package);
            }
        }
        for value in values.filter(|v| *v > 0.0) {
            result.cores.push(value);
            result.max = Some(result.max.map_or(value, |m| m.max(value)));
        }
        if !result.cores.is_empty() {
            result.main = Some(result.cores.iter().sum::<f64>() / result.cores.len() as f64);
        }
        result
    }
}

/// Read one key from the system controller; `0.0` on any failure.
pub fn read_sensor(key_name: &str) -> f64 {
    SensorReader::new(SystemController::new()).read_sensor(key_name)
}

/// CPU temperatures from the system controller using the default keys.
pub fn cpu_temperature() -> CpuTemperature {
    SensorReader::new(SystemController::new()).cpu_temperature(&CpuKeys::default())
}
