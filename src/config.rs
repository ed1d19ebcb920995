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

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SmcError};
use crate::key::Key;
use crate::reader::SizePolicy;
use crate::sensors::CpuKeys;

const MAX_CORE_KEYS: usize = 64;

#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    C,
    F,
    K,
}

impl Metric {
    pub fn convert_temp(self, celsius: f64) -> (f64, &'static str) {
        match self {
            Metric::C => (celsius, "°C"),
            Metric::F => (celsius * 9.0 / 5.0 + 32.0, "°F"),
            Metric::K => (celsius + 273.15, "K"),
        }
    }
}

impl FromStr for Metric {
    type Err = SmcError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "c" => Ok(Metric::C),
            "f" => Ok(Metric::F),
            "k" => Ok(Metric::K),
            other => Err(SmcError::invalid_config("metric", format!("unknown unit {:?}", other))),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SmcConfig {
    /// Display unit for temperatures
    #[serde(default)]
    pub metric: Metric,
    #[serde(default)]
    pub size_policy: SizePolicy,
    /// Keys sampled by the CPU temperature aggregate
    #[serde(default)]
    pub cpu_keys: CpuKeys,
}

pub fn config_path() -> PathBuf {
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        return Path::new(&xdg).join("smcread").join("config.json");
    }
    if let Ok(home) = env::var("HOME") {
        return Path::new(&home)
            .join(".config")
            .join("smcread")
            .join("config.json");
    }
    PathBuf::from("/etc/smcread/config.json")
}

/// Load the user config, or the defaults when no config file exists.
pub fn load_config() -> Result<SmcConfig> {
    let path = config_path();
    if !path.exists() {
        debug!(path = %path.display(), "no config file, using defaults");
        return Ok(SmcConfig::default());
    }
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<SmcConfig> {
    let data = fs::read_to_string(path)?;
    let cfg: SmcConfig = serde_json::from_str(&data)?;
    validate_config(&cfg)?;
    Ok(cfg)
}

pub fn save_config_to(path: &Path, cfg: &SmcConfig) -> Result<()> {
    validate_config(cfg)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(cfg)?)?;
    Ok(())
}

pub fn validate_config(cfg: &SmcConfig) -> Result<()> {
    if Key::new(&cfg.cpu_keys.package).is_err() {
        return Err(SmcError::invalid_config(
            "cpu_keys.package",
            format!("{:?} is not a 4-character key", cfg.cpu_keys.package),
        ));
    }
    if cfg.cpu_keys.cores.len() > MAX_CORE_KEYS {
        return Err(SmcError::invalid_config(
            "cpu_keys.cores",
            format!("too many core keys (max {})", MAX_CORE_KEYS),
        ));
    }
    for (i, core) in cfg.cpu_keys.cores.iter().enumerate() {
        if Key::new(core).is_err() {
            return Err(SmcError::invalid_config(
                "cpu_keys.cores",
                format!("entry #{} {:?} is not a 4-character key", i + 1, core),
            ));
        }
    }
    Ok(())
}
