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

//! Simulated controller
//!
//! An in-memory [`Controller`] answering key-info and byte-fetch calls from a
//! key table, with failure injection and call accounting. Used by the test
//! suites and by hosts that need a controller without hardware.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use crate::error::{Result, SmcError};
use crate::key::{encode_key, TypeTag, KEY_LEN};
use crate::session::{Connection, Controller};
use crate::wire::{KeyData, KeyInfo, PAYLOAD_LEN, SMC_CMD_READ_BYTES, SMC_CMD_READ_KEYINFO};

/// kIOReturnNotFound, answered for keys missing from the table
pub const STATUS_NOT_FOUND: i32 = 0xe000_02f0_u32 as i32;
/// kIOReturnBadArgument, answered for unknown commands
pub const STATUS_BAD_ARGUMENT: i32 = 0xe000_02c2_u32 as i32;
/// kIOReturnNotOpen, answered for calls on a closed connection
pub const STATUS_NOT_OPEN: i32 = 0xe000_02cd_u32 as i32;

#[derive(Debug, Clone)]
struct SimKey {
    data_type: TypeTag,
    size: u32,
    bytes: [u8; PAYLOAD_LEN],
}

/// How a simulated `open` fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenFailure {
    ServiceNotFound,
    ConnectionRefused(i32),
}

#[derive(Debug, Default)]
struct SimState {
    next_conn: u32,
    live: HashSet<u32>,
    opens: usize,
    closes: usize,
    requests: Vec<KeyData>,
}

#[derive(Debug, Default)]
pub struct SimulatedController {
    keys: HashMap<u32, SimKey>,
    open_failure: Option<OpenFailure>,
    command_failures: HashMap<u8, i32>,
    fetch_size: Option<u32>,
    state: Mutex<SimState>,
}

impl SimulatedController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key; data beyond the payload capacity is dropped.
    pub fn with_key(mut self, name: [u8; KEY_LEN], data_type: TypeTag, data: &[u8]) -> Self {
        let len = data.len().min(PAYLOAD_LEN);
        let mut bytes = [0u8; PAYLOAD_LEN];
        bytes[..len].copy_from_slice(&data[..len]);
        self.keys.insert(
            encode_key(&name),
            SimKey {
                data_type,
                size: len as u32,
                bytes,
            },
        );
        self
    }

    /// Make every `open` fail.
    pub fn fail_open(mut self, failure: OpenFailure) -> Self {
        self.open_failure = Some(failure);
        self
    }

    /// Make every call carrying `command` fail with `status`.
    pub fn fail_command(mut self, command: u8, status: i32) -> Self {
        self.command_failures.insert(command, status);
        self
    }

    /// Report `size` in byte-fetch responses instead of echoing the request.
    pub fn report_fetch_size(mut self, size: u32) -> Self {
        self.fetch_size = Some(size);
        self
    }

    pub fn opens(&self) -> usize {
        self.state().opens
    }

    pub fn closes(&self) -> usize {
        self.state().closes
    }

    /// Connections opened and not yet closed
    pub fn open_sessions(&self) -> usize {
        self.state().live.len()
    }

    /// Every request record received, in order
    pub fn requests(&self) -> Vec<KeyData> {
        self.state().requests.clone()
    }

    /// Command bytes of every request received, in order
    pub fn commands(&self) -> Vec<u8> {
        self.state().requests.iter().map(|r| r.data8).collect()
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Controller for SimulatedController {
    fn open(&self) -> Result<Connection> {
        match self.open_failure {
            Some(OpenFailure::ServiceNotFound) => {
                return Err(SmcError::ServiceNotFound(crate::platform::SERVICE_NAME.to_string()))
            }
            Some(OpenFailure::ConnectionRefused(status)) => return Err(SmcError::ConnectionFailed(status)),
            None => {}
        }
        let mut state = self.state();
        state.next_conn += 1;
        let conn = state.next_conn;
        state.live.insert(conn);
        state.opens += 1;
        Ok(Connection::from_raw(conn))
    }

    fn call(&self, conn: Connection, _selector: u32, input: &KeyData) -> Result<KeyData> {
        {
            let mut state = self.state();
            if !state.live.contains(&conn.raw()) {
                return Err(SmcError::CallFailed(STATUS_NOT_OPEN));
            }
            state.requests.push(*input);
        }
        if let Some(&status) = self.command_failures.get(&input.data8) {
            return Err(SmcError::CallFailed(status));
        }

        let entry = self
            .keys
            .get(&input.key)
            .ok_or(SmcError::CallFailed(STATUS_NOT_FOUND))?;

        let mut output = KeyData {
            key: input.key,
            ..KeyData::default()
        };
        match input.data8 {
            SMC_CMD_READ_KEYINFO => {
                output.key_info = KeyInfo {
                    data_size: entry.size,
                    data_type: entry.data_type.encode(),
                    data_attributes: 0,
                };
            }
            SMC_CMD_READ_BYTES => {
                output.key_info.data_size = self.fetch_size.unwrap_or(input.key_info.data_size);
                output.bytes = entry.bytes;
            }
            _ => return Err(SmcError::CallFailed(STATUS_BAD_ARGUMENT)),
        }
        Ok(output)
    }

    fn close(&self, conn: Connection) {
        let mut state = self.state();
        state.live.remove(&conn.raw());
        state.closes += 1;
    }
}
