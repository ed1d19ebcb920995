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

//! smcread - read Apple System Management Controller sensor keys
//!
//! The controller exposes its sensors as four-character keys (`TC0P` is the
//! CPU proximity temperature, `F0Ac` the actual speed of fan 0). Each read is
//! a two-phase exchange over an open session: a key-info query for the value's
//! size and type tag, then a byte fetch. The bytes are decoded according to
//! the tag (`sp78`, `ui8 `/`ui16`/`ui32`, `fpe2`).
//!
//! # Example
//!
//! ```no_run
//! use smcread::{SensorReader, SystemController};
//!
//! let reader = SensorReader::new(SystemController::new());
//! let celsius = reader.read_sensor("TC0P");
//! let detailed = reader.read("F0Ac");
//! ```

pub mod config;
pub mod decode;
pub mod error;
pub mod key;
pub mod logger;
pub mod platform;
pub mod reader;
pub mod sensors;
pub mod session;
pub mod sim;
pub mod wire;

#[cfg(test)]
pub mod test_utils;

pub use config::{Metric, SmcConfig};
pub use decode::decode;
pub use error::{Result, SmcError};
pub use key::{decode_type_tag, encode_key, Key, TypeTag};
pub use platform::SystemController;
pub use reader::{read_key, RawValue, SizePolicy};
pub use sensors::{cpu_temperature, read_sensor, CpuKeys, CpuTemperature, Reading, SensorReader};
pub use session::{Connection, Controller, Session};
