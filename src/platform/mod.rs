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

//! Platform controllers
//!
//! On macOS the controller is the `AppleSMC` IOKit service. Other targets have
//! no such service; their controller reports `ServiceNotFound` on open so the
//! host entry point degrades to its `0.0` fallback.

#[cfg(target_os = "macos")]
mod iokit;

#[cfg(target_os = "macos")]
pub use iokit::IoKitController as SystemController;

#[cfg(not(target_os = "macos"))]
pub use self::unsupported::UnsupportedController as SystemController;

/// IOKit class name of the controller service
pub const SERVICE_NAME: &str = "AppleSMC";

#[cfg(not(target_os = "macos"))]
mod unsupported {
    use super::SERVICE_NAME;
    use crate::error::{Result, SmcError};
    use crate::session::{Connection, Controller};
    use crate::wire::KeyData;

    /// Controller for targets without an SMC service
    #[derive(Debug, Default, Clone, Copy)]
    pub struct UnsupportedController;

    impl UnsupportedController {
        pub fn new() -> Self {
            Self
        }
    }

    impl Controller for UnsupportedController {
        fn open(&self) -> Result<Connection> {
            Err(SmcError::ServiceNotFound(format!(
                "{} (only available on macOS)",
                SERVICE_NAME
            )))
        }

        fn call(&self, _conn: Connection, _selector: u32, _input: &KeyData) -> Result<KeyData> {
            Err(SmcError::NotSupported("controller calls require macOS".into()))
        }

        fn close(&self, _conn: Connection) {}
    }

}
