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

//! Controller session
//!
//! [`Controller`] is the privileged service as seen from this crate: a lookup
//! that opens a connection, a fixed-size structured call, and a close.
//! [`Session`] owns one open connection and releases it when dropped, so every
//! exit path of a read (including `?` on a failed phase) closes exactly once.

use tracing::debug;

use crate::error::Result;
use crate::wire::KeyData;

/// Raw handle of an open connection to the controller service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Connection(u32);

impl Connection {
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Downstream privileged service: lookup, structured call primitive, close.
///
/// Implementations block for the full round trip of each operation. A
/// connection must not carry more than one in-flight call; [`Session`]
/// enforces this by requiring `&mut self` for calls.
#[cfg_attr(test, mockall::automock)]
pub trait Controller {
    /// Find the single controller service instance and connect to it.
    ///
    /// Fails with `ServiceNotFound` when no instance exists and with
    /// `ConnectionFailed` when the platform refuses the connection.
    fn open(&self) -> Result<Connection>;

    /// Exchange one fixed-size record. Any non-success platform status is
    /// returned verbatim as `CallFailed`.
    fn call(&self, conn: Connection, selector: u32, input: &KeyData) -> Result<KeyData>;

    /// Release a connection obtained from [`Controller::open`].
    fn close(&self, conn: Connection);
}

/// An open connection, exclusively owned by the caller
pub struct Session<'c, C: Controller + ?Sized> {
    controller: &'c C,
    conn: Connection,
}

impl<'c, C: Controller + ?Sized> Session<'c, C> {
    pub fn open(controller: &'c C) -> Result<Self> {
        let conn = controller.open()?;
        debug!(conn = conn.raw(), "controller session opened");
        Ok(Self { controller, conn })
    }

    pub fn connection(&self) -> Connection {
        self.conn
    }

    /// One request/response exchange over this session.
    pub fn call(&mut self, selector: u32, input: &KeyData) -> Result<KeyData> {
        self.controller.call(self.conn, selector, input)
    }

    /// Close the session now instead of at end of scope.
    pub fn close(self) {}
}

impl<C: Controller + ?Sized> Drop for Session<'_, C> {
    fn drop(&mut self) {
        self.controller.close(self.conn);
        debug!(conn = self.conn.raw(), "controller session closed");
    }
}
