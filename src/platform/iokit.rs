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

//! IOKit binding for the `AppleSMC` service

use std::ffi::{c_char, c_void};
use std::mem::size_of;

use tracing::{debug, warn};

use super::SERVICE_NAME;
use crate::error::{Result, SmcError};
use crate::session::{Connection, Controller};
use crate::wire::KeyData;

type KernReturn = i32;
type MachPort = u32;
type IoObject = MachPort;
type IoIterator = MachPort;
type IoConnect = MachPort;

const KIO_RETURN_SUCCESS: KernReturn = 0;
// kIOMainPortDefault
const KIO_MAIN_PORT_DEFAULT: MachPort = 0;

const SERVICE_NAME_C: &[u8] = b"AppleSMC\0";

#[link(name = "IOKit", kind = "framework")]
extern "C" {
    fn IOServiceMatching(name: *const c_char) -> *mut c_void;
    fn IOServiceGetMatchingServices(
        main_port: MachPort,
        matching: *mut c_void,
        existing: *mut IoIterator,
    ) -> KernReturn;
    fn IOIteratorNext(iterator: IoIterator) -> IoObject;
    fn IOObjectRelease(object: IoObject) -> KernReturn;
    fn IOServiceOpen(
        service: IoObject,
        owning_task: MachPort,
        connect_type: u32,
        connect: *mut IoConnect,
    ) -> KernReturn;
    fn IOServiceClose(connect: IoConnect) -> KernReturn;
    fn IOConnectCallStructMethod(
        connection: MachPort,
        selector: u32,
        input: *const c_void,
        input_size: usize,
        output: *mut c_void,
        output_size: *mut usize,
    ) -> KernReturn;
}

/// Controller backed by the IOKit `AppleSMC` user client
#[derive(Debug, Default, Clone, Copy)]
pub struct IoKitController;

impl IoKitController {
    pub fn new() -> Self {
        Self
    }

    fn find_service(&self) -> Result<IoObject> {
        let mut iterator: IoIterator = 0;
        // SAFETY: SERVICE_NAME_C is NUL-terminated. IOServiceGetMatchingServices
        // consumes the matching dictionary and writes the iterator on success.
        let kr = unsafe {
            let matching = IOServiceMatching(SERVICE_NAME_C.as_ptr() as *const c_char);
            IOServiceGetMatchingServices(KIO_MAIN_PORT_DEFAULT, matching, &mut iterator)
        };
        if kr != KIO_RETURN_SUCCESS {
            warn!("IOServiceGetMatchingServices() = {:#010x}", kr);
            return Err(SmcError::ServiceNotFound(SERVICE_NAME.to_string()));
        }

        // SAFETY: iterator is a valid io_iterator_t we own and release here.
        let device = unsafe {
            let device = IOIteratorNext(iterator);
            IOObjectRelease(iterator);
            device
        };
        if device == 0 {
            return Err(SmcError::ServiceNotFound(SERVICE_NAME.to_string()));
        }
        Ok(device)
    }
}

impl Controller for IoKitController {
    fn open(&self) -> Result<Connection> {
        let device = self.find_service()?;
        let mut conn: IoConnect = 0;
        // SAFETY: device is a live io_object_t released right after the open
        // attempt; conn is a valid out-pointer.
        #[allow(deprecated)]
        let kr = unsafe {
            let kr = IOServiceOpen(device, libc::mach_task_self(), 0, &mut conn);
            IOObjectRelease(device);
            kr
        };
        if kr != KIO_RETURN_SUCCESS {
            warn!("IOServiceOpen() = {:#010x}", kr);
            return Err(SmcError::ConnectionFailed(kr));
        }
        debug!(conn, "connected to {}", SERVICE_NAME);
        Ok(Connection::from_raw(conn))
    }

    fn call(&self, conn: Connection, selector: u32, input: &KeyData) -> Result<KeyData> {
        let mut output = KeyData::default();
        let mut output_size = size_of::<KeyData>();
        // SAFETY: both records are #[repr(C)] KeyData values of exactly the
        // sizes passed; output is a fresh zeroed record owned by this frame.
        let kr = unsafe {
            IOConnectCallStructMethod(
                conn.raw(),
                selector,
                input as *const KeyData as *const c_void,
                size_of::<KeyData>(),
                &mut output as *mut KeyData as *mut c_void,
                &mut output_size,
            )
        };
        if kr != KIO_RETURN_SUCCESS {
            return Err(SmcError::CallFailed(kr));
        }
        Ok(output)
    }

    fn close(&self, conn: Connection) {
        // SAFETY: conn came from IOServiceOpen and Session closes it once.
        let kr = unsafe { IOServiceClose(conn.raw()) };
        if kr != KIO_RETURN_SUCCESS {
            warn!("IOServiceClose() = {:#010x}", kr);
        }
    }
}
