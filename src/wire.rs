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

//! Controller wire record
//!
//! The privileged service exchanges one fixed-size `#[repr(C)]` record in each
//! direction. Field order and sizes are dictated by the service ABI; the record
//! is 80 bytes with the key-info sub-record at offset 28 and the payload at 48.

/// Selector passed to the structured call primitive for every key operation
pub const KERNEL_INDEX_SMC: u32 = 2;

/// Command byte: fetch the value bytes of a key
pub const SMC_CMD_READ_BYTES: u8 = 5;
/// Command byte: fetch the size and type tag of a key
pub const SMC_CMD_READ_KEYINFO: u8 = 9;

/// Capacity of the value payload
pub const PAYLOAD_LEN: usize = 32;

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyDataVers {
    pub major: u8,
    pub minor: u8,
    pub build: u8,
    pub reserved: u8,
    pub release: u16,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PLimitData {
    pub version: u16,
    pub length: u16,
    pub cpu_p_limit: u32,
    pub gpu_p_limit: u32,
    pub mem_p_limit: u32,
}

/// Size and type of a key, as answered by a `SMC_CMD_READ_KEYINFO` call
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyInfo {
    pub data_size: u32,
    pub data_type: u32,
    pub data_attributes: u8,
}

/// One request or response record
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyData {
    pub key: u32,
    pub vers: KeyDataVers,
    pub p_limit_data: PLimitData,
    pub key_info: KeyInfo,
    pub result: u8,
    pub status: u8,
    pub data8: u8,
    pub data32: u32,
    pub bytes: [u8; PAYLOAD_LEN],
}

const _: () = assert!(std::mem::size_of::<KeyData>() == 80);

impl KeyData {
    /// Phase-one request: ask for the size and type tag of `key`.
    pub fn key_info_request(key: u32) -> Self {
        Self {
            key,
            data8: SMC_CMD_READ_KEYINFO,
            ..Self::default()
        }
    }

    /// Phase-two request: fetch `data_size` value bytes of `key`.
    pub fn read_bytes_request(key: u32, data_size: u32) -> Self {
        Self {
            key,
            key_info: KeyInfo {
                data_size,
                ..KeyInfo::default()
            },
            data8: SMC_CMD_READ_BYTES,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{align_of, size_of};

    fn offset_of<T>(base: &KeyData, field: &T) -> usize {
        field as *const T as usize - base as *const KeyData as usize
    }

    #[test]
    fn test_record_layout_matches_service_abi() {
        let data = KeyData::default();
        assert_eq!(size_of::<KeyData>(), 80);
        assert_eq!(align_of::<KeyData>(), 4);
        assert_eq!(size_of::<KeyInfo>(), 12);
        assert_eq!(offset_of(&data, &data.key), 0);
        assert_eq!(offset_of(&data, &data.vers), 4);
        assert_eq!(offset_of(&data, &data.p_limit_data), 12);
        assert_eq!(offset_of(&data, &data.key_info), 28);
        assert_eq!(offset_of(&data, &data.result), 40);
        assert_eq!(offset_of(&data, &data.data8), 42);
        assert_eq!(offset_of(&data, &data.data32), 44);
        assert_eq!(offset_of(&data, &data.bytes), 48);
    }

    #[test]
    fn test_key_info_request_is_otherwise_zeroed() {
        let req = KeyData::key_info_request(0x5443_3050);
        assert_eq!(req.key, 0x5443_3050);
        assert_eq!(req.data8, SMC_CMD_READ_KEYINFO);
        assert_eq!(req.key_info, KeyInfo::default());
        assert_eq!(req.bytes, [0u8; PAYLOAD_LEN]);
    }

    #[test]
    fn test_read_bytes_request_carries_size() {
        let req = KeyData::read_bytes_request(0x5443_3050, 2);
        assert_eq!(req.data8, SMC_CMD_READ_BYTES);
        assert_eq!(req.key_info.data_size, 2);
        assert_eq!(req.key_info.data_type, 0);
        assert_eq!(req.data32, 0);
    }
}
