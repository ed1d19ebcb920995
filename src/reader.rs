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

//! Key read protocol
//!
//! A logical read is two calls over one session: a key-info query that yields
//! the value's size and type tag, then a byte fetch for that size. Each phase
//! sends a freshly zeroed record, so nothing from the first exchange can leak
//! into the second. A failed phase aborts the read with its status unchanged.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, SmcError};
use crate::key::{decode_type_tag, Key, TypeTag};
use crate::session::{Controller, Session};
use crate::wire::{KeyData, KERNEL_INDEX_SMC, PAYLOAD_LEN};

/// How to treat a fetch whose reported size disagrees with the key info
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizePolicy {
    /// Keep the key-info size and copy the payload regardless
    #[default]
    Trust,
    /// Fail the read with `SizeMismatch`
    Strict,
}

/// Undecoded value of one key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawValue {
    /// Byte count from the key-info phase
    pub size: u32,
    pub data_type: TypeTag,
    /// Payload; only the first `size` bytes are meaningful
    pub bytes: [u8; PAYLOAD_LEN],
}

impl RawValue {
    pub fn new(data_type: TypeTag, data: &[u8]) -> Self {
        let len = data.len().min(PAYLOAD_LEN);
        let mut bytes = [0u8; PAYLOAD_LEN];
        bytes[..len].copy_from_slice(&data[..len]);
        Self {
            size: len as u32,
            data_type,
            bytes,
        }
    }

    /// The meaningful prefix of the payload
    pub fn data(&self) -> &[u8] {
        let len = (self.size as usize).min(PAYLOAD_LEN);
        &self.bytes[..len]
    }
}

/// Read one key over an open session.
///
/// A key-info size larger than the payload capacity is a protocol violation
/// and always fails with `SizeMismatch`. A byte fetch reporting a nonzero size
/// different from the key info fails only under [`SizePolicy::Strict`].
pub fn read_key<C: Controller + ?Sized>(
    session: &mut Session<'_, C>,
    key: Key,
    policy: SizePolicy,
) -> Result<RawValue> {
    let id = key.encode();

    debug!(%key, "reading key info");
    let info = session.call(KERNEL_INDEX_SMC, &KeyData::key_info_request(id))?;
    let size = info.key_info.data_size;
    let data_type = decode_type_tag(info.key_info.data_type);

    if size as usize > PAYLOAD_LEN {
        warn!(%key, size, "key info size exceeds payload capacity");
        return Err(SmcError::SizeMismatch {
            key: key.to_string(),
            expected: size,
            actual: PAYLOAD_LEN as u32,
        });
    }

    debug!(%key, size, %data_type, "reading key bytes");
    let fetched = session.call(KERNEL_INDEX_SMC, &KeyData::read_bytes_request(id, size))?;

    let reported = fetched.key_info.data_size;
    if reported != 0 && reported != size {
        match policy {
            SizePolicy::Strict => {
                return Err(SmcError::SizeMismatch {
                    key: key.to_string(),
                    expected: size,
                    actual: reported,
                });
            }
            SizePolicy::Trust => {
                warn!(%key, expected = size, actual = reported, "byte fetch size differs from key info");
            }
        }
    }

    Ok(RawValue {
        size,
        data_type,
        bytes: fetched.bytes,
    })
}
