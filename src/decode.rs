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

//! Value decoding
//!
//! Dispatches on the type tag of a [`RawValue`]:
//!
//! - `sp78`: signed 8.8 fixed point, `(i8(b0) * 256 + b1) / 256`
//! - `ui8 `, `ui16`, `ui32`: big-endian unsigned integer over `size` bytes
//! - `fpe2`: unsigned fixed point with 2 fractional bits, unpacked byte by byte
//!
//! Anything else, including an empty value, decodes to `0.0`.

use crate::key::TypeTag;
use crate::reader::RawValue;

/// Fractional bits of the `fpe2` encoding
pub const FPE2_FRACTION_BITS: u32 = 2;

/// Decode a raw value, falling back to `0.0` for unknown tags or empty data.
pub fn decode(raw: &RawValue) -> f64 {
    decode_value(raw.data_type, raw.data()).unwrap_or(0.0)
}

/// Decode `bytes` as `tag`, or `None` when the tag is unsupported or the
/// bytes are too short for it.
pub fn decode_value(tag: TypeTag, bytes: &[u8]) -> Option<f64> {
    if bytes.is_empty() {
        return None;
    }
    match tag {
        TypeTag::SP78 => sp78(bytes),
        TypeTag::FPE2 => Some(fpe(bytes, FPE2_FRACTION_BITS)),
        t if t.is_unsigned_int() => Some(unsigned(bytes)),
        _ => None,
    }
}

/// Signed 8.8 fixed point from the first two bytes.
pub fn sp78(bytes: &[u8]) -> Option<f64> {
    match bytes {
        [hi, lo, ..] => {
            let value = i32::from(*hi as i8) * 256 + i32::from(*lo);
            Some(f64::from(value) / 256.0)
        }
        _ => None,
    }
}

/// Big-endian unsigned integer of any width up to the payload capacity.
///
/// Accumulates in `f64`, exact up to 2^53.
pub fn unsigned(bytes: &[u8]) -> f64 {
    bytes.iter().fold(0.0, |acc, &b| acc * 256.0 + f64::from(b))
}

/// Unsigned fixed point with `frac_bits` fractional bits (`frac_bits < 8`).
///
/// The last byte contributes `b >> frac_bits`; every earlier byte contributes
/// `b << (remaining * (8 - frac_bits))`, where `remaining` counts the bytes
/// after it.
pub fn fpe(bytes: &[u8], frac_bits: u32) -> f64 {
    let last = bytes.len().saturating_sub(1);
    let step = 8_i32 - frac_bits.min(7) as i32;
    bytes.iter().enumerate().fold(0.0, |acc, (i, &b)| {
        if i == last {
            acc + f64::from(b.checked_shr(frac_bits).unwrap_or(0))
        } else {
            acc + f64::from(b) * 2f64.powi((last - i) as i32 * step)
        }
    })
}
