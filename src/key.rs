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

//! Key codec
//!
//! Controller keys and type tags are four ASCII bytes packed big-endian into a
//! `u32`: the first character lands in the most significant byte. Packing is
//! done with explicit byte-array conversions and never depends on the host
//! byte order.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SmcError};

/// Every key and type tag is exactly this many bytes
pub const KEY_LEN: usize = 4;

/// Pack four key characters into the controller's 32-bit identifier.
pub fn encode_key(name: &[u8; KEY_LEN]) -> u32 {
    u32::from_be_bytes(*name)
}

/// Unpack a 32-bit identifier from a metadata response into its type tag.
pub fn decode_type_tag(id: u32) -> TypeTag {
    TypeTag(id.to_be_bytes())
}

/// A validated four-character controller key such as `TC0P`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key([u8; KEY_LEN]);

impl Key {
    /// Validate a key name: exactly four printable ASCII bytes (space allowed).
    pub fn new(name: &str) -> Result<Self> {
        let bytes = name.as_bytes();
        if bytes.len() != KEY_LEN || !bytes.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
            return Err(SmcError::InvalidKey(name.to_string()));
        }
        let mut out = [0u8; KEY_LEN];
        out.copy_from_slice(bytes);
        Ok(Self(out))
    }

    pub const fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Wire identifier for this key
    pub fn encode(&self) -> u32 {
        encode_key(&self.0)
    }
}

impl FromStr for Key {
    type Err = SmcError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_ascii(f, &self.0)
    }
}

/// Four-character name of a value's wire encoding, e.g. `sp78`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TypeTag([u8; KEY_LEN]);

impl TypeTag {
    /// Signed fixed point, 7 integer bits and 8 fractional bits
    pub const SP78: TypeTag = TypeTag(*b"sp78");
    /// Unsigned fixed point, 2 fractional bits
    pub const FPE2: TypeTag = TypeTag(*b"fpe2");
    // short tags are space padded by the controller
    pub const UI8: TypeTag = TypeTag(*b"ui8 ");
    pub const UI16: TypeTag = TypeTag(*b"ui16");
    pub const UI32: TypeTag = TypeTag(*b"ui32");

    pub const fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Wire identifier for this tag
    pub fn encode(&self) -> u32 {
        encode_key(&self.0)
    }

    /// True for the unsigned integer family (`ui8 `, `ui16`, `ui32`)
    pub fn is_unsigned_int(&self) -> bool {
        matches!(*self, Self::UI8 | Self::UI16 | Self::UI32)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_ascii(f, &self.0)
    }
}

fn write_ascii(f: &mut fmt::Formatter<'_>, bytes: &[u8; KEY_LEN]) -> fmt::Result {
    for &b in bytes {
        fmt::Write::write_char(f, char::from(b))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_key_is_big_endian() {
        assert_eq!(encode_key(b"TC0P"), 0x5443_3050);
        assert_eq!(encode_key(b"\x01\x02\x03\x04"), 0x0102_0304);
    }

    #[test]
    fn test_decode_type_tag_known_tags() {
        assert_eq!(decode_type_tag(0x7370_3738), TypeTag::SP78);
        assert_eq!(decode_type_tag(0x7569_3820).to_string(), "ui8 ");
        assert_eq!(decode_type_tag(0x6670_6532).to_string(), "fpe2");
    }

    #[test]
    fn test_round_trip_all_printable_prefixes() {
        // every ASCII byte in every position, with varied neighbours
        for b in 0u8..=0x7f {
            for s in [[b, b'C', b'0', b'P'], [b'T', b, b'0', b'P'], [b'T', b'C', b, b'P'], [b'T', b'C', b'0', b]] {
                let expected: String = s.iter().map(|&c| char::from(c)).collect();
                assert_eq!(decode_type_tag(encode_key(&s)).to_string(), expected);
            }
        }
    }

    #[test]
    fn test_round_trip_no_padding_or_trimming() {
        assert_eq!(decode_type_tag(encode_key(b"ui8 ")).to_string(), "ui8 ");
        assert_eq!(decode_type_tag(encode_key(b"    ")).to_string(), "    ");
    }

    #[test]
    fn test_key_new_valid() {
        let key = Key::new("TC0P").unwrap();
        assert_eq!(key.as_bytes(), b"TC0P");
        assert_eq!(key.to_string(), "TC0P");
        assert_eq!(key.encode(), encode_key(b"TC0P"));
    }

    #[test]
    fn test_key_new_accepts_symbols() {
        assert!(Key::new("#KEY").is_ok());
        assert!(Key::new("BAD!").is_ok());
        assert!(Key::new("ui8 ").is_ok());
    }

    #[test]
    fn test_key_new_rejects_wrong_length() {
        assert!(matches!(Key::new(""), Err(SmcError::InvalidKey(_))));
        assert!(matches!(Key::new("TC0"), Err(SmcError::InvalidKey(_))));
        assert!(matches!(Key::new("TC0PX"), Err(SmcError::InvalidKey(_))));
    }

    #[test]
    fn test_key_new_rejects_non_ascii() {
        // "TC°" is four bytes in UTF-8 but not ASCII
        assert_eq!("TC°".len(), 4);
        assert!(matches!(Key::new("TC°"), Err(SmcError::InvalidKey(_))));
        assert!(matches!(Key::new("TC\n0"), Err(SmcError::InvalidKey(_))));
    }

    #[test]
    fn test_key_from_str() {
        let key: Key = "F0Ac".parse().unwrap();
        assert_eq!(key, Key::from_bytes(*b"F0Ac"));
        assert!("F0".parse::<Key>().is_err());
    }

    #[test]
    fn test_type_tag_unsigned_family() {
        assert!(TypeTag::UI8.is_unsigned_int());
        assert!(TypeTag::UI16.is_unsigned_int());
        assert!(TypeTag::UI32.is_unsigned_int());
        assert!(!TypeTag::SP78.is_unsigned_int());
        assert!(!TypeTag::from_bytes(*b"ui8\0").is_unsigned_int());
    }
}
