//! Bluetooth UUID value type
//!
//! Characteristics and descriptors are identified by 128-bit UUIDs. SIG-assigned
//! attributes use 16-bit (and occasionally 32-bit) short forms, which expand into
//! the Bluetooth base UUID. The type below stores every UUID as 16 little-endian
//! bytes and converts between the three widths.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;
use thiserror::Error;

/// Bluetooth base UUID, "00000000-0000-1000-8000-00805F9B34FB", little-endian.
/// Short-form UUIDs are this value with the 16/32-bit part spliced in.
const BASE_UUID_BYTES: [u8; 16] = [
    0xFB, 0x34, 0x9B, 0x5F, 0x80, 0x00, 0x00, 0x80, 0x00, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// Byte offset where the short-form value sits inside the base UUID.
const BASE_OFFSET: usize = 12;

/// A 128-bit Bluetooth UUID.
///
/// Stored internally as 16 bytes in little-endian order, matching the order
/// UUIDs travel in attribute-protocol packets.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Uuid {
    bytes: [u8; 16],
}

impl Uuid {
    /// Builds a UUID from 16 little-endian bytes.
    pub const fn from_bytes_le(bytes: [u8; 16]) -> Self {
        Uuid { bytes }
    }

    /// Builds a UUID from 16 big-endian bytes (the standard textual order).
    pub fn from_bytes_be(mut bytes: [u8; 16]) -> Self {
        bytes.reverse();
        Uuid { bytes }
    }

    /// Expands a 16-bit SIG-assigned value into a full UUID.
    pub const fn from_u16(uuid16: u16) -> Self {
        Uuid::from_u32(uuid16 as u32)
    }

    /// Expands a 32-bit SIG-assigned value into a full UUID.
    pub const fn from_u32(uuid32: u32) -> Self {
        let short = uuid32.to_le_bytes();
        let mut bytes = BASE_UUID_BYTES;
        bytes[BASE_OFFSET] = short[0];
        bytes[BASE_OFFSET + 1] = short[1];
        bytes[BASE_OFFSET + 2] = short[2];
        bytes[BASE_OFFSET + 3] = short[3];
        Uuid { bytes }
    }

    /// Interprets a little-endian byte slice as a UUID.
    ///
    /// Accepts the three lengths attributes carry on the wire: 2 (16-bit
    /// short form), 4 (32-bit short form) or 16 (full UUID). Returns `None`
    /// for any other length.
    pub fn try_from_slice_le(slice: &[u8]) -> Option<Self> {
        match slice.len() {
            2 => {
                let mut short = [0u8; 2];
                short.copy_from_slice(slice);
                Some(Uuid::from_u16(u16::from_le_bytes(short)))
            }
            4 => {
                let mut short = [0u8; 4];
                short.copy_from_slice(slice);
                Some(Uuid::from_u32(u32::from_le_bytes(short)))
            }
            16 => {
                let mut bytes = [0u8; 16];
                bytes.copy_from_slice(slice);
                Some(Uuid::from_bytes_le(bytes))
            }
            _ => None,
        }
    }

    /// The 16 underlying bytes in little-endian order.
    pub const fn as_bytes_le(&self) -> &[u8; 16] {
        &self.bytes
    }

    /// The 16 underlying bytes in big-endian order.
    pub fn as_bytes_be(&self) -> [u8; 16] {
        let mut bytes = self.bytes;
        bytes.reverse();
        bytes
    }

    /// Whether this UUID lies inside the SIG-assigned base range.
    fn is_sig_assigned(&self) -> bool {
        self.bytes[..BASE_OFFSET] == BASE_UUID_BYTES[..BASE_OFFSET]
    }

    /// The 16-bit short form, if this UUID has one.
    pub fn as_u16(&self) -> Option<u16> {
        match self.as_u32() {
            Some(uuid32) if uuid32 <= u16::MAX as u32 => Some(uuid32 as u16),
            _ => None,
        }
    }

    /// The 32-bit short form, if this UUID has one.
    pub fn as_u32(&self) -> Option<u32> {
        if !self.is_sig_assigned() {
            return None;
        }
        let mut short = [0u8; 4];
        short.copy_from_slice(&self.bytes[BASE_OFFSET..BASE_OFFSET + 4]);
        Some(u32::from_le_bytes(short))
    }
}

impl From<u16> for Uuid {
    fn from(uuid16: u16) -> Self {
        Uuid::from_u16(uuid16)
    }
}

impl From<u32> for Uuid {
    fn from(uuid32: u32) -> Self {
        Uuid::from_u32(uuid32)
    }
}

impl PartialEq<u16> for Uuid {
    fn eq(&self, other: &u16) -> bool {
        self.as_u16() == Some(*other)
    }
}

impl PartialEq<Uuid> for u16 {
    fn eq(&self, other: &Uuid) -> bool {
        other.as_u16() == Some(*self)
    }
}

impl PartialEq<u32> for Uuid {
    fn eq(&self, other: &u32) -> bool {
        self.as_u32() == Some(*other)
    }
}

impl PartialEq<Uuid> for u32 {
    fn eq(&self, other: &Uuid) -> bool {
        other.as_u32() == Some(*self)
    }
}

impl fmt::Display for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Standard hyphenated big-endian form
        let hex = hex::encode(self.as_bytes_be());
        write!(
            f,
            "{}-{}-{}-{}-{}",
            &hex[..8],
            &hex[8..12],
            &hex[12..16],
            &hex[16..20],
            &hex[20..]
        )
    }
}

impl fmt::Debug for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form where one exists, full hyphenated form otherwise
        if let Some(uuid16) = self.as_u16() {
            write!(f, "Uuid(0x{:04X})", uuid16)
        } else if let Some(uuid32) = self.as_u32() {
            write!(f, "Uuid(0x{:08X})", uuid32)
        } else {
            fmt::Display::fmt(self, f)
        }
    }
}

/// Errors from parsing a UUID out of a string.
#[derive(Debug, Error)]
pub enum UuidParseError {
    #[error("UUID string has an unsupported length")]
    InvalidLength,

    #[error("UUID string is not valid hexadecimal")]
    InvalidFormat,

    #[error("Failed to decode UUID hex: {0}")]
    Hex(#[from] hex::FromHexError),
}

impl From<ParseIntError> for UuidParseError {
    fn from(_: ParseIntError) -> Self {
        UuidParseError::InvalidFormat
    }
}

impl FromStr for Uuid {
    type Err = UuidParseError;

    /// Parses "180A", "0000180A" or the full hyphenated 128-bit form.
    /// Hyphens and other separators are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cleaned: String = s.chars().filter(char::is_ascii_hexdigit).collect();

        match cleaned.len() {
            4 => Ok(Uuid::from_u16(u16::from_str_radix(&cleaned, 16)?)),
            8 => Ok(Uuid::from_u32(u32::from_str_radix(&cleaned, 16)?)),
            32 => {
                let mut bytes_be = [0u8; 16];
                hex::decode_to_slice(&cleaned, &mut bytes_be)?;
                Ok(Uuid::from_bytes_be(bytes_be))
            }
            _ => Err(UuidParseError::InvalidLength),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_form_expansion() {
        let uuid = Uuid::from_u16(0x180A);
        assert_eq!(uuid.as_u16(), Some(0x180A));
        assert_eq!(uuid.as_u32(), Some(0x0000180A));
        assert_eq!(uuid, 0x180Au16);

        let uuid32 = Uuid::from_u32(0x0001_0000);
        assert_eq!(uuid32.as_u16(), None);
        assert_eq!(uuid32.as_u32(), Some(0x0001_0000));
    }

    #[test]
    fn test_custom_uuid_has_no_short_form() {
        let mut bytes = [0u8; 16];
        bytes[15] = 0xAB;
        let uuid = Uuid::from_bytes_le(bytes);
        assert_eq!(uuid.as_u16(), None);
        assert_eq!(uuid.as_u32(), None);
    }

    #[test]
    fn test_slice_conversion() {
        assert_eq!(
            Uuid::try_from_slice_le(&[0x0A, 0x18]),
            Some(Uuid::from_u16(0x180A))
        );
        assert_eq!(Uuid::try_from_slice_le(&[0x0A, 0x18, 0x00]), None);

        let full = Uuid::from_u16(0x2902);
        assert_eq!(Uuid::try_from_slice_le(full.as_bytes_le()), Some(full));
    }

    #[test]
    fn test_parse_from_string() {
        let short: Uuid = "180A".parse().unwrap();
        assert_eq!(short.as_u16(), Some(0x180A));

        let long: Uuid = "00002902-0000-1000-8000-00805f9b34fb".parse().unwrap();
        assert_eq!(long.as_u16(), Some(0x2902));

        assert!("18".parse::<Uuid>().is_err());
    }

    #[test]
    fn test_display_format() {
        let uuid = Uuid::from_u16(0x180A);
        assert_eq!(uuid.to_string(), "0000180a-0000-1000-8000-00805f9b34fb");
        assert_eq!(format!("{:?}", uuid), "Uuid(0x180A)");
    }
}
