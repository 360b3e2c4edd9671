//! Value types produced by the discovery procedures

use super::properties::CharacteristicProperties;
use crate::uuid::Uuid;
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};

/// Parsed value of a characteristic declaration attribute.
///
/// On the wire: properties (1 byte), value handle (2 bytes little-endian),
/// characteristic UUID (2 or 16 bytes little-endian).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacteristicDeclaration {
    pub properties: CharacteristicProperties,
    pub value_handle: u16,
    pub uuid: Uuid,
}

impl CharacteristicDeclaration {
    /// Parses a declaration attribute value. Returns `None` when the value
    /// is too short or its UUID is neither 16 nor 128 bits wide.
    pub fn parse(value: &[u8]) -> Option<Self> {
        if value.len() < 5 {
            return None;
        }

        let mut cursor = Cursor::new(value);
        let properties = CharacteristicProperties::from_bits_truncate(cursor.read_u8().ok()?);
        let value_handle = cursor.read_u16::<LittleEndian>().ok()?;

        let mut uuid_bytes = Vec::new();
        cursor.read_to_end(&mut uuid_bytes).ok()?;
        let uuid = match uuid_bytes.len() {
            2 | 16 => Uuid::try_from_slice_le(&uuid_bytes)?,
            _ => return None,
        };

        Some(CharacteristicDeclaration {
            properties,
            value_handle,
            uuid,
        })
    }
}

/// A descriptor found by descriptor discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredDescriptor {
    /// Connection the descriptor was discovered on.
    pub connection_handle: u16,
    /// Attribute handle of the descriptor.
    pub handle: u16,
    /// Descriptor type, e.g. 0x2902 for the Client Characteristic
    /// Configuration descriptor.
    pub uuid: Uuid,
}
