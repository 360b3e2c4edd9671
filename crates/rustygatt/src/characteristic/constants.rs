//! GATT declaration and descriptor UUID constants

/// Characteristic Declaration attribute type
pub const CHARACTERISTIC_UUID: u16 = 0x2803;

/// Characteristic Extended Properties descriptor
pub const CHAR_EXTENDED_PROPERTIES_UUID: u16 = 0x2900;

/// Characteristic User Description descriptor
pub const CHAR_USER_DESCRIPTION_UUID: u16 = 0x2901;

/// Client Characteristic Configuration descriptor
pub const CLIENT_CHAR_CONFIG_UUID: u16 = 0x2902;

/// Server Characteristic Configuration descriptor
pub const SERVER_CHAR_CONFIG_UUID: u16 = 0x2903;

/// Characteristic Presentation Format descriptor
pub const CHAR_PRESENTATION_FORMAT_UUID: u16 = 0x2904;

/// Characteristic Aggregate Format descriptor
pub const CHAR_AGGREGATE_FORMAT_UUID: u16 = 0x2905;
