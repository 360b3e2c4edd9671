//! Characteristic property flags

use bitflags::bitflags;

bitflags! {
    /// Property bitset from a characteristic declaration.
    ///
    /// The server reports these once during discovery and the client caches
    /// them on the proxy. They describe what the server intends to support,
    /// not what the current link state allows.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CharacteristicProperties: u8 {
        /// Value may be broadcast in advertising data.
        const BROADCAST = 0x01;
        /// Value may be read.
        const READ = 0x02;
        /// Value may be written without a response.
        const WRITE_WITHOUT_RESPONSE = 0x04;
        /// Value may be written with a response.
        const WRITE = 0x08;
        /// Server may notify the value, unacknowledged.
        const NOTIFY = 0x10;
        /// Server may indicate the value, acknowledged.
        const INDICATE = 0x20;
        /// Value accepts authenticated signed writes.
        const AUTHENTICATED_SIGNED_WRITES = 0x40;
        /// An Extended Properties descriptor is present.
        const EXTENDED_PROPERTIES = 0x80;
    }
}

impl CharacteristicProperties {
    /// Check if the characteristic supports reading
    pub fn can_read(&self) -> bool {
        self.contains(CharacteristicProperties::READ)
    }

    /// Check if the characteristic supports writing with response
    pub fn can_write(&self) -> bool {
        self.contains(CharacteristicProperties::WRITE)
    }

    /// Check if the characteristic supports writing without response
    pub fn can_write_without_response(&self) -> bool {
        self.contains(CharacteristicProperties::WRITE_WITHOUT_RESPONSE)
    }

    /// Check if the characteristic supports notifications
    pub fn can_notify(&self) -> bool {
        self.contains(CharacteristicProperties::NOTIFY)
    }

    /// Check if the characteristic supports indications
    pub fn can_indicate(&self) -> bool {
        self.contains(CharacteristicProperties::INDICATE)
    }
}
