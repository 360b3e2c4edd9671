//! Client-side views of discovered GATT attributes
//!
//! This module provides the characteristic proxy handed out by service
//! discovery, plus the declaration and descriptor types around it.

pub mod constants;
pub mod discovered;
pub mod properties;
pub mod types;


pub use self::constants::*;
pub use self::discovered::DiscoveredCharacteristic;
pub use self::properties::CharacteristicProperties;
pub use self::types::{CharacteristicDeclaration, DiscoveredDescriptor};
