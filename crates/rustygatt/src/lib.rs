//! RustyGatt - client-side GATT attribute proxies for Bluetooth LE
//!
//! This library provides value-like handles to characteristics discovered on
//! remote Bluetooth LE devices. A [`DiscoveredCharacteristic`] checks its
//! cached property flags locally, dispatches reads and writes through a
//! pluggable [`GattTransport`], and routes the transport's shared completion
//! streams into one-shot callbacks that fire at most once and can always be
//! cancelled by token.
//!
//! The transport itself, along with connection management and security, is
//! supplied by the embedding stack; anything implementing [`GattTransport`]
//! plugs in underneath.

pub mod characteristic;
pub mod error;
pub mod events;
pub mod transport;
pub mod uuid;

// Re-export common types for convenience
pub use characteristic::{
    CharacteristicDeclaration, CharacteristicProperties, DiscoveredCharacteristic,
    DiscoveredDescriptor,
};
pub use error::{GattError, GattResult};
pub use events::{CompletionEvent, EventStream, ListenerToken};
pub use transport::{
    CompletionStatus, DescriptorDiscoveryTermination, GattTransport, ReadCompletion,
    TransportError, WriteCompletion, WriteOp,
};
pub use uuid::Uuid;
