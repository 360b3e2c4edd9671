//! Errors surfaced by transport implementations

use thiserror::Error;

/// Failure reported by a transport, either when a request is dispatched or
/// inside a completion event. The proxy layer passes these through without
/// rewriting them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Device not connected")]
    NotConnected,

    #[error("Attribute not found on the remote device")]
    AttributeNotFound,

    /// Attribute-protocol error response from the remote device.
    #[error("Remote protocol error {code:#04x} on handle {handle:#06x}")]
    Protocol { code: u8, handle: u16 },

    #[error("Transaction timed out")]
    Timeout,

    #[error("Transport busy with another transaction")]
    Busy,

    #[error("Transport failure: {0}")]
    Other(String),
}
