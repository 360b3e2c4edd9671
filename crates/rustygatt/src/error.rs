//! Error types for GATT client operations

use crate::transport::TransportError;
use thiserror::Error;

/// Errors returned by operations on a discovered characteristic.
#[derive(Debug, Error)]
pub enum GattError {
    /// The characteristic's cached property flags do not allow the operation.
    /// Checked before anything is dispatched to the transport.
    #[error("Operation not permitted by the characteristic's properties")]
    OperationNotPermitted,

    /// No transport is bound to this characteristic. The handle was either
    /// built without one or outlived it.
    #[error("No transport bound to this characteristic")]
    InvalidState,

    /// Failure reported by the transport, passed through unchanged.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Result type for GATT client operations.
pub type GattResult<T> = Result<T, GattError>;
