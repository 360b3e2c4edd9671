//! Payload types carried by transport completion events

use super::error::TransportError;
use crate::events::CompletionEvent;

/// Kind of write dispatched to the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    /// Write Request. The remote device acknowledges and the transport
    /// emits a [`WriteCompletion`].
    WithResponse,
    /// Write Command. Fire and forget, no completion event follows.
    WithoutResponse,
}

/// Outcome carried by a completion event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionStatus {
    Success,
    Failed(TransportError),
}

impl CompletionStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, CompletionStatus::Success)
    }
}

/// Completion of a previously issued read request.
#[derive(Debug, Clone)]
pub struct ReadCompletion {
    /// Connection the read ran on.
    pub connection_handle: u16,
    /// Attribute handle that was read.
    pub handle: u16,
    /// Byte offset the read started at.
    pub offset: u16,
    /// Bytes read from the attribute value. Empty when the read failed.
    pub value: Vec<u8>,
    pub status: CompletionStatus,
}

impl CompletionEvent for ReadCompletion {
    fn connection_handle(&self) -> u16 {
        self.connection_handle
    }

    fn attribute_handle(&self) -> u16 {
        self.handle
    }
}

/// Completion of a previously issued write-with-response request.
#[derive(Debug, Clone)]
pub struct WriteCompletion {
    /// Connection the write ran on.
    pub connection_handle: u16,
    /// Attribute handle that was written.
    pub handle: u16,
    /// Kind of write that completed.
    pub op: WriteOp,
    pub status: CompletionStatus,
}

impl CompletionEvent for WriteCompletion {
    fn connection_handle(&self) -> u16 {
        self.connection_handle
    }

    fn attribute_handle(&self) -> u16 {
        self.handle
    }
}

/// End of a descriptor discovery procedure for one characteristic.
#[derive(Debug, Clone)]
pub struct DescriptorDiscoveryTermination {
    /// Connection the procedure ran on.
    pub connection_handle: u16,
    /// Value handle of the characteristic whose descriptors were searched.
    pub handle: u16,
    /// `Success` when the handle range was exhausted, `Failed` when the
    /// procedure stopped early.
    pub status: CompletionStatus,
}
