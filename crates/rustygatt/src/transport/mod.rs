//! Transport abstraction under the characteristic proxies
//!
//! A transport owns the wire machinery: attribute-protocol transactions,
//! link state, flow control. Proxies drive it through the narrow interface
//! below and listen for outcomes on the completion streams it exposes.

pub mod error;
pub mod types;

pub use self::error::TransportError;
pub use self::types::{
    CompletionStatus, DescriptorDiscoveryTermination, ReadCompletion, WriteCompletion, WriteOp,
};

use crate::characteristic::{DiscoveredCharacteristic, DiscoveredDescriptor};
use crate::events::EventStream;

/// Callback invoked once per descriptor found during descriptor discovery.
pub type DescriptorDiscoveredCallback = Box<dyn FnMut(&DiscoveredDescriptor) + Send>;

/// Callback invoked exactly once when a descriptor discovery procedure ends,
/// whether it completed, failed or found nothing.
pub type DiscoveryTerminationCallback = Box<dyn FnOnce(&DescriptorDiscoveryTermination) + Send>;

/// Client-side GATT transport.
///
/// Request methods return as soon as the request is dispatched; outcomes
/// arrive later as events on [`read_events`](GattTransport::read_events) and
/// [`write_events`](GattTransport::write_events). Implementations must purge
/// the streams with [`EventStream::purge_connection`] when a link drops, so
/// that listeners armed for requests that can no longer complete do not
/// linger.
pub trait GattTransport: Send + Sync {
    /// Issues a read of `attribute_handle` on `connection_handle`, starting
    /// at byte `offset`. A zero offset reads from the beginning.
    fn read(
        &self,
        connection_handle: u16,
        attribute_handle: u16,
        offset: u16,
    ) -> Result<(), TransportError>;

    /// Issues a write of `value` to `attribute_handle` on
    /// `connection_handle`. Only [`WriteOp::WithResponse`] writes produce a
    /// completion event.
    fn write(
        &self,
        op: WriteOp,
        connection_handle: u16,
        attribute_handle: u16,
        value: &[u8],
    ) -> Result<(), TransportError>;

    /// Broadcast stream of read completions for every connection this
    /// transport serves.
    fn read_events(&self) -> &EventStream<ReadCompletion>;

    /// Broadcast stream of write completions for every connection this
    /// transport serves.
    fn write_events(&self) -> &EventStream<WriteCompletion>;

    /// Discovers the descriptors of `characteristic`, i.e. the attributes
    /// between its value handle and the end of its handle range.
    /// `on_discovered` runs once per descriptor found, then `on_termination`
    /// runs exactly once.
    fn discover_descriptors(
        &self,
        characteristic: &DiscoveredCharacteristic,
        on_discovered: DescriptorDiscoveredCallback,
        on_termination: DiscoveryTerminationCallback,
    ) -> Result<(), TransportError>;
}
