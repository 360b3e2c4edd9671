//! Client-side characteristic proxy

use super::properties::CharacteristicProperties;
use super::types::{CharacteristicDeclaration, DiscoveredDescriptor};
use crate::error::{GattError, GattResult};
use crate::events::ListenerToken;
use crate::transport::{
    DescriptorDiscoveryTermination, GattTransport, ReadCompletion, WriteCompletion, WriteOp,
};
use crate::uuid::Uuid;
use log::debug;
use std::fmt;
use std::ops::RangeInclusive;
use std::sync::{Arc, Weak};

/// Handle to one characteristic discovered on a remote device.
///
/// The proxy is a plain value: a few cached handles, the property bitset
/// from the declaration and a non-owning reference to the transport that
/// discovered it. Cloning it or dropping it has no effect on the remote
/// device or the link.
///
/// Every operation checks the cached property flags first and returns
/// [`GattError::OperationNotPermitted`] without touching the transport when
/// the flag is missing. Operations the flags allow then need a live
/// transport; if the proxy outlived it they return
/// [`GattError::InvalidState`].
#[derive(Clone)]
pub struct DiscoveredCharacteristic {
    uuid: Uuid,
    connection_handle: u16,
    declaration_handle: u16,
    value_handle: u16,
    last_handle: u16,
    properties: CharacteristicProperties,
    transport: Weak<dyn GattTransport>,
}

impl DiscoveredCharacteristic {
    /// Builds a proxy from a parsed declaration.
    ///
    /// `declaration_handle` is the handle the declaration was read from and
    /// `last_handle` is the last attribute handle belonging to this
    /// characteristic, i.e. the end of its descriptor range. For the final
    /// characteristic of a service this is the service's end handle.
    pub fn new(
        transport: Weak<dyn GattTransport>,
        connection_handle: u16,
        declaration_handle: u16,
        declaration: CharacteristicDeclaration,
        last_handle: u16,
    ) -> Self {
        DiscoveredCharacteristic {
            uuid: declaration.uuid,
            connection_handle,
            declaration_handle,
            value_handle: declaration.value_handle,
            last_handle,
            properties: declaration.properties,
            transport,
        }
    }

    /// UUID identifying what this characteristic is.
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// Handle of the connection the characteristic was discovered on.
    pub fn connection_handle(&self) -> u16 {
        self.connection_handle
    }

    /// Handle of the characteristic declaration attribute.
    pub fn declaration_handle(&self) -> u16 {
        self.declaration_handle
    }

    /// Handle of the characteristic value attribute. Reads and writes are
    /// aimed here, and completion events are matched against it.
    pub fn value_handle(&self) -> u16 {
        self.value_handle
    }

    /// Last attribute handle belonging to this characteristic.
    pub fn last_handle(&self) -> u16 {
        self.last_handle
    }

    /// Property bitset cached from the declaration.
    pub fn properties(&self) -> CharacteristicProperties {
        self.properties
    }

    /// Handle range the characteristic's descriptors occupy. Empty when the
    /// value attribute is the last one in the range.
    pub fn descriptor_range(&self) -> RangeInclusive<u16> {
        self.value_handle.saturating_add(1)..=self.last_handle
    }

    /// Upgrades the transport reference, or reports that none is bound.
    pub fn transport(&self) -> GattResult<Arc<dyn GattTransport>> {
        self.transport.upgrade().ok_or(GattError::InvalidState)
    }

    /// Issues a read of the characteristic value starting at byte `offset`,
    /// without registering for the result. Some other observer of the
    /// transport's read stream will see the completion.
    pub fn read(&self, offset: u16) -> GattResult<()> {
        if !self.properties.can_read() {
            return Err(GattError::OperationNotPermitted);
        }
        let transport = self.transport()?;
        transport.read(self.connection_handle, self.value_handle, offset)?;
        Ok(())
    }

    /// Issues a read of the characteristic value and arms `on_read` for its
    /// completion.
    ///
    /// Returns immediately after dispatch; `on_read` runs later, at most
    /// once, when the transport emits a read completion for this
    /// characteristic's value handle on this connection. The listener is
    /// armed only after the request was accepted, so a failed dispatch
    /// leaves nothing registered. The returned token cancels the callback
    /// via [`EventStream::unsubscribe`] on the transport's read stream.
    ///
    /// [`EventStream::unsubscribe`]: crate::events::EventStream::unsubscribe
    pub fn read_with_callback<F>(&self, offset: u16, on_read: F) -> GattResult<ListenerToken>
    where
        F: FnOnce(&ReadCompletion) + Send + 'static,
    {
        if !self.properties.can_read() {
            return Err(GattError::OperationNotPermitted);
        }
        let transport = self.transport()?;
        transport.read(self.connection_handle, self.value_handle, offset)?;
        Ok(transport
            .read_events()
            .subscribe_once(self.connection_handle, self.value_handle, on_read))
    }

    /// Writes the characteristic value with a response, without registering
    /// for the acknowledgement.
    pub fn write(&self, value: &[u8]) -> GattResult<()> {
        if !self.properties.can_write() {
            return Err(GattError::OperationNotPermitted);
        }
        let transport = self.transport()?;
        transport.write(
            WriteOp::WithResponse,
            self.connection_handle,
            self.value_handle,
            value,
        )?;
        Ok(())
    }

    /// Writes the characteristic value with a response and arms `on_written`
    /// for the acknowledgement.
    ///
    /// Same contract as [`read_with_callback`](Self::read_with_callback):
    /// at most one invocation, armed only after a successful dispatch,
    /// cancellable through the returned token on the transport's write
    /// stream.
    pub fn write_with_callback<F>(&self, value: &[u8], on_written: F) -> GattResult<ListenerToken>
    where
        F: FnOnce(&WriteCompletion) + Send + 'static,
    {
        if !self.properties.can_write() {
            return Err(GattError::OperationNotPermitted);
        }
        let transport = self.transport()?;
        transport.write(
            WriteOp::WithResponse,
            self.connection_handle,
            self.value_handle,
            value,
        )?;
        Ok(transport
            .write_events()
            .subscribe_once(self.connection_handle, self.value_handle, on_written))
    }

    /// Writes the characteristic value without a response. No completion
    /// event follows a write command, so there is no callback variant.
    pub fn write_without_response(&self, value: &[u8]) -> GattResult<()> {
        if !self.properties.can_write_without_response() {
            return Err(GattError::OperationNotPermitted);
        }
        let transport = self.transport()?;
        transport.write(
            WriteOp::WithoutResponse,
            self.connection_handle,
            self.value_handle,
            value,
        )?;
        Ok(())
    }

    /// Discovers the descriptors in this characteristic's handle range.
    ///
    /// `on_discovered` runs once per descriptor found, `on_termination`
    /// exactly once afterwards. A characteristic with an empty descriptor
    /// range terminates immediately without any `on_discovered` call.
    pub fn discover_descriptors<D, T>(&self, on_discovered: D, on_termination: T) -> GattResult<()>
    where
        D: FnMut(&DiscoveredDescriptor) + Send + 'static,
        T: FnOnce(&DescriptorDiscoveryTermination) + Send + 'static,
    {
        let transport = self.transport()?;
        let range = self.descriptor_range();
        debug!(
            "descriptor discovery for conn {:#06x} value handle {:#06x} range {:#06x}..={:#06x}",
            self.connection_handle,
            self.value_handle,
            range.start(),
            range.end()
        );
        transport.discover_descriptors(self, Box::new(on_discovered), Box::new(on_termination))?;
        Ok(())
    }
}

impl PartialEq for DiscoveredCharacteristic {
    /// Two proxies are equal when they view the same attribute through the
    /// same transport.
    fn eq(&self, other: &Self) -> bool {
        Weak::ptr_eq(&self.transport, &other.transport)
            && self.connection_handle == other.connection_handle
            && self.declaration_handle == other.declaration_handle
            && self.value_handle == other.value_handle
            && self.last_handle == other.last_handle
            && self.properties == other.properties
            && self.uuid == other.uuid
    }
}

impl fmt::Debug for DiscoveredCharacteristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscoveredCharacteristic")
            .field("uuid", &self.uuid)
            .field("connection_handle", &self.connection_handle)
            .field("declaration_handle", &self.declaration_handle)
            .field("value_handle", &self.value_handle)
            .field("last_handle", &self.last_handle)
            .field("properties", &self.properties)
            .field("transport_bound", &(self.transport.strong_count() > 0))
            .finish()
    }
}
