//! Reads and writes a characteristic through an in-memory transport.
//!
//! The transport below is a loopback with a small attribute table.
//! Completions are queued at dispatch time and delivered by `pump`, standing
//! in for the event loop a real stack runs.

use rustygatt::{
    CharacteristicDeclaration, CompletionStatus, DiscoveredCharacteristic, EventStream,
    GattTransport, ReadCompletion, TransportError, WriteCompletion, WriteOp,
};
use rustygatt::transport::{
    DescriptorDiscoveredCallback, DescriptorDiscoveryTermination, DiscoveryTerminationCallback,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, Weak};

struct LoopbackTransport {
    attributes: Mutex<HashMap<u16, Vec<u8>>>,
    pending_reads: Mutex<VecDeque<ReadCompletion>>,
    pending_writes: Mutex<VecDeque<WriteCompletion>>,
    read_events: EventStream<ReadCompletion>,
    write_events: EventStream<WriteCompletion>,
}

impl LoopbackTransport {
    fn new(attributes: HashMap<u16, Vec<u8>>) -> Arc<Self> {
        Arc::new(LoopbackTransport {
            attributes: Mutex::new(attributes),
            pending_reads: Mutex::new(VecDeque::new()),
            pending_writes: Mutex::new(VecDeque::new()),
            read_events: EventStream::new(),
            write_events: EventStream::new(),
        })
    }

    /// Delivers every queued completion, oldest first.
    fn pump(&self) {
        loop {
            // Take the event before emitting so no queue lock is held while
            // callbacks run
            let next = self.pending_reads.lock().unwrap().pop_front();
            match next {
                Some(event) => self.read_events.emit(&event),
                None => break,
            }
        }
        loop {
            let next = self.pending_writes.lock().unwrap().pop_front();
            match next {
                Some(event) => self.write_events.emit(&event),
                None => break,
            }
        }
    }
}

impl GattTransport for LoopbackTransport {
    fn read(
        &self,
        connection_handle: u16,
        attribute_handle: u16,
        offset: u16,
    ) -> Result<(), TransportError> {
        let attributes = self.attributes.lock().unwrap();
        let event = match attributes.get(&attribute_handle) {
            Some(value) if (offset as usize) <= value.len() => ReadCompletion {
                connection_handle,
                handle: attribute_handle,
                offset,
                value: value[offset as usize..].to_vec(),
                status: CompletionStatus::Success,
            },
            // ATT error 0x07: invalid offset
            Some(_) => ReadCompletion {
                connection_handle,
                handle: attribute_handle,
                offset,
                value: Vec::new(),
                status: CompletionStatus::Failed(TransportError::Protocol {
                    code: 0x07,
                    handle: attribute_handle,
                }),
            },
            None => ReadCompletion {
                connection_handle,
                handle: attribute_handle,
                offset,
                value: Vec::new(),
                status: CompletionStatus::Failed(TransportError::AttributeNotFound),
            },
        };
        self.pending_reads.lock().unwrap().push_back(event);
        Ok(())
    }

    fn write(
        &self,
        op: WriteOp,
        connection_handle: u16,
        attribute_handle: u16,
        value: &[u8],
    ) -> Result<(), TransportError> {
        let mut attributes = self.attributes.lock().unwrap();
        let status = match attributes.get_mut(&attribute_handle) {
            Some(stored) => {
                *stored = value.to_vec();
                CompletionStatus::Success
            }
            None => CompletionStatus::Failed(TransportError::AttributeNotFound),
        };
        // Only acknowledged writes complete with an event
        if op == WriteOp::WithResponse {
            self.pending_writes.lock().unwrap().push_back(WriteCompletion {
                connection_handle,
                handle: attribute_handle,
                op,
                status,
            });
        }
        Ok(())
    }

    fn read_events(&self) -> &EventStream<ReadCompletion> {
        &self.read_events
    }

    fn write_events(&self) -> &EventStream<WriteCompletion> {
        &self.write_events
    }

    fn discover_descriptors(
        &self,
        characteristic: &DiscoveredCharacteristic,
        _on_discovered: DescriptorDiscoveredCallback,
        on_termination: DiscoveryTerminationCallback,
    ) -> Result<(), TransportError> {
        // This table holds no descriptors, so discovery terminates at once
        on_termination(&DescriptorDiscoveryTermination {
            connection_handle: characteristic.connection_handle(),
            handle: characteristic.value_handle(),
            status: CompletionStatus::Success,
        });
        Ok(())
    }
}

fn main() {
    let mut attributes = HashMap::new();
    attributes.insert(0x0011, b"hello from 0x0011".to_vec());
    attributes.insert(0x0021, Vec::new());
    let transport = LoopbackTransport::new(attributes);

    // Proxies the way service discovery would hand them out: a readable and
    // writable characteristic, and a write-only control point
    let declaration = CharacteristicDeclaration::parse(&[0x0E, 0x11, 0x00, 0x00, 0x2A])
        .expect("well-formed declaration");
    let weak = Arc::downgrade(&transport);
    let weak: Weak<dyn GattTransport> = weak;
    let characteristic = DiscoveredCharacteristic::new(weak, 0x0040, 0x0010, declaration, 0x0012);

    let control_declaration = CharacteristicDeclaration::parse(&[0x0C, 0x21, 0x00, 0x05, 0x2A])
        .expect("well-formed declaration");
    let weak = Arc::downgrade(&transport);
    let weak: Weak<dyn GattTransport> = weak;
    let control_point =
        DiscoveredCharacteristic::new(weak, 0x0040, 0x0020, control_declaration, 0x0021);

    println!("characteristic: {:?}", characteristic);
    println!("control point:  {:?}", control_point);
    println!();

    // A persistent listener sees every read completion on the transport
    let audit_token = transport.read_events().subscribe(|event: &ReadCompletion| {
        println!(
            "  [audit] read completion for handle {:#06x} ({} bytes)",
            event.handle,
            event.value.len()
        );
    });

    println!("reading the characteristic value...");
    characteristic
        .read_with_callback(0, |event| match &event.status {
            CompletionStatus::Success => {
                println!("  read ok: {:?}", String::from_utf8_lossy(&event.value))
            }
            CompletionStatus::Failed(error) => println!("  read failed: {}", error),
        })
        .expect("characteristic is readable");
    transport.pump();
    println!();

    println!("writing and waiting for the acknowledgement...");
    characteristic
        .write_with_callback(b"updated value", |event| {
            println!(
                "  write acknowledged: {}",
                if event.status.is_success() { "yes" } else { "no" }
            );
        })
        .expect("characteristic is writable");
    transport.pump();

    println!("reading back at offset 8...");
    characteristic
        .read_with_callback(8, |event| {
            println!("  read ok: {:?}", String::from_utf8_lossy(&event.value));
        })
        .expect("characteristic is readable");
    transport.pump();
    println!();

    println!("firing a write command at the control point...");
    control_point
        .write_without_response(&[0x01])
        .expect("control point accepts write commands");
    transport.pump();
    println!("  dispatched, no completion expected");
    println!();

    // The control point's properties do not include READ, so this fails
    // locally without touching the transport
    match control_point.read(0) {
        Err(error) => println!("reading the control point: {}", error),
        Ok(()) => println!("reading the control point unexpectedly dispatched"),
    }

    // A read past the end of the value surfaces the transport's error
    println!("reading at an invalid offset...");
    characteristic
        .read_with_callback(200, |event| match &event.status {
            CompletionStatus::Success => println!("  read ok unexpectedly"),
            CompletionStatus::Failed(error) => println!("  read failed: {}", error),
        })
        .expect("dispatch itself succeeds");
    transport.pump();

    transport.read_events().unsubscribe(audit_token);
}
