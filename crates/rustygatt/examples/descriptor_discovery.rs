//! Discovers the descriptors of a characteristic and shows what happens to
//! armed completion callbacks when the link drops.

use rustygatt::characteristic::{CHAR_USER_DESCRIPTION_UUID, CLIENT_CHAR_CONFIG_UUID};
use rustygatt::transport::{
    DescriptorDiscoveredCallback, DescriptorDiscoveryTermination, DiscoveryTerminationCallback,
};
use rustygatt::{
    CharacteristicDeclaration, CompletionStatus, DiscoveredCharacteristic, DiscoveredDescriptor,
    EventStream, GattTransport, ReadCompletion, TransportError, Uuid, WriteCompletion, WriteOp,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

const CONN: u16 = 0x0040;

/// Transport over one fragile link. Descriptors come from a fixed table;
/// a lost link fails new dispatches and purges armed listeners.
struct FlakyTransport {
    connected: AtomicBool,
    descriptors: Vec<DiscoveredDescriptor>,
    pending_reads: Mutex<VecDeque<ReadCompletion>>,
    read_events: EventStream<ReadCompletion>,
    write_events: EventStream<WriteCompletion>,
}

impl FlakyTransport {
    fn new(descriptors: Vec<DiscoveredDescriptor>) -> Arc<Self> {
        Arc::new(FlakyTransport {
            connected: AtomicBool::new(true),
            descriptors,
            pending_reads: Mutex::new(VecDeque::new()),
            read_events: EventStream::new(),
            write_events: EventStream::new(),
        })
    }

    fn check_link(&self) -> Result<(), TransportError> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(TransportError::NotConnected)
        }
    }

    fn pump(&self) {
        loop {
            let next = self.pending_reads.lock().unwrap().pop_front();
            match next {
                Some(event) => self.read_events.emit(&event),
                None => break,
            }
        }
    }

    /// Link supervision timeout: drop queued completions and reclaim every
    /// listener armed for this connection.
    fn connection_lost(&self, connection_handle: u16) {
        self.connected.store(false, Ordering::SeqCst);
        self.pending_reads.lock().unwrap().clear();
        let purged = self.read_events.purge_connection(connection_handle)
            + self.write_events.purge_connection(connection_handle);
        println!(
            "  link {:#06x} lost, {} armed listener(s) purged",
            connection_handle, purged
        );
    }
}

impl GattTransport for FlakyTransport {
    fn read(
        &self,
        connection_handle: u16,
        attribute_handle: u16,
        offset: u16,
    ) -> Result<(), TransportError> {
        self.check_link()?;
        self.pending_reads.lock().unwrap().push_back(ReadCompletion {
            connection_handle,
            handle: attribute_handle,
            offset,
            value: vec![0x00, 0x01],
            status: CompletionStatus::Success,
        });
        Ok(())
    }

    fn write(
        &self,
        _op: WriteOp,
        _connection_handle: u16,
        _attribute_handle: u16,
        _value: &[u8],
    ) -> Result<(), TransportError> {
        self.check_link()
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
        mut on_discovered: DescriptorDiscoveredCallback,
        on_termination: DiscoveryTerminationCallback,
    ) -> Result<(), TransportError> {
        self.check_link()?;
        let range = characteristic.descriptor_range();
        for descriptor in &self.descriptors {
            if descriptor.connection_handle == characteristic.connection_handle()
                && range.contains(&descriptor.handle)
            {
                on_discovered(descriptor);
            }
        }
        on_termination(&DescriptorDiscoveryTermination {
            connection_handle: characteristic.connection_handle(),
            handle: characteristic.value_handle(),
            status: CompletionStatus::Success,
        });
        Ok(())
    }
}

fn describe(uuid: Uuid) -> &'static str {
    if uuid == CLIENT_CHAR_CONFIG_UUID {
        "Client Characteristic Configuration"
    } else if uuid == CHAR_USER_DESCRIPTION_UUID {
        "User Description"
    } else {
        "vendor descriptor"
    }
}

fn main() {
    let descriptors = vec![
        DiscoveredDescriptor {
            connection_handle: CONN,
            handle: 0x0012,
            uuid: Uuid::from_u16(CLIENT_CHAR_CONFIG_UUID),
        },
        DiscoveredDescriptor {
            connection_handle: CONN,
            handle: 0x0013,
            uuid: Uuid::from_u16(CHAR_USER_DESCRIPTION_UUID),
        },
    ];
    let transport = FlakyTransport::new(descriptors);

    // Notifiable, readable heart rate measurement with two descriptors
    let declaration = CharacteristicDeclaration::parse(&[0x12, 0x11, 0x00, 0x37, 0x2A])
        .expect("well-formed declaration");
    let weak = Arc::downgrade(&transport);
    let weak: Weak<dyn GattTransport> = weak;
    let characteristic = DiscoveredCharacteristic::new(weak, CONN, 0x0010, declaration, 0x0013);

    println!("discovering descriptors of {:?}", characteristic.uuid());
    characteristic
        .discover_descriptors(
            |descriptor| {
                println!(
                    "  descriptor at {:#06x}: {}",
                    descriptor.handle,
                    describe(descriptor.uuid)
                );
            },
            |termination| {
                println!(
                    "  discovery finished: {}",
                    if termination.status.is_success() { "complete" } else { "stopped early" }
                );
            },
        )
        .expect("transport is up");
    println!();

    println!("arming a read callback, then losing the link before it completes");
    characteristic
        .read_with_callback(0, |event| {
            println!("  unexpected completion: {:?}", event.value);
        })
        .expect("transport is up");

    transport.connection_lost(CONN);
    transport.pump();
    println!(
        "  listeners left on the read stream: {}",
        transport.read_events().listener_count()
    );
    println!();

    println!("dispatching on the dead link");
    match characteristic.read(0) {
        Err(error) => println!("  read refused: {}", error),
        Ok(()) => println!("  read unexpectedly dispatched"),
    }

    println!("dropping the transport entirely");
    drop(transport);
    match characteristic.read(0) {
        Err(error) => println!("  read refused: {}", error),
        Ok(()) => println!("  read unexpectedly dispatched"),
    }
}
