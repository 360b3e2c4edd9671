//! Unit tests for completion event routing

use super::EventStream;
use crate::transport::{CompletionStatus, ReadCompletion};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn read_completion(connection_handle: u16, handle: u16, value: &[u8]) -> ReadCompletion {
    ReadCompletion {
        connection_handle,
        handle,
        offset: 0,
        value: value.to_vec(),
        status: CompletionStatus::Success,
    }
}

#[test]
fn test_one_shot_fires_at_most_once() {
    let stream = EventStream::new();
    let seen = Arc::new(Mutex::new(Vec::new()));

    {
        let seen = Arc::clone(&seen);
        stream.subscribe_once(0x0040, 0x0010, move |event: &ReadCompletion| {
            seen.lock().unwrap().push(event.value.clone());
        });
    }

    stream.emit(&read_completion(0x0040, 0x0010, &[0x01]));
    stream.emit(&read_completion(0x0040, 0x0010, &[0x02]));
    stream.emit(&read_completion(0x0040, 0x0010, &[0x03]));

    // Only the first matching event was delivered
    assert_eq!(seen.lock().unwrap().as_slice(), &[vec![0x01]]);
}

#[test]
fn test_one_shot_ignores_other_targets() {
    let stream = EventStream::new();
    let seen = Arc::new(Mutex::new(Vec::new()));

    {
        let seen = Arc::clone(&seen);
        stream.subscribe_once(0x0040, 0x0010, move |event: &ReadCompletion| {
            seen.lock().unwrap().push(event.value.clone());
        });
    }

    // Same handle on another connection, another handle on the same one
    stream.emit(&read_completion(0x0041, 0x0010, &[0xAA]));
    stream.emit(&read_completion(0x0040, 0x0011, &[0xBB]));
    assert!(seen.lock().unwrap().is_empty());
    assert_eq!(stream.listener_count(), 1);

    stream.emit(&read_completion(0x0040, 0x0010, &[0xCC]));
    assert_eq!(seen.lock().unwrap().as_slice(), &[vec![0xCC]]);
}

#[test]
fn test_one_shot_slot_removed_by_firing() {
    let stream = EventStream::new();
    stream.subscribe_once(1, 2, |_: &ReadCompletion| {});

    assert_eq!(stream.listener_count(), 1);
    stream.emit(&read_completion(1, 2, &[]));
    assert_eq!(stream.listener_count(), 0);
}

#[test]
fn test_unsubscribe_cancels_armed_listener() {
    let stream = EventStream::new();
    let hits = Arc::new(AtomicUsize::new(0));

    let token = {
        let hits = Arc::clone(&hits);
        stream.subscribe_once(1, 2, move |_: &ReadCompletion| {
            hits.fetch_add(1, Ordering::SeqCst);
        })
    };

    assert!(stream.unsubscribe(token));
    stream.emit(&read_completion(1, 2, &[]));

    assert_eq!(hits.load(Ordering::SeqCst), 0);
    // The token went stale when the listener was removed
    assert!(!stream.unsubscribe(token));
}

#[test]
fn test_unsubscribe_persistent_listener() {
    let stream = EventStream::new();
    let hits = Arc::new(AtomicUsize::new(0));

    let token = {
        let hits = Arc::clone(&hits);
        stream.subscribe(move |_: &ReadCompletion| {
            hits.fetch_add(1, Ordering::SeqCst);
        })
    };

    stream.emit(&read_completion(1, 2, &[]));
    assert!(stream.unsubscribe(token));
    stream.emit(&read_completion(1, 2, &[]));

    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn test_persistent_listener_sees_every_event() {
    let stream = EventStream::new();
    let all = Arc::new(Mutex::new(Vec::new()));
    let once = Arc::new(AtomicUsize::new(0));

    {
        let all = Arc::clone(&all);
        stream.subscribe(move |event: &ReadCompletion| {
            all.lock().unwrap().push(event.handle);
        });
    }
    {
        let once = Arc::clone(&once);
        stream.subscribe_once(1, 2, move |_: &ReadCompletion| {
            once.fetch_add(1, Ordering::SeqCst);
        });
    }

    stream.emit(&read_completion(1, 2, &[]));
    stream.emit(&read_completion(1, 3, &[]));
    stream.emit(&read_completion(9, 2, &[]));

    // The persistent listener is unfiltered; the one-shot fired once
    assert_eq!(all.lock().unwrap().as_slice(), &[2, 3, 2]);
    assert_eq!(once.load(Ordering::SeqCst), 1);
    assert_eq!(stream.listener_count(), 1);
}

#[test]
fn test_back_to_back_one_shots_consume_one_event_each() {
    let stream = EventStream::new();
    let first_seen = Arc::new(Mutex::new(Vec::new()));
    let second_seen = Arc::new(Mutex::new(Vec::new()));

    {
        let first_seen = Arc::clone(&first_seen);
        stream.subscribe_once(0x0040, 0x0010, move |event: &ReadCompletion| {
            first_seen.lock().unwrap().push(event.value.clone());
        });
    }
    {
        let second_seen = Arc::clone(&second_seen);
        stream.subscribe_once(0x0040, 0x0010, move |event: &ReadCompletion| {
            second_seen.lock().unwrap().push(event.value.clone());
        });
    }

    // One event consumes one listener, the earliest registered first
    stream.emit(&read_completion(0x0040, 0x0010, &[0xA1]));
    assert_eq!(first_seen.lock().unwrap().as_slice(), &[vec![0xA1]]);
    assert!(second_seen.lock().unwrap().is_empty());
    assert_eq!(stream.listener_count(), 1);

    stream.emit(&read_completion(0x0040, 0x0010, &[0xA2]));
    assert_eq!(first_seen.lock().unwrap().as_slice(), &[vec![0xA1]]);
    assert_eq!(second_seen.lock().unwrap().as_slice(), &[vec![0xA2]]);
    assert_eq!(stream.listener_count(), 0);
}

#[test]
fn test_purge_connection_drops_armed_listeners_only() {
    let stream = EventStream::new();
    let lost = Arc::new(AtomicUsize::new(0));
    let kept = Arc::new(AtomicUsize::new(0));
    let persistent = Arc::new(AtomicUsize::new(0));

    for handle in [0x0010, 0x0011] {
        let lost = Arc::clone(&lost);
        stream.subscribe_once(0x0040, handle, move |_: &ReadCompletion| {
            lost.fetch_add(1, Ordering::SeqCst);
        });
    }
    {
        let kept = Arc::clone(&kept);
        stream.subscribe_once(0x0041, 0x0010, move |_: &ReadCompletion| {
            kept.fetch_add(1, Ordering::SeqCst);
        });
    }
    {
        let persistent = Arc::clone(&persistent);
        stream.subscribe(move |_: &ReadCompletion| {
            persistent.fetch_add(1, Ordering::SeqCst);
        });
    }

    // Connection 0x0040 went down
    assert_eq!(stream.purge_connection(0x0040), 2);
    assert_eq!(stream.listener_count(), 2);

    stream.emit(&read_completion(0x0040, 0x0010, &[]));
    stream.emit(&read_completion(0x0041, 0x0010, &[]));

    assert_eq!(lost.load(Ordering::SeqCst), 0);
    assert_eq!(kept.load(Ordering::SeqCst), 1);
    assert_eq!(persistent.load(Ordering::SeqCst), 2);

    // Nothing left to purge
    assert_eq!(stream.purge_connection(0x0040), 0);
}

#[test]
fn test_rearm_from_inside_callback_waits_for_next_event() {
    let stream = Arc::new(EventStream::new());
    let rearmed_hits = Arc::new(AtomicUsize::new(0));

    {
        let stream = Arc::clone(&stream);
        let rearmed_hits = Arc::clone(&rearmed_hits);
        stream.clone().subscribe_once(1, 2, move |_: &ReadCompletion| {
            let rearmed_hits = Arc::clone(&rearmed_hits);
            stream.subscribe_once(1, 2, move |_: &ReadCompletion| {
                rearmed_hits.fetch_add(1, Ordering::SeqCst);
            });
        });
    }

    // The listener armed during delivery must not see the event that
    // triggered it
    stream.emit(&read_completion(1, 2, &[]));
    assert_eq!(rearmed_hits.load(Ordering::SeqCst), 0);
    assert_eq!(stream.listener_count(), 1);

    stream.emit(&read_completion(1, 2, &[]));
    assert_eq!(rearmed_hits.load(Ordering::SeqCst), 1);
}

#[test]
fn test_emit_from_inside_callback() {
    let stream = Arc::new(EventStream::new());
    let first_seen = Arc::new(Mutex::new(Vec::new()));
    let second_seen = Arc::new(Mutex::new(Vec::new()));

    {
        let stream = Arc::clone(&stream);
        let first_seen = Arc::clone(&first_seen);
        stream.clone().subscribe_once(1, 2, move |event: &ReadCompletion| {
            first_seen.lock().unwrap().push(event.value.clone());
            stream.emit(&read_completion(1, 2, &[0xB2]));
        });
    }
    {
        let second_seen = Arc::clone(&second_seen);
        stream.subscribe_once(1, 2, move |event: &ReadCompletion| {
            second_seen.lock().unwrap().push(event.value.clone());
        });
    }

    stream.emit(&read_completion(1, 2, &[0xB1]));

    // The nested event was delivered after the first one finished, and the
    // first listener was already detached by then, so it reached the second
    // listener only
    assert_eq!(first_seen.lock().unwrap().as_slice(), &[vec![0xB1]]);
    assert_eq!(second_seen.lock().unwrap().as_slice(), &[vec![0xB2]]);
    assert_eq!(stream.listener_count(), 0);
}

#[test]
fn test_persistent_listener_may_emit_followup_events() {
    let stream = Arc::new(EventStream::new());
    let seen = Arc::new(Mutex::new(Vec::new()));

    {
        let stream = Arc::clone(&stream);
        let seen = Arc::clone(&seen);
        stream.clone().subscribe(move |event: &ReadCompletion| {
            seen.lock().unwrap().push(event.handle);
            // A completion on handle 2 triggers a follow-up request whose
            // completion lands on handle 3
            if event.handle == 2 {
                stream.emit(&read_completion(1, 3, &[]));
            }
        });
    }

    stream.emit(&read_completion(1, 2, &[]));

    // The follow-up was deferred until the first delivery finished, then
    // dispatched to the same listener without re-entering it
    assert_eq!(seen.lock().unwrap().as_slice(), &[2, 3]);
}

#[test]
fn test_tokens_are_unique() {
    let stream = EventStream::new();
    let a = stream.subscribe(|_: &ReadCompletion| {});
    let b = stream.subscribe_once(1, 2, |_: &ReadCompletion| {});
    let c = stream.subscribe_once(1, 2, |_: &ReadCompletion| {});

    assert_ne!(a, b);
    assert_ne!(b, c);
    assert_ne!(a, c);
}

#[test]
fn test_failed_completion_is_delivered_like_any_other() {
    let stream = EventStream::new();
    let statuses = Arc::new(Mutex::new(Vec::new()));

    {
        let statuses = Arc::clone(&statuses);
        stream.subscribe_once(1, 2, move |event: &ReadCompletion| {
            statuses.lock().unwrap().push(event.status.clone());
        });
    }

    stream.emit(&ReadCompletion {
        connection_handle: 1,
        handle: 2,
        offset: 0,
        value: Vec::new(),
        status: CompletionStatus::Failed(crate::transport::TransportError::Timeout),
    });

    let statuses = statuses.lock().unwrap();
    assert_eq!(statuses.len(), 1);
    assert!(!statuses[0].is_success());
}
