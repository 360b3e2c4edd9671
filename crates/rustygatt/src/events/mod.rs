//! Completion event routing
//!
//! Transports complete read and write requests asynchronously and announce
//! the outcomes on shared broadcast streams. This module provides that
//! stream type together with the subscriptions that consume it: persistent
//! listeners that observe every event, and armed one-shot listeners that
//! wait for the completion of a single request aimed at one
//! (connection handle, attribute handle) target.
//!
//! Every subscription is identified by a [`ListenerToken`]. The stream owns
//! the listener for its whole lifetime: a one-shot is removed by exactly one
//! of firing, [`EventStream::unsubscribe`] or
//! [`EventStream::purge_connection`], so a listener can never outlive the
//! stream it is registered on and never runs twice.

use log::{debug, trace};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[cfg(test)]
mod tests;

/// Access to the target pair a completion event is matched on.
pub trait CompletionEvent {
    /// Handle of the connection the completed request ran on.
    fn connection_handle(&self) -> u16;
    /// Handle of the attribute the completed request targeted.
    fn attribute_handle(&self) -> u16;
}

/// Identity of one subscription on one [`EventStream`].
///
/// Tokens are never reused within a stream. Unsubscribing with a stale token
/// (already fired, cancelled or purged) is a harmless no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerToken(u64);

enum Listener<E> {
    /// Long-lived and unfiltered, sees every event until unsubscribed.
    Persistent(Arc<Mutex<dyn FnMut(&E) + Send>>),
    /// Armed for a single completion aimed at one target.
    OneShot {
        connection_handle: u16,
        attribute_handle: u16,
        callback: Box<dyn FnOnce(&E) + Send>,
    },
}

/// Delivery planned while the registry lock is held, run after it is
/// released so callbacks may call back into the stream.
enum Delivery<E> {
    Shared(Arc<Mutex<dyn FnMut(&E) + Send>>),
    Once(Box<dyn FnOnce(&E) + Send>),
}

struct Registry<E> {
    next_token: u64,
    /// Registration order, which is also dispatch order.
    slots: Vec<(ListenerToken, Listener<E>)>,
    /// Events emitted from inside a callback, delivered by the dispatch
    /// already running once the current event is done.
    deferred: VecDeque<E>,
    dispatching: bool,
}

impl<E: CompletionEvent> Registry<E> {
    fn allocate_token(&mut self) -> ListenerToken {
        let token = ListenerToken(self.next_token);
        self.next_token += 1;
        token
    }

    /// Collects the deliveries for one event, removing the first matching
    /// one-shot from its slot. Runs with the registry lock held; the
    /// callbacks themselves run later, after it is released.
    fn plan_delivery(&mut self, event: &E) -> Vec<Delivery<E>> {
        let mut plan = Vec::new();
        let mut index = 0;
        let mut fired = false;
        while index < self.slots.len() {
            let matches = match &self.slots[index].1 {
                Listener::Persistent(callback) => {
                    plan.push(Delivery::Shared(Arc::clone(callback)));
                    false
                }
                Listener::OneShot {
                    connection_handle,
                    attribute_handle,
                    ..
                } => {
                    !fired
                        && *connection_handle == event.connection_handle()
                        && *attribute_handle == event.attribute_handle()
                }
            };
            if matches {
                let (token, listener) = self.slots.remove(index);
                if let Listener::OneShot { callback, .. } = listener {
                    trace!(
                        "one-shot listener {:?} fired for conn {:#06x} attr {:#06x}",
                        token,
                        event.connection_handle(),
                        event.attribute_handle()
                    );
                    plan.push(Delivery::Once(callback));
                }
                fired = true;
            } else {
                index += 1;
            }
        }
        plan
    }
}

/// Broadcast stream of completion events.
///
/// A transport keeps one stream per event kind and emits into it from its
/// dispatch loop. Listener state lives here, not in the listeners
/// themselves, so cancellation and connection-loss cleanup are plain
/// registry edits.
pub struct EventStream<E> {
    registry: Mutex<Registry<E>>,
}

impl<E: CompletionEvent> EventStream<E> {
    pub fn new() -> Self {
        EventStream {
            registry: Mutex::new(Registry {
                next_token: 0,
                slots: Vec::new(),
                deferred: VecDeque::new(),
                dispatching: false,
            }),
        }
    }

    /// Registers a persistent listener invoked for every event emitted on
    /// this stream, until its token is unsubscribed.
    pub fn subscribe<F>(&self, callback: F) -> ListenerToken
    where
        F: FnMut(&E) + Send + 'static,
    {
        let mut registry = self.registry.lock().unwrap();
        let token = registry.allocate_token();
        registry
            .slots
            .push((token, Listener::Persistent(Arc::new(Mutex::new(callback)))));
        trace!("listener {:?} subscribed", token);
        token
    }

    /// Arms a one-shot listener for the next event whose connection and
    /// attribute handles both equal the given target.
    ///
    /// The listener fires at most once. Its slot is removed before the
    /// callback runs, so a matching event emitted from inside the callback
    /// cannot fire it a second time.
    pub fn subscribe_once<F>(
        &self,
        connection_handle: u16,
        attribute_handle: u16,
        callback: F,
    ) -> ListenerToken
    where
        F: FnOnce(&E) + Send + 'static,
    {
        let mut registry = self.registry.lock().unwrap();
        let token = registry.allocate_token();
        registry.slots.push((
            token,
            Listener::OneShot {
                connection_handle,
                attribute_handle,
                callback: Box::new(callback),
            },
        ));
        trace!(
            "one-shot listener {:?} armed for conn {:#06x} attr {:#06x}",
            token,
            connection_handle,
            attribute_handle
        );
        token
    }

    /// Removes a subscription. Returns false if the token no longer
    /// identifies a live listener.
    pub fn unsubscribe(&self, token: ListenerToken) -> bool {
        let mut registry = self.registry.lock().unwrap();
        let before = registry.slots.len();
        registry.slots.retain(|(slot, _)| *slot != token);
        let removed = registry.slots.len() != before;
        if removed {
            trace!("listener {:?} unsubscribed", token);
        }
        removed
    }

    /// Delivers an event to every persistent listener and to at most one
    /// matching one-shot listener.
    ///
    /// When several one-shots are armed for the same target, the earliest
    /// registered one fires and the rest stay armed for later events.
    /// Callbacks run in registration order with the registry unlocked, so
    /// they may subscribe, unsubscribe or emit on this same stream. An event
    /// emitted from inside a callback is deferred and dispatched after the
    /// current delivery finishes, in emission order; delivering it inline
    /// would re-enter the persistent callback currently running.
    pub fn emit(&self, event: &E)
    where
        E: Clone,
    {
        let plan = {
            let mut registry = self.registry.lock().unwrap();
            if registry.dispatching {
                trace!(
                    "deferred re-entrant event for conn {:#06x} attr {:#06x}",
                    event.connection_handle(),
                    event.attribute_handle()
                );
                registry.deferred.push_back(event.clone());
                return;
            }
            registry.dispatching = true;
            registry.plan_delivery(event)
        };
        self.run_plan(plan, event);

        // Drain whatever the callbacks emitted while the plan above ran
        loop {
            let next = {
                let mut registry = self.registry.lock().unwrap();
                match registry.deferred.pop_front() {
                    Some(deferred) => {
                        let plan = registry.plan_delivery(&deferred);
                        Some((plan, deferred))
                    }
                    None => {
                        registry.dispatching = false;
                        None
                    }
                }
            };
            match next {
                Some((plan, deferred)) => self.run_plan(plan, &deferred),
                None => break,
            }
        }
    }

    fn run_plan(&self, plan: Vec<Delivery<E>>, event: &E) {
        for delivery in plan {
            match delivery {
                Delivery::Shared(callback) => {
                    let mut callback = callback.lock().unwrap();
                    (*callback)(event);
                }
                Delivery::Once(callback) => callback(event),
            }
        }
    }

    /// Drops every one-shot listener armed for the given connection.
    /// Transports call this when a link goes down, since the completions
    /// those listeners wait for can no longer arrive. Persistent listeners
    /// are kept. Returns the number of listeners removed.
    pub fn purge_connection(&self, connection_handle: u16) -> usize {
        let mut registry = self.registry.lock().unwrap();
        let before = registry.slots.len();
        registry.slots.retain(|(_, listener)| match listener {
            Listener::OneShot {
                connection_handle: target,
                ..
            } => *target != connection_handle,
            Listener::Persistent(_) => true,
        });
        let removed = before - registry.slots.len();
        if removed > 0 {
            debug!(
                "purged {} armed listener(s) for connection {:#06x}",
                removed, connection_handle
            );
        }
        removed
    }

    /// Number of live subscriptions, persistent and armed alike.
    pub fn listener_count(&self) -> usize {
        self.registry.lock().unwrap().slots.len()
    }
}

impl<E: CompletionEvent> Default for EventStream<E> {
    fn default() -> Self {
        EventStream::new()
    }
}
