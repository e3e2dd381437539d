//! Events emitted by the session layer, and the subscriber registry
//! that delivers them.
//!
//! This is the contract boundary to everything this crate does NOT do:
//! rendering, input, UI. Those components subscribe here and call the
//! client's outbound operations; nothing else crosses the line.

use std::collections::HashMap;

use tether_protocol::Envelope;

/// An event emitted by the connection state machine.
///
/// Every failure inside `poll` becomes one of these — nothing throws
/// past the tick boundary.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// The connection reached Open for the first time in this attempt.
    Connected,
    /// The connection ended. `reason` is one of `"timeout"`,
    /// `"connect failed"`, `"closed"`, `"init failed"`.
    Disconnected {
        reason: String,
    },
    /// A failure worth showing the user (init failures, timeouts).
    Error {
        message: String,
    },
    /// A decoded envelope arrived. Unknown message types are delivered
    /// too — ignoring them is the subscriber's privilege.
    MessageReceived(Envelope),
    /// Consecutive heartbeats went unacknowledged and the connection
    /// was force-closed.
    HeartbeatTimeout,
}

/// The kind of a [`ClientEvent`], used as a subscription key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Connected,
    Disconnected,
    Error,
    MessageReceived,
    HeartbeatTimeout,
}

impl ClientEvent {
    /// The kind this event dispatches under.
    pub fn kind(&self) -> EventKind {
        match self {
            ClientEvent::Connected => EventKind::Connected,
            ClientEvent::Disconnected { .. } => EventKind::Disconnected,
            ClientEvent::Error { .. } => EventKind::Error,
            ClientEvent::MessageReceived(_) => EventKind::MessageReceived,
            ClientEvent::HeartbeatTimeout => EventKind::HeartbeatTimeout,
        }
    }
}

/// Identifies a subscription so it can be removed later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&ClientEvent)>;

/// Observer registry keyed by event kind.
///
/// The engine-signal replacement: subscribers are plain closures,
/// invoked synchronously and in subscription order on the thread
/// driving `poll`. Subscribing and unsubscribing are ordinary calls,
/// safe at any point of the client's setup or teardown; a subscriber
/// added while an event is being dispatched is not invoked for that
/// instance.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    subscribers: HashMap<EventKind, Vec<(SubscriptionId, Callback)>>,
}

impl EventBus {
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback for one kind of event.
    pub fn subscribe(
        &mut self,
        kind: EventKind,
        callback: impl FnMut(&ClientEvent) + 'static,
    ) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscribers
            .entry(kind)
            .or_default()
            .push((id, Box::new(callback)));
        id
    }

    /// Removes a subscription. Returns whether it existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        for subs in self.subscribers.values_mut() {
            if let Some(pos) = subs.iter().position(|(sid, _)| *sid == id) {
                subs.remove(pos);
                return true;
            }
        }
        false
    }

    /// Invokes every subscriber registered for the event's kind.
    pub fn emit(&mut self, event: &ClientEvent) {
        if let Some(subs) = self.subscribers.get_mut(&event.kind()) {
            for (_, callback) in subs.iter_mut() {
                callback(event);
            }
        }
    }

    /// Number of subscribers for a kind.
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscribers.get(&kind).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder() -> (Rc<RefCell<Vec<EventKind>>>, impl FnMut(&ClientEvent)) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        (seen, move |event: &ClientEvent| {
            sink.borrow_mut().push(event.kind());
        })
    }

    #[test]
    fn test_emit_reaches_matching_subscribers_only() {
        let mut bus = EventBus::new();
        let (connected, on_connected) = recorder();
        let (errors, on_error) = recorder();
        bus.subscribe(EventKind::Connected, on_connected);
        bus.subscribe(EventKind::Error, on_error);

        bus.emit(&ClientEvent::Connected);
        bus.emit(&ClientEvent::Connected);

        assert_eq!(connected.borrow().len(), 2);
        assert!(errors.borrow().is_empty());
    }

    #[test]
    fn test_subscribers_run_in_subscription_order() {
        let mut bus = EventBus::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for tag in ["first", "second", "third"] {
            let sink = Rc::clone(&order);
            bus.subscribe(EventKind::HeartbeatTimeout, move |_| {
                sink.borrow_mut().push(tag);
            });
        }
        bus.emit(&ClientEvent::HeartbeatTimeout);
        assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let mut bus = EventBus::new();
        let (seen, callback) = recorder();
        let id = bus.subscribe(EventKind::Connected, callback);

        bus.emit(&ClientEvent::Connected);
        assert!(bus.unsubscribe(id));
        bus.emit(&ClientEvent::Connected);

        assert_eq!(seen.borrow().len(), 1);
        assert!(!bus.unsubscribe(id), "second removal finds nothing");
    }

    #[test]
    fn test_emit_with_no_subscribers_is_fine() {
        let mut bus = EventBus::new();
        bus.emit(&ClientEvent::Disconnected {
            reason: "closed".into(),
        });
        assert_eq!(bus.subscriber_count(EventKind::Disconnected), 0);
    }

    #[test]
    fn test_event_kinds() {
        assert_eq!(ClientEvent::Connected.kind(), EventKind::Connected);
        assert_eq!(
            ClientEvent::Error {
                message: "x".into()
            }
            .kind(),
            EventKind::Error
        );
        assert_eq!(
            ClientEvent::HeartbeatTimeout.kind(),
            EventKind::HeartbeatTimeout
        );
    }
}
