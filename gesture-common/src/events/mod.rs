//! Event types and the GestureDispatcher hub
//!
//! The dispatcher is an explicitly constructed, cloneable handle. The
//! composition root creates one per device session and passes clones to the
//! link pipeline (publisher) and to consumers (subscribers).

mod gesture_types;
mod link_types;

pub use gesture_types::{GestureEvent, GestureKind, GestureOrigin};
pub use link_types::ConnectionState;

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use tracing::{debug, error};

/// Handle returned by [`GestureDispatcher::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

type Handler = Arc<dyn Fn(&GestureEvent) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    /// Kept in subscription order
    handlers: Vec<(SubscriptionId, Handler)>,
}

/// Synchronous publish/subscribe hub for gesture events
///
/// - Fan-out happens on the publisher's thread, in subscription order
/// - No buffering: a subscriber added after an event was published never sees it
/// - The subscriber list is snapshotted at publish time; a handler that is
///   unsubscribed mid-dispatch is skipped for the rest of that publish
/// - A panicking handler is logged and does not stop delivery to the others
///
/// # Examples
///
/// ```
/// use gesture_common::{GestureDispatcher, GestureEvent, GestureKind};
///
/// let dispatcher = GestureDispatcher::new();
/// let id = dispatcher.subscribe(|event| println!("{} at {:.2}s", event.kind, event.timestamp));
///
/// dispatcher.publish(&GestureEvent::classified(GestureKind::Stomp, 0.0));
/// dispatcher.unsubscribe(id);
/// ```
#[derive(Clone, Default)]
pub struct GestureDispatcher {
    registry: Arc<Mutex<Registry>>,
}

impl GestureDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        // Handlers never run under this lock, so a poisoned registry is still consistent
        self.registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a handler for all future events
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&GestureEvent) + Send + Sync + 'static,
    {
        let mut registry = self.registry();
        let id = SubscriptionId(registry.next_id);
        registry.next_id += 1;
        registry.handlers.push((id, Arc::new(handler)));
        debug!(subscription = %id, "Gesture subscriber added");
        id
    }

    /// Subscribe with an unbounded channel, for async consumers
    ///
    /// Events published after the receiver is dropped are discarded; call
    /// [`unsubscribe`](Self::unsubscribe) to release the slot.
    pub fn subscribe_channel(&self) -> (SubscriptionId, mpsc::UnboundedReceiver<GestureEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.subscribe(move |event| {
            let _ = tx.send(event.clone());
        });
        (id, rx)
    }

    /// Remove a handler. Returns `false` if the id was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut registry = self.registry();
        let before = registry.handlers.len();
        registry.handlers.retain(|(existing, _)| *existing != id);
        let removed = registry.handlers.len() != before;
        if removed {
            debug!(subscription = %id, "Gesture subscriber removed");
        }
        removed
    }

    fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.registry().handlers.iter().any(|(existing, _)| *existing == id)
    }

    /// Deliver an event to every current subscriber
    ///
    /// Returns the number of handlers that ran to completion.
    pub fn publish(&self, event: &GestureEvent) -> usize {
        let snapshot: Vec<(SubscriptionId, Handler)> = self.registry().handlers.clone();

        if snapshot.is_empty() {
            debug!(kind = %event.kind, "No subscribers for gesture event");
            return 0;
        }

        let mut delivered = 0;
        for (id, handler) in snapshot {
            if !self.is_subscribed(id) {
                continue;
            }
            match panic::catch_unwind(AssertUnwindSafe(|| handler(event))) {
                Ok(()) => delivered += 1,
                Err(_) => {
                    error!(subscription = %id, kind = %event.kind, "Gesture subscriber panicked");
                }
            }
        }
        delivered
    }

    /// Get the current number of subscribers
    pub fn subscriber_count(&self) -> usize {
        self.registry().handlers.len()
    }
}

impl fmt::Debug for GestureDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureDispatcher")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn stomp(at: f64) -> GestureEvent {
        GestureEvent::classified(GestureKind::Stomp, at)
    }

    #[test]
    fn test_dispatcher_new_has_no_subscribers() {
        let dispatcher = GestureDispatcher::new();
        assert_eq!(dispatcher.subscriber_count(), 0);
        assert_eq!(dispatcher.publish(&stomp(0.0)), 0);
    }

    #[test]
    fn test_publish_reaches_all_subscribers_in_order() {
        let dispatcher = GestureDispatcher::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for tag in ["a", "b", "c"] {
            let order = Arc::clone(&order);
            dispatcher.subscribe(move |_| order.lock().unwrap().push(tag));
        }

        assert_eq!(dispatcher.publish(&stomp(0.0)), 3);
        assert_eq!(*order.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_each_publish_delivers_exactly_once() {
        let dispatcher = GestureDispatcher::new();
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        dispatcher.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        dispatcher.publish(&stomp(0.0));
        dispatcher.publish(&stomp(1.0));
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let dispatcher = GestureDispatcher::new();
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let id = dispatcher.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(dispatcher.unsubscribe(id));
        assert!(!dispatcher.unsubscribe(id), "second unsubscribe is a no-op");
        dispatcher.publish(&stomp(0.0));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unsubscribe_during_dispatch_skips_removed_handler() {
        let dispatcher = GestureDispatcher::new();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let victim: Arc<Mutex<Option<SubscriptionId>>> = Arc::new(Mutex::new(None));

        // First handler removes the second one while the publish is in flight
        {
            let hub = dispatcher.clone();
            let victim = Arc::clone(&victim);
            let calls = Arc::clone(&calls);
            dispatcher.subscribe(move |_| {
                calls.lock().unwrap().push("remover");
                if let Some(id) = victim.lock().unwrap().take() {
                    hub.unsubscribe(id);
                }
            });
        }
        {
            let calls = Arc::clone(&calls);
            let id = dispatcher.subscribe(move |_| calls.lock().unwrap().push("victim"));
            *victim.lock().unwrap() = Some(id);
        }
        {
            let calls = Arc::clone(&calls);
            dispatcher.subscribe(move |_| calls.lock().unwrap().push("bystander"));
        }

        let delivered = dispatcher.publish(&stomp(0.0));

        assert_eq!(delivered, 2);
        assert_eq!(*calls.lock().unwrap(), vec!["remover", "bystander"]);
        assert_eq!(dispatcher.subscriber_count(), 2);
    }

    #[test]
    fn test_late_subscriber_does_not_see_earlier_events() {
        let dispatcher = GestureDispatcher::new();
        dispatcher.publish(&stomp(0.0));

        let (_id, mut rx) = dispatcher.subscribe_channel();
        assert!(rx.try_recv().is_err(), "nothing is buffered for late subscribers");

        dispatcher.publish(&stomp(1.0));
        let received = rx.try_recv().expect("event published after subscribing");
        assert_eq!(received.timestamp, 1.0);
    }

    #[test]
    fn test_panicking_subscriber_does_not_block_others() {
        let dispatcher = GestureDispatcher::new();
        let count = Arc::new(AtomicUsize::new(0));

        dispatcher.subscribe(|_| panic!("subscriber failure"));
        let counter = Arc::clone(&count);
        dispatcher.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(dispatcher.publish(&stomp(0.0)), 1);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(dispatcher.subscriber_count(), 2);
    }

    #[test]
    fn test_gesture_kind_parse_is_case_insensitive() {
        assert_eq!("STOMP".parse::<GestureKind>(), Ok(GestureKind::Stomp));
        assert_eq!(" Kick ".parse::<GestureKind>(), Ok(GestureKind::Kick));
        assert_eq!("jump".parse::<GestureKind>(), Err("jump".to_string()));
    }

    #[test]
    fn test_gesture_event_serialization() {
        let event = GestureEvent::remote(GestureKind::Kick, 12.5);
        let json = serde_json::to_string(&event).expect("Serialization should succeed");
        assert!(json.contains("\"kind\":\"kick\""));
        assert!(json.contains("\"origin\":\"remote\""));
        assert!(json.contains("\"timestamp\":12.5"));
    }
}
