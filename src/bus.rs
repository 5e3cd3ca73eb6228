//! Typed event bus.
//!
//! Synchronous publish/subscribe keyed by event type. Subscribing fixes
//! the event type at compile time through the generic parameter;
//! dispatch looks it up by `TypeId` and runs handlers in subscription
//! order. A failing handler is logged and skipped; it never stops the
//! remaining handlers and never surfaces to the publisher. Nothing is
//! retained: late subscribers see only future publications.

use crate::error::BoxError;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use tracing::warn;

/// Handle to one subscription.
///
/// Returned by [`EventBus::subscribe`] / [`EventBus::observe`] and
/// consumed by [`EventBus::unsubscribe`]. Unique across the whole bus.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Get the raw id.
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Type-erased handler. The wrapper built at subscribe time downcasts
/// back to the concrete event type, which always succeeds because the
/// subscriber list is keyed by that type's `TypeId`.
type ErasedHandler = Box<dyn Fn(&dyn Any) -> Result<(), BoxError> + Send + Sync>;

struct Subscriber {
    id: SubscriptionId,
    handler: ErasedHandler,
}

impl std::fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscriber")
            .field("id", &self.id)
            .field("handler", &"<fn>")
            .finish()
    }
}

/// Synchronous, type-keyed publish/subscribe channel.
///
/// Decouples stat mutation from observers: the mutation pipeline
/// publishes payloads from [`crate::event`], and any number of handlers
/// per event type receive them in subscription order before the publish
/// call returns.
///
/// # Examples
///
/// ```rust
/// use statforge::{EventBus, StatChanged, StatName};
/// use std::sync::{Arc, Mutex};
///
/// let mut bus = EventBus::new();
/// let seen = Arc::new(Mutex::new(Vec::new()));
///
/// let sink = Arc::clone(&seen);
/// bus.observe::<StatChanged, _>(move |event| {
///     sink.lock().unwrap().push(event.new_value);
/// });
///
/// bus.publish(&StatChanged {
///     name: StatName::new("health"),
///     owner: None,
///     old_value: 50.0,
///     new_value: 75.0,
/// });
///
/// assert_eq!(*seen.lock().unwrap(), vec![75.0]);
/// ```
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: HashMap<TypeId, Vec<Subscriber>>,
    next_id: u64,
}

impl EventBus {
    /// Create a bus with no subscriptions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a fallible handler to one event type.
    ///
    /// The same closure state can be subscribed to several event types
    /// independently; each call returns its own id. Handler errors are
    /// isolated at publish time: logged with the subscription id, never
    /// propagated.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use statforge::{EventBus, ModifiersCleared};
    ///
    /// let mut bus = EventBus::new();
    /// bus.subscribe::<ModifiersCleared, _>(|event| {
    ///     if event.removed > 10 {
    ///         return Err("suspiciously large reset".into());
    ///     }
    ///     Ok(())
    /// });
    /// assert_eq!(bus.subscriber_count::<ModifiersCleared>(), 1);
    /// ```
    pub fn subscribe<E, F>(&mut self, handler: F) -> SubscriptionId
    where
        E: Any,
        F: Fn(&E) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;

        let erased: ErasedHandler = Box::new(move |event| match event.downcast_ref::<E>() {
            Some(event) => handler(event),
            // Unreachable: the subscriber list is keyed by E's TypeId
            None => Ok(()),
        });

        self.subscribers
            .entry(TypeId::of::<E>())
            .or_default()
            .push(Subscriber { id, handler: erased });
        id
    }

    /// Subscribe an infallible handler to one event type.
    ///
    /// Convenience wrapper over [`subscribe`](EventBus::subscribe) for
    /// observers that cannot fail.
    pub fn observe<E, F>(&mut self, handler: F) -> SubscriptionId
    where
        E: Any,
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.subscribe::<E, _>(move |event| {
            handler(event);
            Ok(())
        })
    }

    /// Drop one subscription to the given event type.
    ///
    /// Returns whether anything was removed. The type parameter must
    /// match the type the id was subscribed under.
    pub fn unsubscribe<E: Any>(&mut self, id: SubscriptionId) -> bool {
        let Some(subs) = self.subscribers.get_mut(&TypeId::of::<E>()) else {
            return false;
        };
        let before = subs.len();
        subs.retain(|s| s.id != id);
        before != subs.len()
    }

    /// Synchronously deliver an event to every handler subscribed to its
    /// exact type, in subscription order.
    ///
    /// A handler returning an error is logged at warn level and skipped;
    /// delivery to the remaining handlers continues and the publisher
    /// never sees the failure. Publishing a type with no subscribers is
    /// a no-op.
    pub fn publish<E: Any>(&self, event: &E) {
        let Some(subs) = self.subscribers.get(&TypeId::of::<E>()) else {
            return;
        };

        for sub in subs {
            if let Err(error) = (sub.handler)(event) {
                warn!(
                    target: "statforge::bus",
                    subscription = sub.id.raw(),
                    event = std::any::type_name::<E>(),
                    %error,
                    "event handler failed"
                );
            }
        }
    }

    /// Number of handlers currently subscribed to an event type.
    pub fn subscriber_count<E: Any>(&self) -> usize {
        self.subscribers
            .get(&TypeId::of::<E>())
            .map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{ModifierAdded, StatChanged};
    use crate::ident::StatName;
    use std::sync::{Arc, Mutex};

    fn changed(name: &str, old_value: f64, new_value: f64) -> StatChanged {
        StatChanged {
            name: StatName::new(name),
            owner: None,
            old_value,
            new_value,
        }
    }

    #[test]
    fn test_publish_reaches_subscriber() {
        let mut bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        bus.observe::<StatChanged, _>(move |e| sink.lock().unwrap().push(e.new_value));

        bus.publish(&changed("health", 10.0, 20.0));
        bus.publish(&changed("health", 20.0, 5.0));

        assert_eq!(*seen.lock().unwrap(), vec![20.0, 5.0]);
    }

    #[test]
    fn test_handlers_run_in_subscription_order() {
        let mut bus = EventBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for tag in 1..=3 {
            let sink = Arc::clone(&order);
            bus.observe::<StatChanged, _>(move |_| sink.lock().unwrap().push(tag));
        }

        bus.publish(&changed("health", 0.0, 1.0));
        assert_eq!(*order.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_handler_error_does_not_stop_delivery() {
        let mut bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        bus.observe::<StatChanged, _>(move |_| sink.lock().unwrap().push("first"));
        bus.subscribe::<StatChanged, _>(|_| Err("handler exploded".into()));
        let sink = Arc::clone(&seen);
        bus.observe::<StatChanged, _>(move |_| sink.lock().unwrap().push("third"));

        bus.publish(&changed("health", 0.0, 1.0));
        assert_eq!(*seen.lock().unwrap(), vec!["first", "third"]);
    }

    #[test]
    fn test_events_are_type_isolated() {
        let mut bus = EventBus::new();
        let count = Arc::new(Mutex::new(0));

        let sink = Arc::clone(&count);
        bus.observe::<ModifierAdded, _>(move |_| *sink.lock().unwrap() += 1);

        bus.publish(&changed("health", 0.0, 1.0));
        assert_eq!(*count.lock().unwrap(), 0);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let mut bus = EventBus::new();
        let count = Arc::new(Mutex::new(0));

        let sink = Arc::clone(&count);
        let id = bus.observe::<StatChanged, _>(move |_| *sink.lock().unwrap() += 1);

        bus.publish(&changed("health", 0.0, 1.0));
        assert!(bus.unsubscribe::<StatChanged>(id));
        bus.publish(&changed("health", 1.0, 2.0));

        assert_eq!(*count.lock().unwrap(), 1);
        // Second removal is a miss
        assert!(!bus.unsubscribe::<StatChanged>(id));
    }

    #[test]
    fn test_no_retention_for_late_subscribers() {
        let mut bus = EventBus::new();
        bus.publish(&changed("health", 0.0, 1.0));

        let count = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&count);
        bus.observe::<StatChanged, _>(move |_| *sink.lock().unwrap() += 1);

        bus.publish(&changed("health", 1.0, 2.0));
        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn test_publish_with_no_subscribers_is_noop() {
        let bus = EventBus::new();
        bus.publish(&changed("health", 0.0, 1.0));
        assert_eq!(bus.subscriber_count::<StatChanged>(), 0);
    }

    #[test]
    fn test_subscription_ids_are_unique_across_types() {
        let mut bus = EventBus::new();
        let a = bus.observe::<StatChanged, _>(|_| {});
        let b = bus.observe::<ModifierAdded, _>(|_| {});
        assert_ne!(a, b);
    }
}
