//! Deferred batches of work.
//!
//! A [`Batch`] queues labelled actions and domain events without
//! touching anything. [`Batch::commit`] applies the actions in order
//! against a caller-supplied context, then publishes the queued events
//! only when every action succeeded. The first failing action stops the
//! batch: earlier actions stay applied, later ones never run, and no
//! queued event goes out. [`BatchScope`] wraps a batch in a guard that
//! commits on drop, unless the thread is unwinding from a panic.

use crate::bus::EventBus;
use crate::error::{BoxError, StatError};
use std::any::Any;
use std::fmt;
use tracing::{debug, error, trace};

type BatchAction<C> = Box<dyn FnOnce(&mut C) -> Result<(), BoxError> + Send>;
type QueuedEvent = Box<dyn FnOnce(&EventBus) + Send>;

/// Counts reported by a successful [`Batch::commit`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReceipt {
    /// Actions applied to the context.
    pub actions_applied: usize,
    /// Events published after the actions.
    pub events_published: usize,
}

/// A queue of deferred actions and events, run only at commit.
///
/// Actions are labelled closures over a caller-supplied context `C`;
/// events are published on a bus handed to [`commit`](Batch::commit).
/// Nothing runs until commit, and a failing action does not roll back
/// the actions already applied; it only prevents the rest of the batch
/// (and all queued events) from running. The error reports the failing
/// label and how many actions made it in.
///
/// # Examples
///
/// ```rust
/// use statforge::{Batch, EventBus, Stat, ValidationRegistry};
/// use std::sync::Arc;
///
/// let rules = Arc::new(ValidationRegistry::new());
/// let bus = Arc::new(EventBus::new());
/// let mut health = Stat::bounded("health", 100.0, 0.0, 100.0).unwrap();
///
/// let mut batch = Batch::new();
/// let (r, b) = (Arc::clone(&rules), Arc::clone(&bus));
/// batch.queue_action("take damage", move |stat: &mut Stat| {
///     let current = stat.value();
///     stat.set_value(current - 30.0, &r, &b);
///     Ok(())
/// });
///
/// let receipt = batch.commit(&mut health, &bus).unwrap();
/// assert_eq!(receipt.actions_applied, 1);
/// assert_eq!(health.value(), 70.0);
/// ```
pub struct Batch<C> {
    actions: Vec<(String, BatchAction<C>)>,
    events: Vec<QueuedEvent>,
}

impl<C> Batch<C> {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self {
            actions: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Queue a labelled action.
    ///
    /// The label identifies the action in the error when it fails; pick
    /// something a log reader can act on ("apply poison tick"), not a
    /// counter.
    pub fn queue_action<F>(&mut self, label: impl Into<String>, action: F)
    where
        F: FnOnce(&mut C) -> Result<(), BoxError> + Send + 'static,
    {
        self.actions.push((label.into(), Box::new(action)));
    }

    /// Queue a domain event for publication after the actions.
    ///
    /// The event is held by value and only reaches subscribers if every
    /// action succeeds.
    pub fn queue_event<E: Any + Send>(&mut self, event: E) {
        self.events.push(Box::new(move |bus| bus.publish(&event)));
    }

    /// Number of queued actions.
    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    /// Number of queued events.
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// `true` when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty() && self.events.is_empty()
    }

    /// Apply the queued actions in order, then publish the queued
    /// events.
    ///
    /// The first action that fails aborts the batch with
    /// [`StatError::BatchActionFailed`], which names the failing label
    /// and counts the actions already applied. Those stay applied;
    /// later actions never run and no queued event is published.
    pub fn commit(self, ctx: &mut C, bus: &EventBus) -> Result<BatchReceipt, StatError> {
        let actions_applied = self.actions.len();
        for (index, (label, action)) in self.actions.into_iter().enumerate() {
            if let Err(source) = action(ctx) {
                return Err(StatError::BatchActionFailed {
                    label,
                    index,
                    applied: index,
                    source,
                });
            }
        }

        let events_published = self.events.len();
        for event in self.events {
            event(bus);
        }

        debug!(
            target: "statforge::batch",
            actions = actions_applied,
            events = events_published,
            "batch committed"
        );
        Ok(BatchReceipt {
            actions_applied,
            events_published,
        })
    }

    /// Discard the batch without running anything.
    pub fn abandon(self) {
        if !self.is_empty() {
            debug!(
                target: "statforge::batch",
                actions = self.actions.len(),
                events = self.events.len(),
                "batch abandoned"
            );
        }
    }
}

impl<C> Default for Batch<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for Batch<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Batch")
            .field("actions", &self.actions.len())
            .field("events", &self.events.len())
            .finish()
    }
}

/// A guard that commits its batch when it goes out of scope.
///
/// The scope borrows the context and bus up front, so the queued work
/// always has somewhere to land. Dropping the scope commits; a commit
/// failure at drop time is logged rather than surfaced, so callers who
/// care about the receipt (or the error) should call
/// [`commit`](BatchScope::commit) explicitly. When the thread is
/// unwinding from a panic the scope abandons the batch instead of
/// committing half-formed work.
///
/// # Examples
///
/// ```rust
/// use statforge::{BatchScope, EventBus, Stat, ValidationRegistry};
/// use std::sync::Arc;
///
/// let rules = Arc::new(ValidationRegistry::new());
/// let bus = Arc::new(EventBus::new());
/// let mut mana = Stat::bounded("mana", 50.0, 0.0, 100.0).unwrap();
///
/// {
///     let mut scope = BatchScope::begin(&mut mana, &bus);
///     let (r, b) = (Arc::clone(&rules), Arc::clone(&bus));
///     scope.queue_action("regen tick", move |stat: &mut Stat| {
///         let current = stat.value();
///         stat.set_value(current + 10.0, &r, &b);
///         Ok(())
///     });
/// } // scope drops here and commits
///
/// assert_eq!(mana.value(), 60.0);
/// ```
pub struct BatchScope<'a, C> {
    batch: Option<Batch<C>>,
    ctx: &'a mut C,
    bus: &'a EventBus,
}

impl<'a, C> BatchScope<'a, C> {
    /// Open a scope over a context and bus with an empty batch.
    pub fn begin(ctx: &'a mut C, bus: &'a EventBus) -> Self {
        Self {
            batch: Some(Batch::new()),
            ctx,
            bus,
        }
    }

    /// Queue a labelled action; see [`Batch::queue_action`].
    pub fn queue_action<F>(&mut self, label: impl Into<String>, action: F)
    where
        F: FnOnce(&mut C) -> Result<(), BoxError> + Send + 'static,
    {
        if let Some(batch) = self.batch.as_mut() {
            batch.queue_action(label, action);
        }
    }

    /// Queue a domain event; see [`Batch::queue_event`].
    pub fn queue_event<E: Any + Send>(&mut self, event: E) {
        if let Some(batch) = self.batch.as_mut() {
            batch.queue_event(event);
        }
    }

    /// Number of queued actions.
    pub fn action_count(&self) -> usize {
        self.batch.as_ref().map_or(0, Batch::action_count)
    }

    /// Number of queued events.
    pub fn event_count(&self) -> usize {
        self.batch.as_ref().map_or(0, Batch::event_count)
    }

    /// Commit now and take the receipt instead of waiting for drop.
    pub fn commit(mut self) -> Result<BatchReceipt, StatError> {
        let Some(batch) = self.batch.take() else {
            return Ok(BatchReceipt::default());
        };
        batch.commit(self.ctx, self.bus)
    }

    /// Discard the queued work; the drop commit is skipped.
    pub fn abandon(mut self) {
        if let Some(batch) = self.batch.take() {
            batch.abandon();
        }
    }
}

impl<C> fmt::Debug for BatchScope<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchScope")
            .field("actions", &self.action_count())
            .field("events", &self.event_count())
            .finish()
    }
}

impl<C> Drop for BatchScope<'_, C> {
    fn drop(&mut self) {
        let Some(batch) = self.batch.take() else {
            return;
        };
        if std::thread::panicking() {
            trace!(
                target: "statforge::batch",
                actions = batch.action_count(),
                "scope dropped mid-panic; batch abandoned"
            );
            return;
        }
        if let Err(error) = batch.commit(self.ctx, self.bus) {
            error!(target: "statforge::batch", %error, "implicit batch commit failed");
        }
    }
}
