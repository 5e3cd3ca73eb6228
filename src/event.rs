//! Event payloads.
//!
//! Immutable records describing observable stat changes. The stat
//! mutation pipeline publishes them through the event bus: the specific
//! modifier event first, then [`StatChanged`] iff the effective value
//! actually moved. Reads never publish.

use crate::ident::{EntityId, ModifierId, StatName};
use crate::modifier::ModifierKind;
use std::sync::Arc;
use std::time::Duration;

/// The effective value of a stat moved.
///
/// Fires once per accepted, value-changing mutation; never for
/// mutations that validation rejected or that left the value equal.
///
/// # Examples
///
/// ```rust
/// use statforge::{EntityId, StatChanged, StatName};
///
/// let event = StatChanged {
///     name: StatName::new("health"),
///     owner: Some(EntityId::new(1)),
///     old_value: 80.0,
///     new_value: 100.0,
/// };
/// assert_eq!(event.delta(), 20.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StatChanged {
    /// Which stat changed.
    pub name: StatName,
    /// The entity the stat is attached to, if any.
    pub owner: Option<EntityId>,
    /// Effective value before the mutation.
    pub old_value: f64,
    /// Effective value after the mutation.
    pub new_value: f64,
}

impl StatChanged {
    /// Signed change in the effective value.
    pub fn delta(&self) -> f64 {
        self.new_value - self.old_value
    }
}

/// A modifier entered a stat's stack.
#[derive(Debug, Clone, PartialEq)]
pub struct ModifierAdded {
    /// Which stat gained the modifier.
    pub name: StatName,
    /// The entity the stat is attached to, if any.
    pub owner: Option<EntityId>,
    /// Handle the stack assigned, usable to remove the modifier early.
    pub modifier_id: ModifierId,
    /// Additive bonus or multiplicative factor.
    pub kind: ModifierKind,
    /// Flat amount or scalar factor, per kind.
    pub magnitude: f64,
    /// Lifetime, `None` for permanent.
    pub duration: Option<Duration>,
    /// Opaque label of whatever created the modifier.
    pub source: Option<Arc<str>>,
}

/// A modifier was removed from a stat's stack by explicit request.
///
/// Lazy expiration does not fire this event: expired modifiers leave
/// silently on the next read.
#[derive(Debug, Clone, PartialEq)]
pub struct ModifierRemoved {
    /// Which stat lost the modifier.
    pub name: StatName,
    /// The entity the stat is attached to, if any.
    pub owner: Option<EntityId>,
    /// Handle of the removed modifier.
    pub modifier_id: ModifierId,
    /// Kind of the removed modifier.
    pub kind: ModifierKind,
    /// Magnitude of the removed modifier.
    pub magnitude: f64,
    /// Source label of the removed modifier.
    pub source: Option<Arc<str>>,
}

/// A stat's modifier stack was cleared.
#[derive(Debug, Clone, PartialEq)]
pub struct ModifiersCleared {
    /// Which stat was reset.
    pub name: StatName,
    /// The entity the stat is attached to, if any.
    pub owner: Option<EntityId>,
    /// How many modifiers the clear removed.
    pub removed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stat_changed_delta() {
        let event = StatChanged {
            name: StatName::new("health"),
            owner: None,
            old_value: 100.0,
            new_value: 75.0,
        };
        assert_eq!(event.delta(), -25.0);
    }

    #[test]
    fn test_payloads_compare_by_value() {
        let a = ModifiersCleared {
            name: StatName::new("strength"),
            owner: Some(EntityId::new(3)),
            removed: 2,
        };
        let b = a.clone();
        assert_eq!(a, b);
    }
}
