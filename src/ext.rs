//! Conveniences for optional stats.
//!
//! Hosts usually look stats up in a map and get an `Option<&mut Stat>`
//! back. [`MaybeStat`] lets sparse call sites read a sensible default
//! and fold writes to a missing stat into silent no-ops, instead of
//! sprinkling `if let` around every lookup.

use crate::bus::EventBus;
use crate::ident::ModifierId;
use crate::stat::Stat;
use crate::validate::ValidationRegistry;
use std::time::Duration;

/// Defaulting reads and ignorable writes for `Option<&mut Stat>`.
///
/// # Examples
///
/// ```rust
/// use statforge::{EventBus, MaybeStat, Stat, ValidationRegistry};
/// use std::collections::HashMap;
///
/// let rules = ValidationRegistry::new();
/// let bus = EventBus::new();
/// let mut stats: HashMap<String, Stat> = HashMap::new();
/// stats.insert(
///     "health".into(),
///     Stat::bounded("health", 80.0, 0.0, 100.0).unwrap(),
/// );
///
/// assert_eq!(stats.get_mut("health").value_or_default(), 80.0);
/// assert_eq!(stats.get_mut("stamina").value_or_default(), 0.0);
///
/// // Writes to a missing stat are silently ignored
/// assert!(!stats.get_mut("stamina").set_value_or_ignore(10.0, &rules, &bus));
/// ```
pub trait MaybeStat {
    /// The effective value, or `0.0` when the stat is absent.
    fn value_or_default(self) -> f64;

    /// The normalized value, or `0.0` when the stat is absent.
    fn normalized_or_default(self) -> f64;

    /// Set the value when the stat is present.
    ///
    /// Returns `false` for an absent stat, the same answer a validation
    /// rejection gives, so callers treat both as "the write did not
    /// land".
    fn set_value_or_ignore(self, target: f64, rules: &ValidationRegistry, bus: &EventBus)
        -> bool;

    /// Add an additive bonus when the stat is present.
    ///
    /// Returns `None` for an absent stat, indistinguishable from a
    /// validation rejection on a present one.
    fn add_bonus_or_ignore(
        self,
        magnitude: f64,
        duration: Option<Duration>,
        rules: &ValidationRegistry,
        bus: &EventBus,
    ) -> Option<ModifierId>;
}

impl MaybeStat for Option<&mut Stat> {
    fn value_or_default(self) -> f64 {
        self.map_or(0.0, Stat::value)
    }

    fn normalized_or_default(self) -> f64 {
        self.map_or(0.0, Stat::normalized)
    }

    fn set_value_or_ignore(
        self,
        target: f64,
        rules: &ValidationRegistry,
        bus: &EventBus,
    ) -> bool {
        match self {
            Some(stat) => stat.set_value(target, rules, bus),
            None => false,
        }
    }

    fn add_bonus_or_ignore(
        self,
        magnitude: f64,
        duration: Option<Duration>,
        rules: &ValidationRegistry,
        bus: &EventBus,
    ) -> Option<ModifierId> {
        self.and_then(|stat| stat.add_bonus(magnitude, duration, rules, bus))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn roster() -> HashMap<String, Stat> {
        let mut stats = HashMap::new();
        stats.insert(
            "health".to_string(),
            Stat::bounded("health", 80.0, 0.0, 100.0).unwrap(),
        );
        stats
    }

    #[test]
    fn test_value_or_default() {
        let mut stats = roster();
        assert_eq!(stats.get_mut("health").value_or_default(), 80.0);
        assert_eq!(stats.get_mut("stamina").value_or_default(), 0.0);
    }

    #[test]
    fn test_normalized_or_default() {
        let mut stats = roster();
        assert_eq!(stats.get_mut("health").normalized_or_default(), 0.8);
        assert_eq!(stats.get_mut("stamina").normalized_or_default(), 0.0);
    }

    #[test]
    fn test_set_value_or_ignore() {
        let rules = ValidationRegistry::new();
        let bus = EventBus::new();
        let mut stats = roster();

        assert!(stats
            .get_mut("health")
            .set_value_or_ignore(40.0, &rules, &bus));
        assert_eq!(stats.get_mut("health").value_or_default(), 40.0);

        assert!(!stats
            .get_mut("stamina")
            .set_value_or_ignore(40.0, &rules, &bus));
    }

    #[test]
    fn test_add_bonus_or_ignore() {
        let rules = ValidationRegistry::new();
        let bus = EventBus::new();
        let mut stats = roster();

        let id = stats
            .get_mut("health")
            .add_bonus_or_ignore(10.0, None, &rules, &bus);
        assert!(id.is_some());
        assert_eq!(stats.get_mut("health").value_or_default(), 90.0);

        let missing = stats
            .get_mut("stamina")
            .add_bonus_or_ignore(10.0, None, &rules, &bus);
        assert!(missing.is_none());
    }
}
