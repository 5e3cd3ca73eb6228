//! Validation rules.
//!
//! Named predicates over candidate values, registered per stat name and
//! checked before a commit is allowed to stand. Rules for one name are
//! conjunctive and short-circuit on the first failure; a name with no
//! rules accepts everything (open by default). Rejection is routine, not
//! an error: the mutation becomes a no-op and the rejecting rule is
//! logged at debug level.

use crate::ident::StatName;
use std::collections::HashMap;
use tracing::debug;

/// One named predicate for a stat name.
struct Rule {
    name: String,
    predicate: Box<dyn Fn(f64) -> bool + Send + Sync>,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("predicate", &"<fn>")
            .finish()
    }
}

/// Registry of validation rules keyed by stat name.
///
/// A candidate value passes iff every rule registered for the stat's
/// name accepts it. Names with no rules are unconstrained.
///
/// # Examples
///
/// ```rust
/// use statforge::ValidationRegistry;
///
/// let mut rules = ValidationRegistry::new();
/// rules.add_rule("health", "non_negative", |v| v >= 0.0);
/// rules.add_rule("health", "below_cap", |v| v <= 1000.0);
///
/// assert!(rules.validate("health", 500.0));
/// assert!(!rules.validate("health", -1.0));
/// assert!(!rules.validate("health", 2000.0));
///
/// // Open by default: unknown names accept anything
/// assert!(rules.validate("mana", -9999.0));
/// ```
#[derive(Debug, Default)]
pub struct ValidationRegistry {
    rules: HashMap<StatName, Vec<Rule>>,
}

impl ValidationRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one more rule for a stat name.
    ///
    /// Multiple rules for the same name are conjunctive: ALL must pass.
    /// The rule name is a diagnostic label carried into the debug log
    /// when the rule rejects a candidate.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use statforge::ValidationRegistry;
    ///
    /// let mut rules = ValidationRegistry::new();
    /// rules.add_rule("level", "whole_number", |v| v.fract() == 0.0);
    /// assert_eq!(rules.rule_count("level"), 1);
    /// ```
    pub fn add_rule<F>(
        &mut self,
        stat: impl Into<StatName>,
        rule: impl Into<String>,
        predicate: F,
    ) where
        F: Fn(f64) -> bool + Send + Sync + 'static,
    {
        self.rules.entry(stat.into()).or_default().push(Rule {
            name: rule.into(),
            predicate: Box::new(predicate),
        });
    }

    /// Check a candidate value against every rule for a stat name.
    ///
    /// Returns `true` iff no rule rejects, or no rules are registered.
    /// Short-circuits on the first failure; no ordering guarantee beyond
    /// "all must pass".
    pub fn validate(&self, stat: &str, candidate: f64) -> bool {
        let Some(rules) = self.rules.get(stat) else {
            return true;
        };

        for rule in rules {
            if !(rule.predicate)(candidate) {
                debug!(
                    target: "statforge::validate",
                    stat,
                    rule = %rule.name,
                    candidate,
                    "validation rejected candidate"
                );
                return false;
            }
        }
        true
    }

    /// Number of rules registered for a stat name.
    pub fn rule_count(&self, stat: &str) -> usize {
        self.rules.get(stat).map_or(0, Vec::len)
    }

    /// Drop every rule for a stat name. Returns how many were removed.
    pub fn clear_rules(&mut self, stat: &str) -> usize {
        self.rules.remove(stat).map_or(0, |rules| rules.len())
    }

    /// Whether no rules are registered at all.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_open_by_default() {
        let rules = ValidationRegistry::new();
        assert!(rules.validate("health", f64::MAX));
        assert!(rules.validate("health", f64::MIN));
        assert!(rules.is_empty());
    }

    #[test]
    fn test_rules_are_conjunctive() {
        let mut rules = ValidationRegistry::new();
        rules.add_rule("health", "non_negative", |v| v >= 0.0);
        rules.add_rule("health", "below_cap", |v| v <= 100.0);

        assert!(rules.validate("health", 50.0));
        assert!(!rules.validate("health", -10.0)); // first rule rejects
        assert!(!rules.validate("health", 150.0)); // second rule rejects
    }

    #[test]
    fn test_short_circuits_on_first_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let mut rules = ValidationRegistry::new();
        rules.add_rule("health", "always_fails", |_| false);
        rules.add_rule("health", "counts_calls", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        });

        assert!(!rules.validate("health", 1.0));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_names_are_independent() {
        let mut rules = ValidationRegistry::new();
        rules.add_rule("health", "non_negative", |v| v >= 0.0);

        assert!(!rules.validate("health", -1.0));
        assert!(rules.validate("mana", -1.0));
    }

    #[test]
    fn test_clear_rules() {
        let mut rules = ValidationRegistry::new();
        rules.add_rule("health", "a", |_| false);
        rules.add_rule("health", "b", |_| false);

        assert_eq!(rules.rule_count("health"), 2);
        assert_eq!(rules.clear_rules("health"), 2);
        assert_eq!(rules.rule_count("health"), 0);
        assert!(rules.validate("health", -999.0));
        assert_eq!(rules.clear_rules("health"), 0);
    }
}
