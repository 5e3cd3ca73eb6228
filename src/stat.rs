//! Bounded stats.
//!
//! A `Stat` is one numeric attribute: a base value, inclusive bounds, an
//! exclusively-owned modifier stack, and a cached aggregate stamped with
//! the stack's generation. Reads sweep expired modifiers and recompute
//! only when the stamp went stale. Mutations run the commit pipeline:
//! compute the candidate, validate it, then commit and publish.

use crate::bus::EventBus;
use crate::definition::StatDefinition;
use crate::error::StatError;
use crate::event::{ModifierAdded, ModifierRemoved, ModifiersCleared, StatChanged};
use crate::ident::{EntityId, ModifierId, StatName};
use crate::modifier::Modifier;
use crate::stack::ModifierStack;
use crate::validate::ValidationRegistry;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cache diagnostics for one stat.
///
/// Reads either reuse the cached aggregate (a hit) or recompute it
/// because the modifier stack moved underneath it. Hosts that want
/// visibility into recompute pressure can sample this; nothing in the
/// engine consumes it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Reads served straight from the cached aggregate.
    pub hits: u64,
    /// Reads that had to recompute the aggregate.
    pub recomputes: u64,
}

/// A bounded numeric attribute with a modifiable aggregate value.
///
/// The effective value is `clamp(aggregate(base, modifiers), min, max)`,
/// cached between reads and recomputed lazily when the modifier stack
/// changes. Every mutating operation runs the same pipeline: compute the
/// candidate aggregate, check it against the validation rules registered
/// for this stat's name, and only then commit, publishing the
/// operation's event plus a [`StatChanged`] when the value moved.
/// A rejected mutation changes nothing and publishes nothing.
///
/// The stat holds its owner only as an [`EntityId`] attribution handle
/// and its definition as opaque read-only metadata; neither is ever
/// dereferenced or interpreted by the engine.
///
/// # Examples
///
/// ```rust
/// use statforge::{EventBus, Stat, ValidationRegistry};
///
/// let rules = ValidationRegistry::new();
/// let bus = EventBus::new();
///
/// let mut health = Stat::bounded("health", 100.0, 0.0, 100.0).unwrap();
/// health.add_bonus(20.0, None, &rules, &bus);
///
/// // The +20 pushes the raw aggregate to 120; the bound caps the value
/// assert_eq!(health.value(), 100.0);
/// ```
#[derive(Debug, Clone)]
pub struct Stat {
    name: StatName,
    owner: Option<EntityId>,
    definition: Option<Arc<StatDefinition>>,
    base: f64,
    min: f64,
    max: f64,
    stack: ModifierStack,
    cached: f64,
    stamped: u64,
    stats: CacheStats,
}

impl Stat {
    /// Create an unbounded stat.
    ///
    /// Bounds default to the full `f64` range, so clamping is a no-op
    /// until [`bounded`](Stat::bounded) construction or
    /// [`set_bounds`](Stat::set_bounds) tightens them.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use statforge::Stat;
    ///
    /// let mut damage = Stat::new("damage", 10.0);
    /// assert_eq!(damage.value(), 10.0);
    /// ```
    pub fn new(name: impl Into<StatName>, base: f64) -> Self {
        Self::build(name.into(), base, f64::NEG_INFINITY, f64::INFINITY)
    }

    /// Create a stat with inclusive bounds.
    ///
    /// The base value is clamped into the bounds up front, the same way
    /// every later write is. `min > max` is rejected immediately and
    /// never coerced.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use statforge::{Stat, StatError};
    ///
    /// let mut health = Stat::bounded("health", 150.0, 0.0, 100.0).unwrap();
    /// assert_eq!(health.value(), 100.0); // base clamped at construction
    ///
    /// let err = Stat::bounded("health", 50.0, 100.0, 0.0).unwrap_err();
    /// assert!(matches!(err, StatError::InvalidBounds { .. }));
    /// ```
    pub fn bounded(
        name: impl Into<StatName>,
        base: f64,
        min: f64,
        max: f64,
    ) -> Result<Self, StatError> {
        let name = name.into();
        if min > max {
            return Err(StatError::InvalidBounds { name, min, max });
        }
        Ok(Self::build(name, base, min, max))
    }

    fn build(name: StatName, base: f64, min: f64, max: f64) -> Self {
        let base = base.max(min).min(max);
        Self {
            name,
            owner: None,
            definition: None,
            base,
            min,
            max,
            stack: ModifierStack::new(),
            cached: base,
            stamped: 0,
            stats: CacheStats::default(),
        }
    }

    /// Attach the owning entity's handle, for event attribution.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use statforge::{EntityId, Stat};
    ///
    /// let stat = Stat::new("strength", 8.0).with_owner(EntityId::new(7));
    /// assert_eq!(stat.owner(), Some(EntityId::new(7)));
    /// ```
    pub fn with_owner(mut self, owner: EntityId) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Attach opaque definition metadata.
    pub fn with_definition(mut self, definition: Arc<StatDefinition>) -> Self {
        self.definition = Some(definition);
        self
    }

    /// The stat's name.
    pub fn name(&self) -> &StatName {
        &self.name
    }

    /// The owning entity's handle, if one was attached.
    pub fn owner(&self) -> Option<EntityId> {
        self.owner
    }

    /// The attached definition metadata, if any.
    pub fn definition(&self) -> Option<&StatDefinition> {
        self.definition.as_deref()
    }

    /// The value before modifiers.
    pub fn base_value(&self) -> f64 {
        self.base
    }

    /// Inclusive lower bound.
    pub fn min_value(&self) -> f64 {
        self.min
    }

    /// Inclusive upper bound.
    pub fn max_value(&self) -> f64 {
        self.max
    }

    /// Number of modifiers currently in the stack.
    ///
    /// Counts whatever is present right now, including entries an
    /// upcoming read would sweep out as expired.
    pub fn modifier_count(&self) -> usize {
        self.stack.len()
    }

    /// Iterate over `(handle, modifier)` pairs in application order.
    pub fn modifiers(&self) -> impl Iterator<Item = (ModifierId, &Modifier)> {
        self.stack.iter()
    }

    /// Look up a modifier by handle.
    pub fn modifier(&self, id: ModifierId) -> Option<&Modifier> {
        self.stack.modifier(id)
    }

    /// Cache hit/recompute counters for the read path.
    pub fn cache_stats(&self) -> CacheStats {
        self.stats
    }

    fn clamped(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }

    /// The effective value, read at `Instant::now()`.
    ///
    /// See [`value_at`](Stat::value_at).
    pub fn value(&mut self) -> f64 {
        self.value_at(Instant::now())
    }

    /// The effective value as of `now`.
    ///
    /// Sweeps expired modifiers first, then recomputes the aggregate
    /// only if the stack's generation moved since the cached value was
    /// stamped. The result always lies inside `[min, max]`. Reads never
    /// publish events: an expired buff leaves silently.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use statforge::{EventBus, Modifier, Stat, ValidationRegistry};
    /// use std::time::Duration;
    ///
    /// let rules = ValidationRegistry::new();
    /// let bus = EventBus::new();
    ///
    /// let haste = Modifier::additive(30.0).expires_after(Duration::from_secs(5));
    /// let cast = haste.created_at();
    ///
    /// let mut speed = Stat::new("speed", 100.0);
    /// speed.add_modifier(haste, &rules, &bus);
    ///
    /// assert_eq!(speed.value_at(cast), 130.0);
    /// assert_eq!(speed.value_at(cast + Duration::from_secs(6)), 100.0);
    /// ```
    pub fn value_at(&mut self, now: Instant) -> f64 {
        self.stack.remove_expired(now);
        if self.stamped == self.stack.generation() {
            self.stats.hits += 1;
        } else {
            self.stats.recomputes += 1;
            self.cached = self.clamped(self.stack.aggregate(self.base));
            self.stamped = self.stack.generation();
        }
        self.cached
    }

    /// The effective value mapped into `[0, 1]` over the bounds.
    ///
    /// Returns `(value - min) / (max - min)`, or `0.0` when the range is
    /// degenerate (`max == min`, or bounds not finite).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use statforge::Stat;
    ///
    /// let mut health = Stat::bounded("health", 75.0, 0.0, 100.0).unwrap();
    /// assert_eq!(health.normalized(), 0.75);
    ///
    /// let mut flat = Stat::bounded("flat", 5.0, 5.0, 5.0).unwrap();
    /// assert_eq!(flat.normalized(), 0.0);
    /// ```
    pub fn normalized(&mut self) -> f64 {
        self.normalized_at(Instant::now())
    }

    /// [`normalized`](Stat::normalized) as of an explicit instant.
    pub fn normalized_at(&mut self, now: Instant) -> f64 {
        let range = self.max - self.min;
        if range == 0.0 || !range.is_finite() {
            return 0.0;
        }
        (self.value_at(now) - self.min) / range
    }

    /// Fill ratio for presentation helpers; identical to
    /// [`normalized`](Stat::normalized).
    pub fn percentage(&mut self) -> f64 {
        self.normalized()
    }

    /// Set the value directly, at `Instant::now()`.
    ///
    /// See [`set_value_at`](Stat::set_value_at).
    pub fn set_value(&mut self, target: f64, rules: &ValidationRegistry, bus: &EventBus) -> bool {
        self.set_value_at(target, Instant::now(), rules, bus)
    }

    /// Set the base value to the clamped target.
    ///
    /// The target is clamped into the bounds first, then the resulting
    /// aggregate runs through validation. Returns whether the mutation
    /// took effect: a validation rejection is a routine `false`, leaves
    /// the previous value in place, and publishes nothing. An accepted
    /// write that moved the value publishes [`StatChanged`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use statforge::{EventBus, Stat, ValidationRegistry};
    ///
    /// let mut rules = ValidationRegistry::new();
    /// rules.add_rule("health", "non_negative", |v| v >= 0.0);
    /// let bus = EventBus::new();
    ///
    /// let mut health = Stat::bounded("health", 100.0, -50.0, 100.0).unwrap();
    /// assert!(health.set_value(80.0, &rules, &bus));
    /// assert!(!health.set_value(-10.0, &rules, &bus)); // rejected
    /// assert_eq!(health.value(), 80.0);
    /// ```
    pub fn set_value_at(
        &mut self,
        target: f64,
        now: Instant,
        rules: &ValidationRegistry,
        bus: &EventBus,
    ) -> bool {
        let old = self.value_at(now);
        let new_base = self.clamped(target);
        let candidate = self.clamped(self.stack.aggregate(new_base));
        if !rules.validate(self.name.as_str(), candidate) {
            return false;
        }
        self.base = new_base;
        self.commit(old, candidate, bus);
        true
    }

    /// Add an additive bonus, optionally expiring.
    ///
    /// `duration: None` is permanent. Returns the new modifier's handle,
    /// or `None` when validation rejected the resulting value. The
    /// handle removes the bonus early via
    /// [`remove_modifier`](Stat::remove_modifier).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use statforge::{EventBus, Stat, ValidationRegistry};
    /// use std::time::Duration;
    ///
    /// let rules = ValidationRegistry::new();
    /// let bus = EventBus::new();
    ///
    /// let mut strength = Stat::new("strength", 10.0);
    /// let buff = strength
    ///     .add_bonus(5.0, Some(Duration::from_secs(30)), &rules, &bus)
    ///     .unwrap();
    /// assert_eq!(strength.value(), 15.0);
    ///
    /// strength.remove_modifier(buff, &rules, &bus);
    /// assert_eq!(strength.value(), 10.0);
    /// ```
    pub fn add_bonus(
        &mut self,
        magnitude: f64,
        duration: Option<Duration>,
        rules: &ValidationRegistry,
        bus: &EventBus,
    ) -> Option<ModifierId> {
        let mut modifier = Modifier::additive(magnitude);
        if let Some(duration) = duration {
            modifier = modifier.expires_after(duration);
        }
        self.add_modifier(modifier, rules, bus)
    }

    /// Add a multiplicative factor, optionally expiring.
    ///
    /// `duration: None` is permanent. Returns the new modifier's handle,
    /// or `None` when validation rejected the resulting value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use statforge::{EventBus, Stat, ValidationRegistry};
    ///
    /// let rules = ValidationRegistry::new();
    /// let bus = EventBus::new();
    ///
    /// let mut damage = Stat::new("damage", 10.0);
    /// damage.add_multiplier(1.5, None, &rules, &bus);
    /// damage.add_bonus(5.0, None, &rules, &bus);
    ///
    /// // Bonuses sum first, factors apply after: (10 + 5) * 1.5
    /// assert_eq!(damage.value(), 22.5);
    /// ```
    pub fn add_multiplier(
        &mut self,
        factor: f64,
        duration: Option<Duration>,
        rules: &ValidationRegistry,
        bus: &EventBus,
    ) -> Option<ModifierId> {
        let mut modifier = Modifier::multiplicative(factor);
        if let Some(duration) = duration {
            modifier = modifier.expires_after(duration);
        }
        self.add_modifier(modifier, rules, bus)
    }

    /// Add a prebuilt modifier, at `Instant::now()`.
    ///
    /// See [`add_modifier_at`](Stat::add_modifier_at).
    pub fn add_modifier(
        &mut self,
        modifier: Modifier,
        rules: &ValidationRegistry,
        bus: &EventBus,
    ) -> Option<ModifierId> {
        self.add_modifier_at(modifier, Instant::now(), rules, bus)
    }

    /// Add a prebuilt modifier as of `now`.
    ///
    /// The candidate aggregate is evaluated with the modifier included
    /// but the stack is only touched once validation accepts, so a
    /// rejected add leaves no partial state behind. An accepted add
    /// publishes [`ModifierAdded`], then [`StatChanged`] if the value
    /// moved (a bonus fully absorbed by the upper bound adds the
    /// modifier without a value change).
    pub fn add_modifier_at(
        &mut self,
        modifier: Modifier,
        now: Instant,
        rules: &ValidationRegistry,
        bus: &EventBus,
    ) -> Option<ModifierId> {
        let old = self.value_at(now);
        let candidate = self.clamped(self.stack.aggregate_with(self.base, &modifier));
        if !rules.validate(self.name.as_str(), candidate) {
            return None;
        }

        let kind = modifier.kind();
        let magnitude = modifier.magnitude();
        let duration = modifier.duration();
        let source = modifier.source_handle();
        let id = self.stack.add(modifier);

        bus.publish(&ModifierAdded {
            name: self.name.clone(),
            owner: self.owner,
            modifier_id: id,
            kind,
            magnitude,
            duration,
            source,
        });
        self.commit(old, candidate, bus);
        Some(id)
    }

    /// Remove a modifier by handle, at `Instant::now()`.
    ///
    /// See [`remove_modifier_at`](Stat::remove_modifier_at).
    pub fn remove_modifier(
        &mut self,
        id: ModifierId,
        rules: &ValidationRegistry,
        bus: &EventBus,
    ) -> bool {
        self.remove_modifier_at(id, Instant::now(), rules, bus)
    }

    /// Remove a modifier by handle as of `now`.
    ///
    /// Returns `false` when the handle is unknown (or already swept out
    /// by expiration) or when validation rejects the value the stat
    /// would fall back to. An accepted removal publishes
    /// [`ModifierRemoved`], then [`StatChanged`] if the value moved.
    pub fn remove_modifier_at(
        &mut self,
        id: ModifierId,
        now: Instant,
        rules: &ValidationRegistry,
        bus: &EventBus,
    ) -> bool {
        let old = self.value_at(now);
        if !self.stack.contains(id) {
            return false;
        }
        let candidate = self.clamped(self.stack.aggregate_without(self.base, id));
        if !rules.validate(self.name.as_str(), candidate) {
            return false;
        }
        let Some(removed) = self.stack.remove(id) else {
            return false;
        };

        bus.publish(&ModifierRemoved {
            name: self.name.clone(),
            owner: self.owner,
            modifier_id: id,
            kind: removed.kind(),
            magnitude: removed.magnitude(),
            source: removed.source_handle(),
        });
        self.commit(old, candidate, bus);
        true
    }

    /// Remove every modifier, at `Instant::now()`.
    ///
    /// See [`clear_modifiers_at`](Stat::clear_modifiers_at).
    pub fn clear_modifiers(&mut self, rules: &ValidationRegistry, bus: &EventBus) -> bool {
        self.clear_modifiers_at(Instant::now(), rules, bus)
    }

    /// Remove every modifier as of `now`, dropping the value back to the
    /// clamped base.
    ///
    /// Publishes [`ModifiersCleared`] with the removal count when
    /// anything was removed, then [`StatChanged`] if the value moved.
    /// Clearing an already-empty stack is an accepted no-op.
    pub fn clear_modifiers_at(
        &mut self,
        now: Instant,
        rules: &ValidationRegistry,
        bus: &EventBus,
    ) -> bool {
        let old = self.value_at(now);
        let candidate = self.clamped(self.base);
        if !rules.validate(self.name.as_str(), candidate) {
            return false;
        }

        let removed = self.stack.clear();
        if removed > 0 {
            bus.publish(&ModifiersCleared {
                name: self.name.clone(),
                owner: self.owner,
                removed,
            });
        }
        self.commit(old, candidate, bus);
        true
    }

    /// Replace the bounds, at `Instant::now()`.
    ///
    /// See [`set_bounds_at`](Stat::set_bounds_at).
    pub fn set_bounds(
        &mut self,
        min: f64,
        max: f64,
        rules: &ValidationRegistry,
        bus: &EventBus,
    ) -> Result<bool, StatError> {
        self.set_bounds_at(min, max, Instant::now(), rules, bus)
    }

    /// Replace the bounds as of `now` (level-ups, cap changes).
    ///
    /// `min > max` is an immediate [`StatError::InvalidBounds`];
    /// otherwise the change runs the normal pipeline against the value
    /// re-clamped under the new bounds: `Ok(false)` on validation
    /// rejection, `Ok(true)` on commit (with [`StatChanged`] if the
    /// value moved). The base is re-clamped into the new bounds too.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use statforge::{EventBus, Stat, ValidationRegistry};
    ///
    /// let rules = ValidationRegistry::new();
    /// let bus = EventBus::new();
    ///
    /// let mut health = Stat::bounded("health", 100.0, 0.0, 100.0).unwrap();
    /// health.set_bounds(0.0, 80.0, &rules, &bus).unwrap();
    /// assert_eq!(health.value(), 80.0);
    /// ```
    pub fn set_bounds_at(
        &mut self,
        min: f64,
        max: f64,
        now: Instant,
        rules: &ValidationRegistry,
        bus: &EventBus,
    ) -> Result<bool, StatError> {
        if min > max {
            return Err(StatError::InvalidBounds {
                name: self.name.clone(),
                min,
                max,
            });
        }

        let old = self.value_at(now);
        let new_base = self.base.max(min).min(max);
        let candidate = self.stack.aggregate(new_base).max(min).min(max);
        if !rules.validate(self.name.as_str(), candidate) {
            return Ok(false);
        }

        self.min = min;
        self.max = max;
        self.base = new_base;
        self.commit(old, candidate, bus);
        Ok(true)
    }

    /// Commit an accepted candidate: stamp the cache and publish
    /// [`StatChanged`] iff the effective value moved.
    fn commit(&mut self, old: f64, candidate: f64, bus: &EventBus) {
        self.cached = candidate;
        self.stamped = self.stack.generation();
        if candidate != old {
            bus.publish(&StatChanged {
                name: self.name.clone(),
                owner: self.owner,
                old_value: old,
                new_value: candidate,
            });
        }
    }
}
