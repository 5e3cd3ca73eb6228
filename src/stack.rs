//! Modifier stacks.
//!
//! An ordered collection of the active modifiers for one stat; insertion
//! order is application order. The stack owns expiration sweeping and the
//! two-phase aggregate, and bumps a generation counter on every content
//! change so the owning stat can tell when its cached value went stale.

use crate::ident::ModifierId;
use crate::modifier::{Modifier, ModifierKind};
use std::time::Instant;

/// A modifier plus the handle the stack assigned to it.
#[derive(Debug, Clone)]
struct Entry {
    id: ModifierId,
    modifier: Modifier,
}

/// Ordered sequence of modifiers for one stat.
///
/// Every mutation (add, remove, clear, a sweep that removed something)
/// bumps the [`generation`](ModifierStack::generation) counter. A cached
/// aggregate stamped with an older generation is stale and must be
/// recomputed.
///
/// Aggregation is a fixed two-phase policy: all additive magnitudes are
/// summed into the base first, then all multiplicative magnitudes apply
/// as sequential multiplications in insertion order. The phase order is
/// never configurable, so same-kind modifiers commute regardless of the
/// order they were added in.
///
/// # Examples
///
/// ```rust
/// use statforge::{Modifier, ModifierStack};
///
/// let mut stack = ModifierStack::new();
/// stack.add(Modifier::multiplicative(1.5));
/// stack.add(Modifier::additive(5.0));
///
/// // Bonuses sum into the base first, factors multiply after:
/// // (10 + 5) * 1.5 = 22.5, even though the factor was added first
/// assert_eq!(stack.aggregate(10.0), 22.5);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ModifierStack {
    entries: Vec<Entry>,
    next_id: u64,
    generation: u64,
}

/// Sum every additive magnitude into the base, then apply every
/// multiplicative magnitude as sequential multiplications in order.
///
/// Total over any modifier set; an empty iterator yields `base`. This is
/// the one aggregation rule the whole engine uses: stacks call it over
/// their contents, and it works just as well over borrowed modifiers a
/// host keeps elsewhere.
///
/// # Examples
///
/// ```rust
/// use statforge::{aggregate_over, Modifier};
///
/// let modifiers = vec![
///     Modifier::multiplicative(1.5),
///     Modifier::additive(5.0),
/// ];
///
/// // (10 + 5) * 1.5 = 22.5
/// assert_eq!(aggregate_over(10.0, modifiers.iter()), 22.5);
/// ```
pub fn aggregate_over<'a, I>(base: f64, modifiers: I) -> f64
where
    I: Iterator<Item = &'a Modifier> + Clone,
{
    let flat: f64 = modifiers
        .clone()
        .filter(|m| m.kind() == ModifierKind::Additive)
        .map(Modifier::magnitude)
        .sum();

    let mut value = base + flat;
    for factor in modifiers.filter(|m| m.kind() == ModifierKind::Multiplicative) {
        value *= factor.magnitude();
    }
    value
}

impl ModifierStack {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a modifier and return the handle it was assigned.
    ///
    /// O(1) amortized; never re-sorts.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use statforge::{Modifier, ModifierStack};
    ///
    /// let mut stack = ModifierStack::new();
    /// let id = stack.add(Modifier::additive(10.0));
    /// assert!(stack.contains(id));
    /// assert_eq!(stack.len(), 1);
    /// ```
    pub fn add(&mut self, modifier: Modifier) -> ModifierId {
        let id = ModifierId::new(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry { id, modifier });
        self.generation += 1;
        id
    }

    /// Remove a specific modifier by handle, returning it if present.
    ///
    /// Relative order of the remaining modifiers is preserved.
    pub fn remove(&mut self, id: ModifierId) -> Option<Modifier> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        let entry = self.entries.remove(index);
        self.generation += 1;
        Some(entry.modifier)
    }

    /// Remove every modifier whose expiration instant has passed.
    ///
    /// Permanent modifiers are skipped. Returns the number removed; the
    /// generation moves only when something was actually removed. Called
    /// automatically on every aggregate read taken through a stat.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use statforge::{Modifier, ModifierStack};
    /// use std::time::Duration;
    ///
    /// let brief = Modifier::additive(5.0).expires_after(Duration::from_secs(5));
    /// let created = brief.created_at();
    ///
    /// let mut stack = ModifierStack::new();
    /// stack.add(Modifier::additive(10.0));
    /// stack.add(brief);
    ///
    /// assert_eq!(stack.remove_expired(created), 0);
    /// assert_eq!(stack.remove_expired(created + Duration::from_secs(6)), 1);
    /// assert_eq!(stack.len(), 1);
    /// ```
    pub fn remove_expired(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| !e.modifier.is_expired(now));
        let removed = before - self.entries.len();
        if removed > 0 {
            self.generation += 1;
        }
        removed
    }

    /// Remove all modifiers unconditionally. Returns the number removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        if removed > 0 {
            self.entries.clear();
            self.generation += 1;
        }
        removed
    }

    /// Compute the effective value for `base` over the current contents.
    ///
    /// Phase one sums every additive magnitude into the base; phase two
    /// applies every multiplicative magnitude as sequential
    /// multiplications in insertion order. No failure conditions: the
    /// empty stack yields `base` unchanged.
    ///
    /// Expired modifiers still present are included; sweeping is the
    /// caller's step (reads through a stat always sweep first).
    pub fn aggregate(&self, base: f64) -> f64 {
        aggregate_over(base, self.modifiers())
    }

    /// Aggregate as if `extra` had been appended, without mutating.
    ///
    /// Used to evaluate a candidate value before committing an add.
    pub(crate) fn aggregate_with(&self, base: f64, extra: &Modifier) -> f64 {
        aggregate_over(base, self.modifiers().chain(std::iter::once(extra)))
    }

    /// Aggregate as if the modifier under `skip` were gone, without
    /// mutating. Used to evaluate a candidate value before a removal.
    pub(crate) fn aggregate_without(&self, base: f64, skip: ModifierId) -> f64 {
        aggregate_over(
            base,
            self.entries
                .iter()
                .filter(move |e| e.id != skip)
                .map(|e| &e.modifier),
        )
    }

    /// Get a modifier by handle.
    pub fn modifier(&self, id: ModifierId) -> Option<&Modifier> {
        self.entries.iter().find(|e| e.id == id).map(|e| &e.modifier)
    }

    /// Whether a modifier with this handle is present.
    pub fn contains(&self, id: ModifierId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Iterate over `(handle, modifier)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (ModifierId, &Modifier)> {
        self.entries.iter().map(|e| (e.id, &e.modifier))
    }

    fn modifiers(&self) -> impl Iterator<Item = &Modifier> + Clone {
        self.entries.iter().map(|e| &e.modifier)
    }

    /// Number of modifiers currently in the stack.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the stack is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The stack's mutation counter.
    ///
    /// Monotonically increasing; moves whenever the contents change. A
    /// cached aggregate stamped with an older generation is stale.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
