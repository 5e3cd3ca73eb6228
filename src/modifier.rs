//! Modifier records.
//!
//! A modifier is one additive or multiplicative effect applied to a
//! stat's aggregate, optionally expiring a fixed time after creation.
//! Once constructed a modifier never changes; removal and expiration
//! only take it out of the owning stack.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// The two ways a modifier affects an aggregate.
///
/// Aggregation is a fixed two-phase policy: every additive magnitude is
/// summed into the base first, then every multiplicative magnitude is
/// applied to the running total. Modifiers of the same kind therefore
/// commute with each other, while the two kinds never commute.
///
/// # Examples
///
/// ```rust
/// use statforge::ModifierKind;
///
/// let bonus = ModifierKind::Additive;
/// let factor = ModifierKind::Multiplicative;
/// assert_ne!(bonus, factor);
/// ```
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModifierKind {
    /// Flat bonus summed into the base before any factor applies.
    Additive,
    /// Scalar factor applied to the running total (e.g. 1.5 for +50%).
    Multiplicative,
}

impl std::fmt::Display for ModifierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModifierKind::Additive => write!(f, "additive"),
            ModifierKind::Multiplicative => write!(f, "multiplicative"),
        }
    }
}

/// One effect applied to a stat's aggregate.
///
/// Carries its kind and magnitude, the instant it was created, an
/// optional lifetime, and an opaque source label for diagnostics and
/// event payloads. The engine never interprets the label.
///
/// Builder methods consume `self`, so a modifier is fully shaped before
/// it enters a stack and immutable afterwards.
///
/// # Examples
///
/// ```rust
/// use statforge::Modifier;
/// use std::time::Duration;
///
/// // Permanent +25 bonus
/// let ring = Modifier::additive(25.0).with_source("ring_of_vigor");
///
/// // +50% for ten seconds
/// let rage = Modifier::multiplicative(1.5)
///     .expires_after(Duration::from_secs(10))
///     .with_source("rage_potion");
///
/// assert!(ring.is_permanent());
/// assert!(!rage.is_permanent());
/// assert_eq!(rage.source(), Some("rage_potion"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Modifier {
    kind: ModifierKind,
    magnitude: f64,
    duration: Option<Duration>,
    created_at: Instant,
    source: Option<Arc<str>>,
}

impl Modifier {
    /// Create a permanent, unlabeled modifier of the given kind.
    ///
    /// The creation instant is captured here; an expiring modifier's
    /// lifetime counts from this moment.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use statforge::{Modifier, ModifierKind};
    ///
    /// let m = Modifier::new(ModifierKind::Additive, 10.0);
    /// assert_eq!(m.magnitude(), 10.0);
    /// assert!(m.is_permanent());
    /// ```
    pub fn new(kind: ModifierKind, magnitude: f64) -> Self {
        Self {
            kind,
            magnitude,
            duration: None,
            created_at: Instant::now(),
            source: None,
        }
    }

    /// Create a permanent additive bonus.
    ///
    /// Negative magnitudes are penalties.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use statforge::{Modifier, ModifierKind};
    ///
    /// let bonus = Modifier::additive(20.0);
    /// let penalty = Modifier::additive(-5.0);
    /// assert_eq!(bonus.kind(), ModifierKind::Additive);
    /// assert_eq!(penalty.magnitude(), -5.0);
    /// ```
    pub fn additive(magnitude: f64) -> Self {
        Self::new(ModifierKind::Additive, magnitude)
    }

    /// Create a permanent multiplicative factor.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use statforge::{Modifier, ModifierKind};
    ///
    /// // +50% bonus
    /// let boost = Modifier::multiplicative(1.5);
    ///
    /// // -20% penalty
    /// let slow = Modifier::multiplicative(0.8);
    ///
    /// assert_eq!(boost.kind(), ModifierKind::Multiplicative);
    /// assert_eq!(slow.magnitude(), 0.8);
    /// ```
    pub fn multiplicative(factor: f64) -> Self {
        Self::new(ModifierKind::Multiplicative, factor)
    }

    /// Give this modifier a finite lifetime counted from its creation.
    ///
    /// A zero duration means permanent, matching the convention that a
    /// non-positive lifetime never expires.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use statforge::Modifier;
    /// use std::time::Duration;
    ///
    /// let buff = Modifier::additive(20.0).expires_after(Duration::from_secs(5));
    /// let expiry = buff.created_at() + Duration::from_secs(5);
    ///
    /// assert!(!buff.is_expired(expiry));
    /// assert!(buff.is_expired(expiry + Duration::from_millis(1)));
    ///
    /// let forever = Modifier::additive(20.0).expires_after(Duration::ZERO);
    /// assert!(forever.is_permanent());
    /// ```
    pub fn expires_after(mut self, duration: Duration) -> Self {
        self.duration = if duration.is_zero() {
            None
        } else {
            Some(duration)
        };
        self
    }

    /// Attach an opaque source label (item, skill, aura id...).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use statforge::Modifier;
    ///
    /// let m = Modifier::multiplicative(1.2).with_source("war_banner");
    /// assert_eq!(m.source(), Some("war_banner"));
    /// ```
    pub fn with_source(mut self, source: impl Into<Arc<str>>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Get the modifier kind.
    pub fn kind(&self) -> ModifierKind {
        self.kind
    }

    /// Get the magnitude (flat amount or scalar factor, per kind).
    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    /// Get the lifetime, `None` for permanent modifiers.
    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    /// Get the instant this modifier was created.
    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// Get the source label, if any.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Cheap clone of the source label for event payloads.
    pub(crate) fn source_handle(&self) -> Option<Arc<str>> {
        self.source.clone()
    }

    /// The instant this modifier expires, `None` for permanent modifiers.
    pub fn expires_at(&self) -> Option<Instant> {
        self.duration.and_then(|d| self.created_at.checked_add(d))
    }

    /// Whether this modifier never expires.
    pub fn is_permanent(&self) -> bool {
        self.duration.is_none()
    }

    /// Whether this modifier's expiration instant has passed.
    ///
    /// The comparison is strict: a read taken exactly at the expiration
    /// instant still sees the modifier.
    pub fn is_expired(&self, now: Instant) -> bool {
        self.expires_at().map_or(false, |at| at < now)
    }

    /// Time left before expiration, `None` for permanent modifiers.
    ///
    /// Saturates at zero once the expiration instant has passed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use statforge::Modifier;
    /// use std::time::{Duration, Instant};
    ///
    /// let buff = Modifier::additive(5.0).expires_after(Duration::from_secs(30));
    /// let now = Instant::now();
    ///
    /// assert!(buff.remaining(now).unwrap() <= Duration::from_secs(30));
    /// assert_eq!(
    ///     buff.remaining(now + Duration::from_secs(60)),
    ///     Some(Duration::ZERO)
    /// );
    /// assert_eq!(Modifier::additive(5.0).remaining(now), None);
    /// ```
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.expires_at().map(|at| at.saturating_duration_since(now))
    }
}

impl std::fmt::Display for Modifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            ModifierKind::Additive => write!(f, "{:+.2}", self.magnitude)?,
            ModifierKind::Multiplicative => write!(f, "×{:.2}", self.magnitude)?,
        }
        if let Some(d) = self.duration {
            write!(f, " ({}s)", d.as_secs_f64())?;
        }
        if let Some(source) = &self.source {
            write!(f, " [{}]", source)?;
        }
        Ok(())
    }
}
