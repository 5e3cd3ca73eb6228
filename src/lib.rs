//! # statforge - Bounded Stat & Modifier Engine
//!
//! A stat aggregation engine for game entities that provides:
//! - **Bounded** values (every read lands inside `[min, max]`)
//! - **Fixed-order** aggregation (bonuses sum, then factors multiply)
//! - **Timed** modifiers (lazily expired on read, no scheduler)
//! - **Validated** mutation (rules veto a change before it lands)
//! - **Typed events** (subscribers observe every committed change)
//!
//! ## Core Concepts
//!
//! ### Value Pipeline
//!
//! Every read flows through the same pipeline:
//!
//! ```text
//! [base] → [+ bonuses] → [× factors] → [clamp] → value
//! ```
//!
//! 1. **Additive** modifiers sum into the base
//! 2. **Multiplicative** modifiers scale the subtotal, in insertion order
//! 3. **Bounds** clamp the aggregate on every read
//!
//! Mutations run candidate → validation → commit: the would-be value is
//! computed first, checked against the [`ValidationRegistry`], and only
//! then committed and announced on the [`EventBus`]. A rejected
//! mutation changes nothing and publishes nothing.
//!
//! ### Key Features
//!
//! - **Lazy expiration**: timed modifiers are swept on read, never by a timer
//! - **Cached aggregates**: reads recompute only when the stack changed
//! - **Per-type subscription**: handlers receive concrete event structs
//! - **Deferred batches**: queue actions and events, commit them as a unit
//!
//! ## Example
//!
//! ```rust
//! use statforge::*;
//! use std::time::Duration;
//!
//! let mut rules = ValidationRegistry::new();
//! rules.add_rule("health", "non_negative", |v| v >= 0.0);
//!
//! let mut bus = EventBus::new();
//! bus.observe::<StatChanged, _>(|e| {
//!     println!("{} moved {} -> {}", e.name, e.old_value, e.new_value);
//! });
//!
//! let mut health = Stat::bounded("health", 100.0, 0.0, 100.0).unwrap();
//!
//! // A temporary shield and a vulnerability debuff
//! health.add_bonus(20.0, Some(Duration::from_secs(30)), &rules, &bus);
//! health.add_multiplier(0.5, None, &rules, &bus);
//!
//! // (100 + 20) * 0.5 = 60
//! assert_eq!(health.value(), 60.0);
//! ```
//!
//! ## Modules
//!
//! - [`ident`] - Interned stat names and numeric handles
//! - [`modifier`] - Additive and multiplicative modifiers with optional lifetimes
//! - [`stack`] - Per-stat modifier storage and the aggregation rule
//! - [`stat`] - Bounded stats with cached, validated values
//! - [`definition`] - Opaque per-stat metadata
//! - [`validate`] - Named validation rules, consulted before every commit
//! - [`event`] - Change notification payloads
//! - [`bus`] - Typed publish/subscribe bus
//! - [`batch`] - Deferred actions and events
//! - [`ext`] - Conveniences for `Option<&mut Stat>`
//! - [`error`] - Error types

pub mod batch;
pub mod bus;
pub mod definition;
pub mod error;
pub mod event;
pub mod ext;
pub mod ident;
pub mod modifier;
pub mod stack;
pub mod stat;
pub mod validate;

// Re-export main types for convenience
pub use error::{BoxError, StatError};
pub use ident::{EntityId, ModifierId, StatName};
pub use stat::{CacheStats, Stat};

// Re-export modifier machinery
pub use definition::StatDefinition;
pub use modifier::{Modifier, ModifierKind};
pub use stack::{aggregate_over, ModifierStack};

// Re-export validation and event types
pub use bus::{EventBus, SubscriptionId};
pub use event::{ModifierAdded, ModifierRemoved, ModifiersCleared, StatChanged};
pub use validate::ValidationRegistry;

// Re-export batching helpers
pub use batch::{Batch, BatchReceipt, BatchScope};
pub use ext::MaybeStat;
