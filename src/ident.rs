//! Identifier types.
//!
//! Provides `StatName`, the interned string key for stats, plus the
//! lightweight numeric handles used across the engine: `EntityId` for
//! owner attribution and `ModifierId` for modifiers living in a stack.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::sync::Arc;

/// Interned string name for a stat.
///
/// Uses `Arc<str>` so cloning is cheap and copies of the same name share
/// one allocation. Names are unique within an owning entity's stat set,
/// and the validation registry keys its rules by them.
///
/// # Examples
///
/// ```rust
/// use statforge::StatName;
///
/// let health = StatName::new("health");
/// let strength = StatName::new("strength");
///
/// // Can be created from string slices or owned strings
/// let health2: StatName = "health".into();
/// let health3: StatName = String::from("health").into();
///
/// assert_eq!(health, health2);
/// assert_eq!(health, health3);
/// assert_ne!(health, strength);
/// ```
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct StatName(Arc<str>);

impl Serialize for StatName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.as_ref().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for StatName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(StatName::from(s))
    }
}

impl StatName {
    /// Create a new `StatName` from a string slice.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use statforge::StatName;
    ///
    /// let name = StatName::new("health");
    /// assert_eq!(name.as_str(), "health");
    /// ```
    pub fn new(s: &str) -> Self {
        Self(Arc::from(s))
    }

    /// Get the string representation of this `StatName`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use statforge::StatName;
    ///
    /// let name = StatName::new("strength");
    /// assert_eq!(name.as_str(), "strength");
    /// ```
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StatName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for StatName {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

// Lets a HashMap keyed by StatName be queried with a plain &str.
impl Borrow<str> for StatName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StatName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle to the entity a stat is attached to.
///
/// Purely an attribution token: the engine never resolves it back to the
/// entity, so holding one never extends an entity's lifetime. Subscribers
/// use it to tell whose stat changed.
///
/// # Examples
///
/// ```rust
/// use statforge::EntityId;
///
/// let player = EntityId::new(1);
/// let goblin = EntityId::new(42);
/// assert_ne!(player, goblin);
/// assert_eq!(goblin.raw(), 42);
/// ```
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Create an entity handle from a raw id.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw id.
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

/// Handle to a modifier inside a stack.
///
/// Assigned by the stack when the modifier is added and unique within
/// that stack for its lifetime; never reused after removal. The handle is
/// how a caller removes a specific buff early.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ModifierId(u64);

impl ModifierId {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw id.
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ModifierId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "modifier#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_stat_name_creation() {
        let a = StatName::new("health");
        let b = StatName::new("health");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "health");
    }

    #[test]
    fn test_stat_name_from_string() {
        let name: StatName = "mana".into();
        assert_eq!(name.as_str(), "mana");
    }

    #[test]
    fn test_stat_name_map_lookup_by_str() {
        let mut map: HashMap<StatName, i32> = HashMap::new();
        map.insert(StatName::new("health"), 1);
        // Borrow<str> lets us query without building a StatName
        assert_eq!(map.get("health"), Some(&1));
        assert_eq!(map.get("mana"), None);
    }

    #[test]
    fn test_stat_name_serde_roundtrip() {
        let name = StatName::new("health");
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"health\"");
        let back: StatName = serde_json::from_str(&json).unwrap();
        assert_eq!(back, name);
    }

    #[test]
    fn test_entity_id_display() {
        let id = EntityId::new(7);
        assert_eq!(id.to_string(), "entity#7");
        assert_eq!(id.raw(), 7);
    }

    #[test]
    fn test_modifier_id_ordering() {
        let first = ModifierId::new(1);
        let second = ModifierId::new(2);
        assert!(first < second);
    }
}
