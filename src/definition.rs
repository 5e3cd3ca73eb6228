//! Stat definition metadata.
//!
//! A `StatDefinition` is externally-authored metadata a stat may carry:
//! a category, a formula string for derived stats, free-form tags. The
//! engine stores and surfaces it read-only; evaluating the formula (and
//! deciding which stats exist at all) is the definition provider's job.

use serde::{Deserialize, Serialize};

/// Read-only metadata describing a stat.
///
/// All fields are optional so definitions can be authored sparsely in
/// data files. The engine never interprets any of them.
///
/// # Examples
///
/// ```rust
/// use statforge::StatDefinition;
///
/// let def: StatDefinition = serde_json::from_str(
///     r#"{ "category": "resource", "formula": "vitality * 10", "tags": ["ui"] }"#,
/// ).unwrap();
///
/// assert_eq!(def.category.as_deref(), Some("resource"));
/// assert_eq!(def.formula.as_deref(), Some("vitality * 10"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatDefinition {
    /// Grouping label (e.g. "resource", "attribute").
    #[serde(default)]
    pub category: Option<String>,

    /// Formula text for derived stats. Never parsed or evaluated here;
    /// carried for the external evaluator and for diagnostics.
    #[serde(default)]
    pub formula: Option<String>,

    /// Free-form labels for the host's own filtering.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl StatDefinition {
    /// Create an empty definition.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the category.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use statforge::StatDefinition;
    ///
    /// let def = StatDefinition::new().with_category("attribute");
    /// assert_eq!(def.category.as_deref(), Some("attribute"));
    /// ```
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the formula text.
    pub fn with_formula(mut self, formula: impl Into<String>) -> Self {
        self.formula = Some(formula.into());
        self
    }

    /// Append a tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty() {
        let def = StatDefinition::new();
        assert_eq!(def.category, None);
        assert_eq!(def.formula, None);
        assert!(def.tags.is_empty());
    }

    #[test]
    fn test_builder() {
        let def = StatDefinition::new()
            .with_category("resource")
            .with_formula("vitality * 10")
            .with_tag("ui")
            .with_tag("combat");
        assert_eq!(def.category.as_deref(), Some("resource"));
        assert_eq!(def.tags, vec!["ui", "combat"]);
    }

    #[test]
    fn test_sparse_json_fields_default() {
        let def: StatDefinition = serde_json::from_str(r#"{ "category": "attribute" }"#).unwrap();
        assert_eq!(def.category.as_deref(), Some("attribute"));
        assert_eq!(def.formula, None);
        assert!(def.tags.is_empty());
    }

    #[test]
    fn test_serde_roundtrip() {
        let def = StatDefinition::new()
            .with_category("resource")
            .with_formula("strength * 2 + 10");
        let json = serde_json::to_string(&def).unwrap();
        let back: StatDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(back, def);
    }
}
