//! Error types for the stat engine.
//!
//! All failures the engine itself can report are represented by the
//! `StatError` enum. Validation rejections are deliberately NOT errors:
//! they are routine outcomes surfaced as `false`/`None` returns.

use crate::ident::StatName;
use thiserror::Error;

/// Boxed error type for failures produced by caller-supplied code
/// (batch actions, event handlers).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur in the stat engine.
///
/// # Examples
///
/// ```rust
/// use statforge::{Stat, StatError};
///
/// let err = Stat::bounded("health", 50.0, 100.0, 0.0).unwrap_err();
/// assert!(matches!(err, StatError::InvalidBounds { .. }));
/// println!("{}", err); // "Invalid bounds for stat health: min 100 > max 0"
/// ```
#[derive(Debug, Error)]
pub enum StatError {
    /// A stat was constructed with `min > max`.
    ///
    /// Surfaced immediately at construction time; bounds are never
    /// silently swapped or coerced.
    #[error("Invalid bounds for stat {name}: min {min} > max {max}")]
    InvalidBounds {
        name: StatName,
        min: f64,
        max: f64,
    },

    /// A queued batch action failed during commit.
    ///
    /// Actions before `index` had already been applied and are NOT
    /// rolled back; no later action ran and no queued event published.
    #[error(
        "Batch action `{label}` (index {index}) failed after {applied} action(s) applied: {source}"
    )]
    BatchActionFailed {
        /// Diagnostic label the action was queued under.
        label: String,
        /// Position of the failing action in the queue.
        index: usize,
        /// How many actions had already run (all of them applied).
        applied: usize,
        /// The underlying failure reported by the action.
        #[source]
        source: BoxError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_bounds_display() {
        let err = StatError::InvalidBounds {
            name: StatName::new("health"),
            min: 10.0,
            max: 5.0,
        };
        let display = err.to_string();
        assert!(display.contains("health"));
        assert!(display.contains("10"));
        assert!(display.contains("5"));
    }

    #[test]
    fn test_batch_action_failed_display() {
        let err = StatError::BatchActionFailed {
            label: "heal".to_string(),
            index: 1,
            applied: 1,
            source: "potion missing".into(),
        };
        let display = err.to_string();
        assert!(display.contains("heal"));
        assert!(display.contains("index 1"));
        assert!(display.contains("potion missing"));
    }

    #[test]
    fn test_batch_action_failed_source_chain() {
        use std::error::Error as _;

        let err = StatError::BatchActionFailed {
            label: "buff".to_string(),
            index: 0,
            applied: 0,
            source: "out of charges".into(),
        };
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("out of charges"));
    }
}
