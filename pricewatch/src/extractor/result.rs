//! Outcome of one extraction.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::pricing::StrategyKind;

/// Why no price was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotFoundReason {
    /// The page could not be fetched.
    Unreachable,
    /// The page was a block, error or maintenance page.
    Blocked,
    /// Every strategy came up empty.
    NoCandidate,
}

impl fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unreachable => "unreachable",
            Self::Blocked => "blocked",
            Self::NoCandidate => "no_candidate",
        };
        f.write_str(s)
    }
}

/// Result of [`PriceExtractor::extract`](super::PriceExtractor::extract).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum ExtractionResult {
    /// A plausible price was found.
    Found {
        /// The price.
        price: f64,
        /// Strategy that produced it.
        strategy: StrategyKind,
    },
    /// No price was found.
    NotFound(NotFoundReason),
}

impl ExtractionResult {
    /// The price, if one was found.
    #[must_use]
    pub fn price(&self) -> Option<f64> {
        match self {
            Self::Found { price, .. } => Some(*price),
            Self::NotFound(_) => None,
        }
    }

    /// Whether a price was found.
    #[must_use]
    pub fn found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    /// The winning strategy, if any.
    #[must_use]
    pub fn strategy(&self) -> Option<StrategyKind> {
        match self {
            Self::Found { strategy, .. } => Some(*strategy),
            Self::NotFound(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_accessors() {
        let found = ExtractionResult::Found {
            price: 999.0,
            strategy: StrategyKind::StructuredData,
        };
        assert_eq!(found.price(), Some(999.0));
        assert!(found.found());
        assert_eq!(found.strategy(), Some(StrategyKind::StructuredData));

        let missing = ExtractionResult::NotFound(NotFoundReason::Blocked);
        assert_eq!(missing.price(), None);
        assert!(!missing.found());
    }

    #[test]
    fn test_serialization_shape() {
        let found = ExtractionResult::Found {
            price: 42.5,
            strategy: StrategyKind::AggressiveRegex,
        };
        assert_eq!(
            serde_json::to_value(&found).unwrap(),
            serde_json::json!({"status": "found", "detail": {"price": 42.5, "strategy": "aggressive_regex"}})
        );

        let missing = ExtractionResult::NotFound(NotFoundReason::NoCandidate);
        assert_eq!(
            serde_json::to_value(&missing).unwrap(),
            serde_json::json!({"status": "not_found", "detail": "no_candidate"})
        );
    }
}
