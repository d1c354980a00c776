//! Price candidates produced by extraction strategies.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies the strategy that produced a candidate.
///
/// Variants are declared in chain priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Embedded JSON-LD product markup.
    StructuredData,
    /// Retailer-specific CSS selectors.
    SiteSpecific,
    /// Currency patterns scoped to the main product area.
    MainContent,
    /// Weighted selectors with ancestor scoring.
    ContextAware,
    /// Prioritized regexes over the whole document.
    AggressiveRegex,
    /// Mobile or AMP rendering of the same product.
    AlternateSurface,
}

impl StrategyKind {
    /// Stable snake_case name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StructuredData => "structured_data",
            Self::SiteSpecific => "site_specific",
            Self::MainContent => "main_content",
            Self::ContextAware => "context_aware",
            Self::AggressiveRegex => "aggressive_regex",
            Self::AlternateSurface => "alternate_surface",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A price value found by a strategy, with where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceCandidate {
    /// Parsed numeric value.
    pub value: f64,
    /// Strategy that produced it.
    pub strategy: StrategyKind,
    /// Text the value was parsed from.
    pub raw_text: String,
    /// Pattern label or JSON key that matched.
    pub source_key: Option<String>,
    /// Relevance score, for strategies that rank.
    pub score: Option<i32>,
    /// Whether the value came from machine-readable data.
    pub structured: bool,
}

impl PriceCandidate {
    /// Creates a candidate with no key, score or structured flag.
    #[must_use]
    pub fn new(value: f64, strategy: StrategyKind, raw_text: impl Into<String>) -> Self {
        Self {
            value,
            strategy,
            raw_text: raw_text.into(),
            source_key: None,
            score: None,
            structured: false,
        }
    }

    /// Sets the source key.
    #[must_use]
    pub fn with_source_key(mut self, key: impl Into<String>) -> Self {
        self.source_key = Some(key.into());
        self
    }

    /// Sets the score.
    #[must_use]
    pub fn with_score(mut self, score: i32) -> Self {
        self.score = Some(score);
        self
    }

    /// Marks the candidate as coming from structured data.
    #[must_use]
    pub fn structured(mut self) -> Self {
        self.structured = true;
        self
    }

    /// Whether the source key names a price field.
    #[must_use]
    pub fn has_price_key(&self) -> bool {
        self.source_key
            .as_deref()
            .is_some_and(|key| key.to_ascii_lowercase().contains("price"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_order_matches_chain_priority() {
        assert!(StrategyKind::StructuredData < StrategyKind::SiteSpecific);
        assert!(StrategyKind::AggressiveRegex < StrategyKind::AlternateSurface);
        assert_eq!(StrategyKind::MainContent.to_string(), "main_content");
    }

    #[test]
    fn test_has_price_key() {
        let c = PriceCandidate::new(10.0, StrategyKind::AggressiveRegex, "10")
            .with_source_key("json_sellingPrice");
        assert!(c.has_price_key());

        let c = PriceCandidate::new(10.0, StrategyKind::AggressiveRegex, "10")
            .with_source_key("rupee_symbol");
        assert!(!c.has_price_key());

        let c = PriceCandidate::new(10.0, StrategyKind::MainContent, "10");
        assert!(!c.has_price_key());
    }
}
