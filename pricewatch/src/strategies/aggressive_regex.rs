//! Prioritized price patterns over the whole raw document.

use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

use super::ExtractionStrategy;
use crate::config::PlausibilityBand;
use crate::errors::StrategyError;
use crate::fetch::FetchedDocument;
use crate::pricing::{parse_price, PriceCandidate, StrategyKind};

/// Pattern labels and sources, most trustworthy first. Every pattern has
/// exactly one capture group holding the amount.
const PATTERNS: &[(&str, &str)] = &[
    ("rupee_symbol", r"₹\s*([1-9][0-9,]*(?:\.[0-9]{2})?)"),
    ("rs_prefix", r"Rs\.?\s*([1-9][0-9,]*(?:\.[0-9]{2})?)"),
    ("inr_prefix", r"INR\s*([1-9][0-9,]*(?:\.[0-9]{2})?)"),
    ("rupee_tight", r"₹([1-9][0-9,]{2,8})"),
    ("json_price", r#""price"\s*:\s*"?([1-9][0-9,]*(?:\.[0-9]{2})?)"?[,}\s]"#),
    ("json_sellingPrice", r#""sellingPrice"\s*:\s*"?([1-9][0-9,]*(?:\.[0-9]{2})?)"?[,}\s]"#),
    ("json_currentPrice", r#""currentPrice"\s*:\s*"?([1-9][0-9,]*(?:\.[0-9]{2})?)"?[,}\s]"#),
    ("json_salePrice", r#""salePrice"\s*:\s*"?([1-9][0-9,]*(?:\.[0-9]{2})?)"?[,}\s]"#),
    ("json_finalPrice", r#""finalPrice"\s*:\s*"?([1-9][0-9,]*(?:\.[0-9]{2})?)"?[,}\s]"#),
    ("json_discountedPrice", r#""discountedPrice"\s*:\s*"?([1-9][0-9,]*(?:\.[0-9]{2})?)"?[,}\s]"#),
    ("json_listPrice", r#""listPrice"\s*:\s*"?([1-9][0-9,]*(?:\.[0-9]{2})?)"?[,}\s]"#),
    ("json_mrp", r#""mrp"\s*:\s*"?([1-9][0-9,]*(?:\.[0-9]{2})?)"?[,}\s]"#),
    ("js_price", r"price\s*[=:]\s*([1-9][0-9,]*(?:\.[0-9]{2})?)"),
    ("js_currentPrice", r"currentPrice\s*[=:]\s*([1-9][0-9,]*(?:\.[0-9]{2})?)"),
    ("js_sellingPrice", r"sellingPrice\s*[=:]\s*([1-9][0-9,]*(?:\.[0-9]{2})?)"),
    ("js_productPrice", r"productPrice\s*[=:]\s*([1-9][0-9,]*(?:\.[0-9]{2})?)"),
    ("attr_data_price", r#"data-price[=\s]*["']([1-9][0-9,]*(?:\.[0-9]{2})?)["']"#),
    ("attr_data_selling_price", r#"data-selling-price[=\s]*["']([1-9][0-9,]*(?:\.[0-9]{2})?)["']"#),
    ("attr_data_current_price", r#"data-current-price[=\s]*["']([1-9][0-9,]*(?:\.[0-9]{2})?)["']"#),
    ("suffix_word", r"([1-9][0-9,]*(?:\.[0-9]{2})?)\s*(?:only|OFF|offer|discount|/-)"),
    ("prefix_word", r"(?:was|originally|MRP|marked|price)\s*:?\s*₹?\s*([1-9][0-9,]*(?:\.[0-9]{2})?)"),
    ("savings", r"(?:save|you save)\s*₹?\s*([1-9][0-9,]*(?:\.[0-9]{2})?)"),
    ("bare_before_suffix", r"([1-9][0-9]{2,5})\s*(?:/-|only|OFF)"),
    ("indian_grouping", r"([1-9],[0-9]{2,3}(?:,[0-9]{3})*)"),
    // Matches any 500..=999999 run of digits, including SKUs and counts.
    ("loose_number", r"([5-9][0-9]{2}|[1-9][0-9]{3,5})"),
];

/// A compiled pattern and its priority.
#[derive(Debug)]
pub struct PricePattern {
    /// Position in the priority list; lower is more trustworthy.
    pub index: usize,
    /// Label recorded as the candidate's source key.
    pub label: &'static str,
    /// Case-insensitive regex.
    pub regex: Regex,
}

/// Compiled pattern list.
pub static PRICE_PATTERNS: LazyLock<Vec<PricePattern>> = LazyLock::new(|| {
    PATTERNS
        .iter()
        .enumerate()
        .filter_map(|(index, &(label, source))| {
            match Regex::new(&format!("(?i){source}")) {
                Ok(regex) => Some(PricePattern { index, label, regex }),
                Err(err) => {
                    warn!(label, error = %err, "Skipping invalid price pattern");
                    None
                }
            }
        })
        .collect()
});

/// Collects every plausible match of every pattern and returns the one from
/// the most trustworthy pattern, lowest value first.
#[derive(Debug, Clone, Default)]
pub struct AggressiveRegexStrategy {
    band: PlausibilityBand,
}

impl AggressiveRegexStrategy {
    /// Creates the strategy with the given plausibility band.
    #[must_use]
    pub fn new(band: PlausibilityBand) -> Self {
        Self { band }
    }

    /// All plausible matches in `text`, ordered by (pattern index, value).
    #[must_use]
    pub fn candidates(&self, text: &str) -> Vec<PriceCandidate> {
        let mut found: Vec<(usize, PriceCandidate)> = Vec::new();

        for pattern in PRICE_PATTERNS.iter() {
            let before = found.len();
            for caps in pattern.regex.captures_iter(text) {
                let Some(raw) = caps.get(1) else { continue };
                let Some(value) = parse_price(raw.as_str()).filter(|v| self.band.contains(*v)) else {
                    continue;
                };
                found.push((
                    pattern.index,
                    PriceCandidate::new(value, StrategyKind::AggressiveRegex, raw.as_str())
                        .with_source_key(pattern.label),
                ));
            }
            if found.len() > before {
                debug!(pattern = pattern.label, matches = found.len() - before, "Pattern matched");
            }
        }

        found.sort_by(|(ia, a), (ib, b)| ia.cmp(ib).then(a.value.total_cmp(&b.value)));
        found.into_iter().map(|(_, candidate)| candidate).collect()
    }

    /// The first candidate in priority order.
    #[must_use]
    pub fn best(&self, text: &str) -> Option<PriceCandidate> {
        let candidates = self.candidates(text);
        let best = candidates.into_iter().next();
        match &best {
            Some(candidate) => info!(
                price = candidate.value,
                pattern = candidate.source_key.as_deref().unwrap_or_default(),
                "Aggressive regex selected price"
            ),
            None => info!("No prices found with aggressive regex"),
        }
        best
    }
}

#[async_trait]
impl ExtractionStrategy for AggressiveRegexStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::AggressiveRegex
    }

    async fn try_extract(
        &self,
        document: &FetchedDocument,
    ) -> Result<Option<PriceCandidate>, StrategyError> {
        Ok(self.best(&document.body))
    }
}
