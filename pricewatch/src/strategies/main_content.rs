//! Currency patterns scoped to the main product area.

use async_trait::async_trait;
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use tracing::{debug, info};

use super::dom::{compile_all, spaced_text};
use super::ExtractionStrategy;
use crate::config::PlausibilityBand;
use crate::errors::StrategyError;
use crate::fetch::FetchedDocument;
use crate::pricing::{parse_price, select_price, PriceCandidate, StrategyKind};

const CONTAINERS: &[&str] = &[
    "main",
    r#"[role="main"]"#,
    ".main",
    "#main",
    ".product",
    ".product-details",
    ".product-info",
    ".item",
    ".item-details",
    ".item-info",
    ".pdp-container",
    ".product-container",
];

static CONTAINER_SELECTORS: LazyLock<Vec<(&'static str, Selector)>> =
    LazyLock::new(|| compile_all(CONTAINERS));

/// Currency-anchored amount patterns.
static CURRENCY_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("rupee_symbol", r"₹\s*([0-9,]+(?:\.[0-9]{2})?)"),
        ("rs_prefix", r"Rs\.?\s*([0-9,]+(?:\.[0-9]{2})?)"),
        ("dollar_symbol", r"\$\s*([0-9,]+(?:\.[0-9]{2})?)"),
    ]
    .into_iter()
    .filter_map(|(label, pattern)| Regex::new(pattern).ok().map(|re| (label, re)))
    .collect()
});

/// Scans the first matching product container for currency amounts and
/// picks one with the candidate selector.
#[derive(Debug, Clone, Default)]
pub struct MainContentStrategy {
    band: PlausibilityBand,
}

impl MainContentStrategy {
    /// Creates the strategy with the given plausibility band.
    #[must_use]
    pub fn new(band: PlausibilityBand) -> Self {
        Self { band }
    }

    fn scan(&self, body: &str) -> Option<PriceCandidate> {
        let html = Html::parse_document(body);

        for (css, selector) in CONTAINER_SELECTORS.iter() {
            let Some(container) = html.select(selector).next() else {
                continue;
            };

            let text = spaced_text(&container);
            let candidates = self.currency_candidates(&text);
            debug!(container = css, found = candidates.len(), "Scanned product container");

            if let Some(value) = select_price(&candidates) {
                info!(container = css, price = value, "Price found in main content");
                let raw = candidates
                    .iter()
                    .find(|c| c.value == value)
                    .map(|c| c.raw_text.clone())
                    .unwrap_or_default();
                return Some(
                    PriceCandidate::new(value, StrategyKind::MainContent, raw)
                        .with_source_key(*css),
                );
            }
        }
        None
    }

    fn currency_candidates(&self, text: &str) -> Vec<PriceCandidate> {
        let mut out = Vec::new();
        for (label, regex) in CURRENCY_PATTERNS.iter() {
            for caps in regex.captures_iter(text) {
                let Some(raw) = caps.get(1) else { continue };
                if let Some(value) = parse_price(raw.as_str()).filter(|v| self.band.contains(*v)) {
                    out.push(
                        PriceCandidate::new(value, StrategyKind::MainContent, raw.as_str())
                            .with_source_key(*label),
                    );
                }
            }
        }
        out
    }
}

#[async_trait]
impl ExtractionStrategy for MainContentStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::MainContent
    }

    async fn try_extract(
        &self,
        document: &FetchedDocument,
    ) -> Result<Option<PriceCandidate>, StrategyError> {
        Ok(self.scan(&document.body))
    }
}
