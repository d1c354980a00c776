//! Weighted generic price selectors.

use async_trait::async_trait;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use tracing::{debug, info};

use super::dom::{element_text, has_ancestor, parse_selector};
use super::ExtractionStrategy;
use crate::config::ExtractionConfig;
use crate::errors::StrategyError;
use crate::fetch::FetchedDocument;
use crate::pricing::{parse_price, PriceCandidate, StrategyKind};

const WEIGHTED: &[(&str, i32)] = &[
    (r#"[data-testid*="price"]"#, 10),
    (r#"[class*="selling-price"]"#, 9),
    (r#"[class*="current-price"]"#, 9),
    (r#"[class*="product-price"]"#, 8),
    (r#"[itemprop="price"]"#, 8),
    (".price", 6),
    (r#"[class*="price"]"#, 5),
];

const PRODUCT_AREAS: &[&str] = &["main", "article", "section"];

struct WeightedSelector {
    css: &'static str,
    selector: Selector,
    weight: i32,
}

static WEIGHTED_SELECTORS: LazyLock<Vec<WeightedSelector>> = LazyLock::new(|| {
    WEIGHTED
        .iter()
        .filter_map(|&(css, weight)| {
            parse_selector(css)
                .ok()
                .map(|selector| WeightedSelector { css, selector, weight })
        })
        .collect()
});

/// Scores price-like elements by selector weight and surrounding structure.
#[derive(Debug, Clone)]
pub struct ContextAwareStrategy {
    config: ExtractionConfig,
}

impl Default for ContextAwareStrategy {
    fn default() -> Self {
        Self::new(ExtractionConfig::default())
    }
}

impl ContextAwareStrategy {
    /// Creates the strategy.
    #[must_use]
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    fn scan(&self, body: &str) -> Option<PriceCandidate> {
        let html = Html::parse_document(body);
        let band = self.config.band();
        let mut best: Option<PriceCandidate> = None;
        let mut seen = 0usize;

        for weighted in WEIGHTED_SELECTORS.iter() {
            for element in html
                .select(&weighted.selector)
                .take(self.config.context_elements_per_selector)
            {
                let text = element_text(&element);
                let Some(value) = parse_price(&text).filter(|v| band.contains(*v)) else {
                    continue;
                };

                let mut score = weighted.weight;
                if has_ancestor(&element, PRODUCT_AREAS) {
                    score += self.config.context_ancestor_bonus;
                }
                seen += 1;

                // Strictly greater keeps the earliest of equal scores.
                if best.as_ref().and_then(|b| b.score).map_or(true, |top| score > top) {
                    best = Some(
                        PriceCandidate::new(value, StrategyKind::ContextAware, text)
                            .with_source_key(weighted.css)
                            .with_score(score),
                    );
                }
            }
        }

        debug!(candidates = seen, "Scored context candidates");
        if let Some(best) = &best {
            info!(price = best.value, score = best.score, "Best context candidate");
        }
        best
    }
}

#[async_trait]
impl ExtractionStrategy for ContextAwareStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ContextAware
    }

    async fn try_extract(
        &self,
        document: &FetchedDocument,
    ) -> Result<Option<PriceCandidate>, StrategyError> {
        Ok(self.scan(&document.body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ProductPage;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_highest_weight_wins() {
        let html = ProductPage::new("Kettle")
            .body(r#"<span class="price">₹1,999</span><span data-testid="final-price">₹1,499</span>"#)
            .build();

        let candidate = ContextAwareStrategy::default().scan(&html).unwrap();
        assert_eq!(candidate.value, 1499.0);
        assert_eq!(candidate.score, Some(10));
    }

    #[test]
    fn test_product_area_bonus() {
        let html = ProductPage::new("Kettle")
            .body(r#"<div class="product-price">₹2,000</div><section><span class="price">₹1,800</span></section>"#)
            .build();

        // The section bonus lifts ".price" to 8, tying the earlier
        // product-price match.
        let candidate = ContextAwareStrategy::default().scan(&html).unwrap();
        assert_eq!(candidate.value, 2000.0);

        let html = ProductPage::new("Kettle")
            .body(r#"<div class="price">₹2,000</div><article><span class="price">₹1,800</span></article>"#)
            .build();
        let candidate = ContextAwareStrategy::default().scan(&html).unwrap();
        assert_eq!(candidate.value, 1800.0);
        assert_eq!(candidate.score, Some(8));
    }

    #[test]
    fn test_ties_keep_encounter_order() {
        let html = ProductPage::new("Kettle")
            .body(r#"<span class="price">₹300</span><span class="price">₹200</span>"#)
            .build();

        assert_eq!(ContextAwareStrategy::default().scan(&html).unwrap().value, 300.0);
    }

    #[test]
    fn test_band_and_element_limit() {
        let html = ProductPage::new("Kettle")
            .body(r#"<span class="price">₹5</span><span class="price">₹999999</span>"#)
            .build();
        assert_eq!(ContextAwareStrategy::default().scan(&html), None);

        let mut config = ExtractionConfig::default();
        config.context_elements_per_selector = 1;
        let html = ProductPage::new("Kettle")
            .body(r#"<span class="price">none</span><span class="price">₹450</span>"#)
            .build();
        assert_eq!(ContextAwareStrategy::new(config).scan(&html), None);
    }
}
