//! Retailer-specific CSS selectors.

use async_trait::async_trait;
use scraper::Html;
use tracing::{debug, info};

use super::dom::element_text;
use super::site_table::selectors_for;
use super::ExtractionStrategy;
use crate::errors::StrategyError;
use crate::fetch::FetchedDocument;
use crate::pricing::{parse_price, PriceCandidate, StrategyKind};

/// Tries the known selectors of the page's retailer in order and returns the
/// first element text that parses to a positive price.
#[derive(Debug, Clone, Default)]
pub struct SiteSpecificStrategy;

impl SiteSpecificStrategy {
    /// Creates the strategy.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn scan(&self, domain: &str, body: &str) -> Option<PriceCandidate> {
        let entry = selectors_for(domain)?;
        info!(domain, site = entry.domain, selectors = entry.selectors.len(), "Using site-specific selectors");

        let html = Html::parse_document(body);
        for (css, selector) in &entry.selectors {
            for element in html.select(selector) {
                let text = element_text(&element);
                match parse_price(&text) {
                    Some(value) if value > 0.0 => {
                        return Some(
                            PriceCandidate::new(value, StrategyKind::SiteSpecific, text)
                                .with_source_key(*css),
                        );
                    }
                    _ => debug!(selector = css, "Element text is not a price"),
                }
            }
        }
        None
    }
}

#[async_trait]
impl ExtractionStrategy for SiteSpecificStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::SiteSpecific
    }

    async fn try_extract(
        &self,
        document: &FetchedDocument,
    ) -> Result<Option<PriceCandidate>, StrategyError> {
        Ok(self.scan(&document.domain, &document.body))
    }
}
