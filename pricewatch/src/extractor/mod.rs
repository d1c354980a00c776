//! The extraction orchestrator.
//!
//! [`PriceExtractor`] fetches a page, rejects block and maintenance pages, and
//! walks the strategy chain until one strategy yields a plausible price.

mod result;


use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::classify::PageClassifier;
use crate::config::{PlausibilityBand, PricewatchConfig};
use crate::errors::TransportError;
use crate::fetch::{FetchedDocument, Fetcher, HttpTransport, ReqwestTransport};
use crate::strategies::{default_chain, ExtractionStrategy};

pub use result::{ExtractionResult, NotFoundReason};

/// Extracts the current price of a product page.
///
/// # Example
///
/// ```no_run
/// use pricewatch::prelude::*;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let extractor = PriceExtractor::with_reqwest(PricewatchConfig::default())?;
/// let result = extractor.extract("https://www.flipkart.com/kettle/p/itm42").await;
/// println!("{:?}", result.price());
/// # Ok(())
/// # }
/// ```
pub struct PriceExtractor {
    fetcher: Fetcher,
    classifier: PageClassifier,
    band: PlausibilityBand,
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl std::fmt::Debug for PriceExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriceExtractor")
            .field("band", &self.band)
            .field("strategies", &self.strategies)
            .finish_non_exhaustive()
    }
}

impl PriceExtractor {
    /// Creates an extractor with the standard strategy chain.
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>, config: &PricewatchConfig) -> Self {
        let fetcher = Fetcher::new(transport, &config.fetch);
        Self {
            strategies: default_chain(fetcher.clone(), config),
            classifier: PageClassifier::new(config.classifier.clone()),
            band: config.extraction.band(),
            fetcher,
        }
    }

    /// Creates an extractor that talks to the network through reqwest.
    pub fn with_reqwest(config: PricewatchConfig) -> Result<Self, TransportError> {
        let transport = ReqwestTransport::new()?;
        Ok(Self::new(Arc::new(transport), &config))
    }

    /// Replaces the strategy chain.
    #[must_use]
    pub fn with_strategies(mut self, strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        self.strategies = strategies;
        self
    }

    /// The fetcher in use.
    #[must_use]
    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    /// Fetches `url` and extracts its price.
    ///
    /// Never fails: unreachable pages, blocked pages and pages without a
    /// plausible price all come back as [`ExtractionResult::NotFound`].
    pub async fn extract(&self, url: &str) -> ExtractionResult {
        let started = Instant::now();

        let document = match self.fetcher.fetch(url).await {
            Ok(document) => document,
            Err(err) => {
                warn!(url, error = %err, kind = ?err.kind(), "Page could not be fetched");
                return ExtractionResult::NotFound(NotFoundReason::Unreachable);
            }
        };

        let result = self.extract_from_document(&document).await;
        info!(
            url,
            found = result.found(),
            price = result.price(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Extraction finished"
        );
        result
    }

    /// Classifies an already fetched page and runs the strategy chain on it.
    pub async fn extract_from_document(&self, document: &FetchedDocument) -> ExtractionResult {
        if let Some(reason) = self.classifier.block_reason(document) {
            warn!(
                url = %document.url,
                title = document.title.as_deref().unwrap_or_default(),
                ?reason,
                "Received a block or maintenance page instead of the product"
            );
            return ExtractionResult::NotFound(NotFoundReason::Blocked);
        }

        info!(url = %document.url, domain = %document.domain, body_len = document.body_len(), "Extracting price");

        for strategy in &self.strategies {
            let kind = strategy.kind();
            match strategy.try_extract(document).await {
                Ok(Some(candidate)) if self.band.contains(candidate.value) => {
                    info!(strategy = %kind, price = candidate.value, raw = %candidate.raw_text, "Price found");
                    return ExtractionResult::Found {
                        price: candidate.value,
                        strategy: kind,
                    };
                }
                Ok(Some(candidate)) => {
                    debug!(strategy = %kind, price = candidate.value, "Candidate outside plausible range");
                }
                Ok(None) => debug!(strategy = %kind, "No candidate"),
                Err(err) => debug!(strategy = %kind, error = %err, "Strategy failed"),
            }
        }

        warn!(url = %document.url, "No reliable price found");
        ExtractionResult::NotFound(NotFoundReason::NoCandidate)
    }
}
