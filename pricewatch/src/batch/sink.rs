//! Report sink trait and implementations.

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{info, warn};

use super::models::PriceReport;

/// Receives a report as each alert finishes.
///
/// Sinks must not fail the batch; delivery problems are theirs to log.
#[async_trait]
pub trait PriceSink: Send + Sync {
    /// Delivers one report.
    async fn deliver(&self, report: &PriceReport);
}

/// Logs every report through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingPriceSink;

#[async_trait]
impl PriceSink for LoggingPriceSink {
    async fn deliver(&self, report: &PriceReport) {
        match report.price {
            Some(price) if report.target_met => info!(
                url = %report.url,
                price,
                target = report.target_price,
                strategy = ?report.strategy,
                "Target price met"
            ),
            Some(price) => info!(
                url = %report.url,
                price,
                target = report.target_price,
                strategy = ?report.strategy,
                "Price checked"
            ),
            None => warn!(url = %report.url, target = report.target_price, "No price found"),
        }
    }
}

/// Keeps reports in memory.
#[derive(Debug, Default)]
pub struct CollectingPriceSink {
    reports: RwLock<Vec<PriceReport>>,
}

impl CollectingPriceSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected reports in delivery order.
    #[must_use]
    pub fn reports(&self) -> Vec<PriceReport> {
        self.reports.read().clone()
    }

    /// Returns the number of collected reports.
    #[must_use]
    pub fn len(&self) -> usize {
        self.reports.read().len()
    }

    /// Returns true if nothing was delivered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reports.read().is_empty()
    }

    /// Reports whose target was met.
    #[must_use]
    pub fn triggered(&self) -> Vec<PriceReport> {
        self.reports
            .read()
            .iter()
            .filter(|r| r.target_met)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl PriceSink for CollectingPriceSink {
    async fn deliver(&self, report: &PriceReport) {
        self.reports.write().push(report.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::PriceAlert;
    use crate::extractor::{ExtractionResult, NotFoundReason};
    use crate::pricing::StrategyKind;

    fn reports() -> Vec<PriceReport> {
        let alert = PriceAlert::new("https://shop.example/p/1", 500.0);
        vec![
            PriceReport::from_result(
                &alert,
                &ExtractionResult::Found { price: 450.0, strategy: StrategyKind::SiteSpecific },
            ),
            PriceReport::from_result(
                &alert,
                &ExtractionResult::Found { price: 650.0, strategy: StrategyKind::SiteSpecific },
            ),
            PriceReport::from_result(&alert, &ExtractionResult::NotFound(NotFoundReason::NoCandidate)),
        ]
    }

    #[tokio::test]
    async fn test_logging_sink() {
        let sink = LoggingPriceSink;
        for report in reports() {
            sink.deliver(&report).await;
        }
        // Should not panic
    }

    #[tokio::test]
    async fn test_collecting_sink() {
        let sink = CollectingPriceSink::new();
        assert!(sink.is_empty());

        for report in reports() {
            sink.deliver(&report).await;
        }

        assert_eq!(sink.len(), 3);
        assert_eq!(sink.triggered().len(), 1);
        assert_eq!(sink.reports()[1].price, Some(650.0));
    }
}
