//! Alerts, per-alert reports and run summaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::PricewatchError;
use crate::extractor::ExtractionResult;
use crate::pricing::StrategyKind;

/// A product URL and the price the user is waiting for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceAlert {
    /// Product page URL.
    pub url: String,
    /// Price at or below which the alert fires.
    pub target_price: f64,
}

impl PriceAlert {
    /// Creates an alert.
    #[must_use]
    pub fn new(url: impl Into<String>, target_price: f64) -> Self {
        Self {
            url: url.into(),
            target_price,
        }
    }

    /// Rejects an empty URL and a target that is not a positive number.
    pub fn validate(&self) -> Result<(), PricewatchError> {
        if self.url.trim().is_empty() {
            return Err(PricewatchError::InvalidAlert("url is empty".into()));
        }
        if !(self.target_price.is_finite() && self.target_price > 0.0) {
            return Err(PricewatchError::InvalidAlert(format!(
                "target_price must be positive, got {} for {}",
                self.target_price, self.url
            )));
        }
        Ok(())
    }
}

/// Outcome of checking one alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceReport {
    /// Product page URL.
    pub url: String,
    /// Target price of the alert.
    pub target_price: f64,
    /// Extracted price, if any.
    pub price: Option<f64>,
    /// Whether the extracted price is at or below the target.
    pub target_met: bool,
    /// Strategy that found the price.
    pub strategy: Option<StrategyKind>,
    /// When the check finished.
    pub checked_at: DateTime<Utc>,
}

impl PriceReport {
    /// Builds a report from an extraction result.
    #[must_use]
    pub fn from_result(alert: &PriceAlert, result: &ExtractionResult) -> Self {
        let price = result.price();
        Self {
            url: alert.url.clone(),
            target_price: alert.target_price,
            price,
            target_met: price.is_some_and(|p| p <= alert.target_price),
            strategy: result.strategy(),
            checked_at: Utc::now(),
        }
    }
}

/// Totals for one batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Unique, time-ordered run id.
    pub run_id: Uuid,
    /// Alerts submitted.
    pub total: usize,
    /// Alerts with a price.
    pub found: usize,
    /// Alerts without a price.
    pub not_found: usize,
    /// Alerts whose target was met.
    pub target_met: usize,
    /// Whether the job deadline cut the run short.
    pub timed_out: bool,
    /// Run start.
    pub started_at: DateTime<Utc>,
    /// Run end.
    pub finished_at: DateTime<Utc>,
}

impl BatchSummary {
    /// Starts an empty summary for `total` alerts.
    #[must_use]
    pub fn start(total: usize) -> Self {
        let now = Utc::now();
        Self {
            run_id: Uuid::now_v7(),
            total,
            found: 0,
            not_found: 0,
            target_met: 0,
            timed_out: false,
            started_at: now,
            finished_at: now,
        }
    }

    /// Counts one report.
    pub fn record(&mut self, report: &PriceReport) {
        if report.price.is_some() {
            self.found += 1;
        } else {
            self.not_found += 1;
        }
        if report.target_met {
            self.target_met += 1;
        }
    }

    /// Alerts that were never checked.
    #[must_use]
    pub fn unchecked(&self) -> usize {
        self.total.saturating_sub(self.found + self.not_found)
    }

    /// Stamps the end time.
    pub fn finish(&mut self) {
        self.finished_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::NotFoundReason;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_report_target_met() {
        let alert = PriceAlert::new("https://shop.example/p/1", 1000.0);

        let hit = PriceReport::from_result(
            &alert,
            &ExtractionResult::Found { price: 999.0, strategy: StrategyKind::StructuredData },
        );
        assert!(hit.target_met);
        assert_eq!(hit.strategy, Some(StrategyKind::StructuredData));

        let exact = PriceReport::from_result(
            &alert,
            &ExtractionResult::Found { price: 1000.0, strategy: StrategyKind::AggressiveRegex },
        );
        assert!(exact.target_met);

        let miss = PriceReport::from_result(&alert, &ExtractionResult::NotFound(NotFoundReason::Blocked));
        assert!(!miss.target_met);
        assert_eq!(miss.price, None);
    }

    #[test]
    fn test_alert_validation() {
        assert!(PriceAlert::new("https://shop.example/p/1", 499.0).validate().is_ok());
        assert!(PriceAlert::new("  ", 499.0).validate().is_err());
        assert!(PriceAlert::new("https://shop.example/p/1", 0.0).validate().is_err());
        assert!(PriceAlert::new("https://shop.example/p/1", -5.0).validate().is_err());

        let err = PriceAlert::new("https://shop.example/p/1", f64::NAN).validate().unwrap_err();
        assert!(matches!(err, PricewatchError::InvalidAlert(_)));
    }

    #[test]
    fn test_summary_counts() {
        let alert = PriceAlert::new("https://shop.example/p/1", 500.0);
        let mut summary = BatchSummary::start(3);

        summary.record(&PriceReport::from_result(
            &alert,
            &ExtractionResult::Found { price: 450.0, strategy: StrategyKind::MainContent },
        ));
        summary.record(&PriceReport::from_result(&alert, &ExtractionResult::NotFound(NotFoundReason::Unreachable)));
        summary.finish();

        assert_eq!((summary.found, summary.not_found, summary.target_met), (1, 1, 1));
        assert_eq!(summary.unchecked(), 1);
        assert!(summary.finished_at >= summary.started_at);
        assert_eq!(summary.run_id.get_version_num(), 7);
    }

    #[test]
    fn test_alert_list_from_json() {
        let alerts: Vec<PriceAlert> =
            serde_json::from_str(r#"[{"url": "https://shop.example/p/1", "target_price": 499}]"#).unwrap();
        assert_eq!(alerts, vec![PriceAlert::new("https://shop.example/p/1", 499.0)]);
    }
}
