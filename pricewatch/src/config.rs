//! Configuration types for fetching, classification, extraction and batch runs.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::errors::PricewatchError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PricewatchConfig {
    /// Fetcher settings.
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Page classifier settings.
    #[serde(default)]
    pub classifier: ClassifierConfig,
    /// Strategy chain settings.
    #[serde(default)]
    pub extraction: ExtractionConfig,
    /// Batch runner settings.
    #[serde(default)]
    pub batch: BatchConfig,
}

impl PricewatchConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, PricewatchError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PricewatchError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Checks cross-field constraints.
    pub fn validate(&self) -> Result<(), PricewatchError> {
        if self.fetch.max_attempts == 0 {
            return Err(PricewatchError::Config("fetch.max_attempts must be at least 1".into()));
        }
        if self.fetch.retry_delay_min_seconds > self.fetch.retry_delay_max_seconds {
            return Err(PricewatchError::Config(
                "fetch.retry_delay_min_seconds exceeds retry_delay_max_seconds".into(),
            ));
        }
        if self.extraction.plausibility_min > self.extraction.plausibility_max {
            return Err(PricewatchError::Config(
                "extraction.plausibility_min exceeds plausibility_max".into(),
            ));
        }
        if self.batch.max_concurrency == 0 {
            return Err(PricewatchError::Config("batch.max_concurrency must be at least 1".into()));
        }
        Ok(())
    }
}

/// Configuration for the retrying fetcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Network round-trips allowed per fetch.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
    /// Timeout per attempt index, in seconds.
    #[serde(default = "default_timeout_schedule")]
    pub timeout_schedule_seconds: Vec<f64>,
    /// Timeout for attempts beyond the schedule.
    #[serde(default = "default_timeout_ceiling")]
    pub timeout_ceiling_seconds: f64,
    /// Lower bound of the randomized pre-retry delay.
    #[serde(default = "default_retry_delay_min")]
    pub retry_delay_min_seconds: f64,
    /// Upper bound of the randomized pre-retry delay.
    #[serde(default = "default_retry_delay_max")]
    pub retry_delay_max_seconds: f64,
    /// Backoff unit for 429/502/503/504: waits `(attempt + 1) * unit`.
    #[serde(default = "default_backoff_unit")]
    pub backoff_unit_seconds: f64,
    /// Pause after a connection error or hard status failure.
    #[serde(default = "default_error_pause")]
    pub error_pause_seconds: f64,
    /// Timeout of the single alternate-surface request.
    #[serde(default = "default_alternate_timeout")]
    pub alternate_timeout_seconds: f64,
}

fn default_max_attempts() -> usize {
    3
}

fn default_timeout_schedule() -> Vec<f64> {
    vec![20.0, 25.0, 30.0]
}

fn default_timeout_ceiling() -> f64 {
    30.0
}

fn default_retry_delay_min() -> f64 {
    1.0
}

fn default_retry_delay_max() -> f64 {
    3.0
}

fn default_backoff_unit() -> f64 {
    2.0
}

fn default_error_pause() -> f64 {
    2.0
}

fn default_alternate_timeout() -> f64 {
    15.0
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            timeout_schedule_seconds: default_timeout_schedule(),
            timeout_ceiling_seconds: default_timeout_ceiling(),
            retry_delay_min_seconds: default_retry_delay_min(),
            retry_delay_max_seconds: default_retry_delay_max(),
            backoff_unit_seconds: default_backoff_unit(),
            error_pause_seconds: default_error_pause(),
            alternate_timeout_seconds: default_alternate_timeout(),
        }
    }
}

impl FetchConfig {
    /// Creates a new fetch configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the attempt budget.
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Sets the randomized pre-retry delay range.
    #[must_use]
    pub fn with_retry_delay(mut self, min_seconds: f64, max_seconds: f64) -> Self {
        self.retry_delay_min_seconds = min_seconds;
        self.retry_delay_max_seconds = max_seconds;
        self
    }

    /// Sets the backoff unit for transient statuses.
    #[must_use]
    pub fn with_backoff_unit(mut self, seconds: f64) -> Self {
        self.backoff_unit_seconds = seconds;
        self
    }

    /// Sets the pause after connection errors.
    #[must_use]
    pub fn with_error_pause(mut self, seconds: f64) -> Self {
        self.error_pause_seconds = seconds;
        self
    }

    /// Removes every sleep. Used by tests and dry runs.
    #[must_use]
    pub fn without_delays(self) -> Self {
        self.with_retry_delay(0.0, 0.0)
            .with_backoff_unit(0.0)
            .with_error_pause(0.0)
    }

    /// Alternate-surface timeout as Duration.
    #[must_use]
    pub fn alternate_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.alternate_timeout_seconds.max(0.0))
    }
}

/// Thresholds for the block/error page classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Bodies shorter than this are blocked when they contain a block phrase.
    #[serde(default = "default_short_page_threshold")]
    pub short_page_threshold: usize,
    /// Bodies shorter than this need enough e-commerce indicators.
    #[serde(default = "default_sparse_page_threshold")]
    pub sparse_page_threshold: usize,
    /// Indicators required for a sparse page to count as genuine.
    #[serde(default = "default_min_indicators")]
    pub min_ecommerce_indicators: usize,
}

fn default_short_page_threshold() -> usize {
    1000
}

fn default_sparse_page_threshold() -> usize {
    2000
}

fn default_min_indicators() -> usize {
    2
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            short_page_threshold: default_short_page_threshold(),
            sparse_page_threshold: default_sparse_page_threshold(),
            min_ecommerce_indicators: default_min_indicators(),
        }
    }
}

/// Configuration for the strategy chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Smallest accepted price.
    #[serde(default = "default_plausibility_min")]
    pub plausibility_min: f64,
    /// Largest accepted price.
    #[serde(default = "default_plausibility_max")]
    pub plausibility_max: f64,
    /// Score bonus for elements inside `main`, `article` or `section`.
    #[serde(default = "default_ancestor_bonus")]
    pub context_ancestor_bonus: i32,
    /// Elements inspected per weighted selector.
    #[serde(default = "default_elements_per_selector")]
    pub context_elements_per_selector: usize,
    /// Minimum body length for an alternate surface to be considered.
    #[serde(default = "default_alternate_min_body_len")]
    pub alternate_min_body_len: usize,
}

fn default_plausibility_min() -> f64 {
    10.0
}

fn default_plausibility_max() -> f64 {
    100_000.0
}

fn default_ancestor_bonus() -> i32 {
    2
}

fn default_elements_per_selector() -> usize {
    5
}

fn default_alternate_min_body_len() -> usize {
    1000
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            plausibility_min: default_plausibility_min(),
            plausibility_max: default_plausibility_max(),
            context_ancestor_bonus: default_ancestor_bonus(),
            context_elements_per_selector: default_elements_per_selector(),
            alternate_min_body_len: default_alternate_min_body_len(),
        }
    }
}

impl ExtractionConfig {
    /// Sets the plausibility band.
    #[must_use]
    pub fn with_plausibility(mut self, min: f64, max: f64) -> Self {
        self.plausibility_min = min;
        self.plausibility_max = max;
        self
    }

    /// Returns the plausibility band.
    #[must_use]
    pub fn band(&self) -> PlausibilityBand {
        PlausibilityBand::new(self.plausibility_min, self.plausibility_max)
    }
}

/// Inclusive range of believable prices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlausibilityBand {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

impl Default for PlausibilityBand {
    fn default() -> Self {
        Self::new(default_plausibility_min(), default_plausibility_max())
    }
}

impl PlausibilityBand {
    /// Creates a band.
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Whether `value` lies in the band.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Configuration for batch runs over many alerts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Extractions in flight at once.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Minimum gap between requests to the same domain.
    #[serde(default = "default_domain_spacing")]
    pub domain_spacing_seconds: f64,
    /// Whole-job timeout. `None` runs to completion.
    #[serde(default)]
    pub job_timeout_seconds: Option<f64>,
}

fn default_max_concurrency() -> usize {
    4
}

fn default_domain_spacing() -> f64 {
    5.0
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            domain_spacing_seconds: default_domain_spacing(),
            job_timeout_seconds: None,
        }
    }
}

impl BatchConfig {
    /// Sets the concurrency bound.
    #[must_use]
    pub fn with_max_concurrency(mut self, n: usize) -> Self {
        self.max_concurrency = n;
        self
    }

    /// Sets the per-domain spacing.
    #[must_use]
    pub fn with_domain_spacing(mut self, seconds: f64) -> Self {
        self.domain_spacing_seconds = seconds;
        self
    }

    /// Sets the whole-job timeout.
    #[must_use]
    pub fn with_job_timeout(mut self, seconds: f64) -> Self {
        self.job_timeout_seconds = Some(seconds);
        self
    }

    /// Per-domain spacing as Duration.
    #[must_use]
    pub fn domain_spacing(&self) -> Duration {
        Duration::from_secs_f64(self.domain_spacing_seconds.max(0.0))
    }

    /// Job timeout as Duration.
    #[must_use]
    pub fn job_timeout(&self) -> Option<Duration> {
        self.job_timeout_seconds
            .map(|secs| Duration::from_secs_f64(secs.max(0.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = PricewatchConfig::default();
        assert_eq!(config.fetch.max_attempts, 3);
        assert_eq!(config.fetch.timeout_schedule_seconds, vec![20.0, 25.0, 30.0]);
        assert_eq!(config.classifier.short_page_threshold, 1000);
        assert_eq!(config.extraction.band(), PlausibilityBand::new(10.0, 100_000.0));
        assert_eq!(config.batch.max_concurrency, 4);
        assert!(config.batch.job_timeout().is_none());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = PricewatchConfig::from_json_str(
            r#"{"fetch": {"max_attempts": 5}, "batch": {"job_timeout_seconds": 600}}"#,
        )
        .unwrap();

        assert_eq!(config.fetch.max_attempts, 5);
        assert_eq!(config.fetch.backoff_unit_seconds, 2.0);
        assert_eq!(config.batch.job_timeout(), Some(Duration::from_secs(600)));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(PricewatchConfig::from_json_str(r#"{"fetch": {"max_attempts": 0}}"#).is_err());
        assert!(PricewatchConfig::from_json_str(
            r#"{"extraction": {"plausibility_min": 500, "plausibility_max": 10}}"#
        )
        .is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pricewatch.json");
        std::fs::write(&path, r#"{"batch": {"max_concurrency": 2}}"#).unwrap();

        let config = PricewatchConfig::from_file(&path).unwrap();
        assert_eq!(config.batch.max_concurrency, 2);
    }

    #[test]
    fn test_band_contains() {
        let band = PlausibilityBand::default();
        assert!(band.contains(10.0));
        assert!(band.contains(100_000.0));
        assert!(!band.contains(9.99));
        assert!(!band.contains(f64::NAN));
    }

    #[test]
    fn test_without_delays() {
        let config = FetchConfig::new().without_delays();
        assert_eq!(config.retry_delay_max_seconds, 0.0);
        assert_eq!(config.backoff_unit_seconds, 0.0);
        assert_eq!(config.error_pause_seconds, 0.0);
    }
}
