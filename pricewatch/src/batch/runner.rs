//! Bounded, paced extraction over many alerts.

use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use super::models::{BatchSummary, PriceAlert, PriceReport};
use super::pacer::DomainPacer;
use super::sink::PriceSink;
use crate::config::BatchConfig;
use crate::extractor::PriceExtractor;
use crate::fetch::site_domain;

/// Checks a list of alerts with at most `max_concurrency` extractions in
/// flight and per-domain spacing between their starts.
#[derive(Debug, Clone)]
pub struct BatchRunner {
    extractor: Arc<PriceExtractor>,
    pacer: Arc<DomainPacer>,
    config: BatchConfig,
}

impl BatchRunner {
    /// Creates a runner.
    #[must_use]
    pub fn new(extractor: Arc<PriceExtractor>, config: BatchConfig) -> Self {
        Self {
            pacer: Arc::new(DomainPacer::new(config.domain_spacing())),
            extractor,
            config,
        }
    }

    /// Checks every alert and delivers each report to `sink` as it completes.
    ///
    /// When a job timeout is configured, extractions still running at the
    /// deadline are dropped and the summary is marked `timed_out`.
    pub async fn run(&self, alerts: Vec<PriceAlert>, sink: &dyn PriceSink) -> BatchSummary {
        let mut summary = BatchSummary::start(alerts.len());
        let concurrency = self.config.max_concurrency.max(1);
        let deadline = self
            .config
            .job_timeout()
            .map(|timeout| tokio::time::Instant::now() + timeout);

        info!(run_id = %summary.run_id, alerts = summary.total, concurrency, "Starting price check");

        let mut reports = stream::iter(interleave_by_domain(alerts))
            .map(|alert| self.check(alert))
            .buffer_unordered(concurrency);

        loop {
            let next = match deadline {
                Some(deadline) => match tokio::time::timeout_at(deadline, reports.next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        summary.timed_out = true;
                        warn!(run_id = %summary.run_id, "Price check hit its job timeout");
                        break;
                    }
                },
                None => reports.next().await,
            };

            let Some(report) = next else { break };
            sink.deliver(&report).await;
            summary.record(&report);
        }

        summary.finish();
        info!(
            run_id = %summary.run_id,
            found = summary.found,
            not_found = summary.not_found,
            target_met = summary.target_met,
            unchecked = summary.unchecked(),
            "Price check finished"
        );
        summary
    }

    async fn check(&self, alert: PriceAlert) -> PriceReport {
        if let Some(domain) = site_domain(&alert.url) {
            self.pacer.wait_turn(&domain).await;
        }
        let result = self.extractor.extract(&alert.url).await;
        PriceReport::from_result(&alert, &result)
    }
}

/// Reorders alerts round-robin across domains, keeping the input order
/// within each domain, so paced alerts for one site do not hold every
/// concurrency slot while other sites wait.
fn interleave_by_domain(alerts: Vec<PriceAlert>) -> Vec<PriceAlert> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut ranked: Vec<(usize, PriceAlert)> = alerts
        .into_iter()
        .map(|alert| {
            let rank = site_domain(&alert.url).map_or(0, |domain| {
                let count = seen.entry(domain).or_insert(0);
                *count += 1;
                *count - 1
            });
            (rank, alert)
        })
        .collect();
    ranked.sort_by_key(|(rank, _)| *rank);
    ranked.into_iter().map(|(_, alert)| alert).collect()
}
