//! Retrying page fetcher.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::identity::{IdentityPool, IdentityProfile};
use super::models::{site_domain, AttemptOutcome, FetchAttempt, FetchedDocument, HttpRequest};
use super::schedule::{is_transient_status, IdentityChoice, RetrySchedule};
use super::transport::HttpTransport;
use crate::config::FetchConfig;
use crate::errors::{FetchError, TransportError};

/// Fetches pages with escalating timeouts, identity rotation and bounded
/// retries.
///
/// One call to [`fetch`](Self::fetch) makes at most `max_attempts` network
/// round-trips.
#[derive(Clone)]
pub struct Fetcher {
    transport: Arc<dyn HttpTransport>,
    schedule: RetrySchedule,
    pool: IdentityPool,
}

impl std::fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetcher")
            .field("schedule", &self.schedule)
            .finish_non_exhaustive()
    }
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

impl Fetcher {
    /// Creates a fetcher over a transport.
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>, config: &FetchConfig) -> Self {
        Self {
            transport,
            schedule: RetrySchedule::from_config(config),
            pool: IdentityPool,
        }
    }

    /// The retry schedule in use.
    #[must_use]
    pub fn schedule(&self) -> &RetrySchedule {
        &self.schedule
    }

    /// Fetches `url`, retrying until a 200 arrives or the budget is spent.
    pub async fn fetch(&self, url: &str) -> Result<FetchedDocument, FetchError> {
        self.fetch_traced(url).await.0
    }

    /// Like [`fetch`](Self::fetch), also returning a record of every attempt.
    pub async fn fetch_traced(
        &self,
        url: &str,
    ) -> (Result<FetchedDocument, FetchError>, Vec<FetchAttempt>) {
        let mut attempts = Vec::with_capacity(self.schedule.max_attempts());

        let Some(domain) = site_domain(url) else {
            return (Err(FetchError::invalid_url(url)), attempts);
        };

        let max_attempts = self.schedule.max_attempts();
        let mut after_forbidden = false;
        let mut last_status = None;

        for attempt in 0..max_attempts {
            let plan = self.schedule.plan(attempt, after_forbidden);
            let is_last = attempt + 1 == max_attempts;
            after_forbidden = false;

            let delay = plan.pre_delay.sample(&mut rand::thread_rng());
            if !delay.is_zero() {
                debug!(url, attempt = attempt + 1, delay_ms = delay.as_millis() as u64, "Waiting before retry");
                pause(delay).await;
            }

            let identity = self.identity_for(plan.identity, &domain);
            let request = HttpRequest {
                url: url.to_string(),
                headers: identity.to_headers(),
                timeout: plan.timeout,
            };

            info!(
                url,
                attempt = attempt + 1,
                max_attempts,
                identity = %identity.name,
                timeout_s = plan.timeout.as_secs_f64(),
                "Fetching page"
            );

            let result = self.transport.get(&request).await;
            attempts.push(FetchAttempt {
                index: attempt,
                timeout_seconds: plan.timeout.as_secs_f64(),
                identity: identity.name.clone(),
                outcome: match &result {
                    Ok(r) if r.status == 200 => AttemptOutcome::Success,
                    Ok(r) => AttemptOutcome::Status(r.status),
                    Err(TransportError::Timeout) => AttemptOutcome::Timeout,
                    Err(e) => AttemptOutcome::Transport(e.to_string()),
                },
            });

            match result {
                Ok(response) if response.status == 200 => {
                    info!(url, attempt = attempt + 1, bytes = response.body.len(), "Fetched page");
                    return (Ok(FetchedDocument::from_response(url, response)), attempts);
                }
                Ok(response) => {
                    let status = response.status;
                    last_status = Some(status);

                    if status == 403 {
                        // A 403 on the basic retry itself falls back to rotation.
                        after_forbidden = plan.identity != IdentityChoice::Basic;
                        warn!(url, attempt = attempt + 1, basic_next = after_forbidden, "Access forbidden");
                    } else if is_transient_status(status) {
                        if !is_last {
                            let wait = self.schedule.backoff_for(attempt);
                            warn!(url, status, wait_s = wait.as_secs_f64(), "Transient status, backing off");
                            pause(wait).await;
                        }
                    } else {
                        warn!(url, status, attempt = attempt + 1, "Unexpected status");
                        if is_last {
                            return (Err(FetchError::HttpStatus { url: url.to_string(), status }), attempts);
                        }
                        pause(self.schedule.error_pause()).await;
                    }
                }
                Err(TransportError::Timeout) => {
                    warn!(url, attempt = attempt + 1, "Request timed out");
                    if is_last {
                        let err = FetchError::Timeout {
                            url: url.to_string(),
                            timeout_seconds: plan.timeout.as_secs_f64(),
                        };
                        return (Err(err), attempts);
                    }
                }
                Err(err) => {
                    warn!(url, attempt = attempt + 1, error = %err, "Request failed");
                    if is_last {
                        let err = FetchError::Transport {
                            url: url.to_string(),
                            message: err.to_string(),
                        };
                        return (Err(err), attempts);
                    }
                    pause(self.schedule.error_pause()).await;
                }
            }
        }

        error!(url, attempts = attempts.len(), ?last_status, "Failed to fetch page");
        let err = FetchError::unreachable(url, attempts.len(), last_status);
        (Err(err), attempts)
    }

    /// Sends exactly one request with a fixed identity. Any status other
    /// than 200 is an error.
    pub async fn fetch_once(
        &self,
        url: &str,
        identity: &IdentityProfile,
        timeout: Duration,
    ) -> Result<FetchedDocument, FetchError> {
        let request = HttpRequest {
            url: url.to_string(),
            headers: identity.to_headers(),
            timeout,
        };

        match self.transport.get(&request).await {
            Ok(response) if response.status == 200 => Ok(FetchedDocument::from_response(url, response)),
            Ok(response) => Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: response.status,
            }),
            Err(TransportError::Timeout) => Err(FetchError::Timeout {
                url: url.to_string(),
                timeout_seconds: timeout.as_secs_f64(),
            }),
            Err(err) => Err(FetchError::Transport {
                url: url.to_string(),
                message: err.to_string(),
            }),
        }
    }

    fn identity_for(&self, choice: IdentityChoice, domain: &str) -> IdentityProfile {
        match choice {
            IdentityChoice::Baseline => IdentityProfile::baseline(),
            IdentityChoice::Basic => IdentityProfile::basic(),
            IdentityChoice::Rotated => self.pool.rotate(&mut rand::thread_rng(), domain),
        }
    }
}
