//! Retry schedule: attempt index to timeout, identity and delays.
//!
//! Everything here is a pure function of the attempt index and the previous
//! outcome, so the fetch loop only executes plans.

use rand::Rng;
use std::time::Duration;

use crate::config::FetchConfig;

/// Which identity an attempt presents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityChoice {
    /// The realistic browser profile.
    Baseline,
    /// A profile drawn from the rotation pool, with a same-site `Referer`.
    Rotated,
    /// User agent only.
    Basic,
}

/// Inclusive range for a randomized delay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayRange {
    /// Shortest delay.
    pub min: Duration,
    /// Longest delay.
    pub max: Duration,
}

impl DelayRange {
    /// No delay.
    pub const NONE: Self = Self {
        min: Duration::ZERO,
        max: Duration::ZERO,
    };

    /// Whether the range is empty.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.max.is_zero()
    }

    /// Draws a delay from the range.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }
}

/// Parameters for one attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttemptPlan {
    /// Zero-based attempt index.
    pub index: usize,
    /// Request timeout.
    pub timeout: Duration,
    /// Identity to present.
    pub identity: IdentityChoice,
    /// Delay to wait before sending.
    pub pre_delay: DelayRange,
}

/// Derives attempt plans and waits from a [`FetchConfig`].
#[derive(Debug, Clone)]
pub struct RetrySchedule {
    max_attempts: usize,
    timeouts: Vec<Duration>,
    ceiling: Duration,
    retry_delay: DelayRange,
    backoff_unit: Duration,
    error_pause: Duration,
}

fn secs(value: f64) -> Duration {
    Duration::from_secs_f64(value.max(0.0))
}

impl RetrySchedule {
    /// Builds the schedule for a configuration.
    #[must_use]
    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            timeouts: config.timeout_schedule_seconds.iter().copied().map(secs).collect(),
            ceiling: secs(config.timeout_ceiling_seconds),
            retry_delay: DelayRange {
                min: secs(config.retry_delay_min_seconds),
                max: secs(config.retry_delay_max_seconds),
            },
            backoff_unit: secs(config.backoff_unit_seconds),
            error_pause: secs(config.error_pause_seconds),
        }
    }

    /// Network round-trips allowed per fetch.
    #[must_use]
    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Timeout for an attempt; the ceiling applies past the schedule.
    #[must_use]
    pub fn timeout_for(&self, attempt: usize) -> Duration {
        self.timeouts.get(attempt).copied().unwrap_or(self.ceiling)
    }

    /// Plans attempt `attempt`.
    ///
    /// `after_forbidden` is true when the previous attempt got a 403: the
    /// retry then goes out at once with the basic identity.
    #[must_use]
    pub fn plan(&self, attempt: usize, after_forbidden: bool) -> AttemptPlan {
        let (identity, pre_delay) = match (attempt, after_forbidden) {
            (0, _) => (IdentityChoice::Baseline, DelayRange::NONE),
            (_, true) => (IdentityChoice::Basic, DelayRange::NONE),
            (_, false) => (IdentityChoice::Rotated, self.retry_delay),
        };

        AttemptPlan {
            index: attempt,
            timeout: self.timeout_for(attempt),
            identity,
            pre_delay,
        }
    }

    /// Wait after a 429/502/503/504 on `attempt`: `(attempt + 1) * unit`.
    #[must_use]
    pub fn backoff_for(&self, attempt: usize) -> Duration {
        let factor = u32::try_from(attempt + 1).unwrap_or(u32::MAX);
        self.backoff_unit.saturating_mul(factor)
    }

    /// Pause after a connection error or hard status failure.
    #[must_use]
    pub fn error_pause(&self) -> Duration {
        self.error_pause
    }

    /// Upper bound on the wall-clock time of one fetch.
    #[must_use]
    pub fn worst_case_duration(&self) -> Duration {
        (0..self.max_attempts).fold(Duration::ZERO, |total, attempt| {
            let waits = self.backoff_for(attempt).max(self.error_pause);
            let delay = if attempt == 0 { Duration::ZERO } else { self.retry_delay.max };
            total + delay + self.timeout_for(attempt) + waits
        })
    }
}

/// Whether a status is treated as transient.
#[must_use]
pub fn is_transient_status(status: u16) -> bool {
    matches!(status, 429 | 502 | 503 | 504)
}
