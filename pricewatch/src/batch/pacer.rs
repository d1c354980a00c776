//! Minimum spacing between requests to the same site.

use dashmap::DashMap;
use std::time::{Duration, Instant};
use tracing::debug;

/// Hands out start slots per domain so that two extractions against one site
/// begin at least `spacing` apart.
#[derive(Debug)]
pub struct DomainPacer {
    spacing: Duration,
    next_slot: DashMap<String, Instant>,
}

impl DomainPacer {
    /// Creates a pacer.
    #[must_use]
    pub fn new(spacing: Duration) -> Self {
        Self {
            spacing,
            next_slot: DashMap::new(),
        }
    }

    /// The configured spacing.
    #[must_use]
    pub fn spacing(&self) -> Duration {
        self.spacing
    }

    /// Claims the next slot for `domain` and returns how long to wait for it.
    pub fn reserve(&self, domain: &str) -> Duration {
        let now = Instant::now();
        let mut slot = self.next_slot.entry(domain.to_string()).or_insert(now);
        let start = (*slot).max(now);
        *slot = start + self.spacing;
        start - now
    }

    /// Waits until `domain` may be contacted again.
    pub async fn wait_turn(&self, domain: &str) {
        let wait = self.reserve(domain);
        if !wait.is_zero() {
            debug!(domain, wait_ms = wait.as_millis() as u64, "Pacing request to domain");
            tokio::time::sleep(wait).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserve_spaces_same_domain() {
        let spacing = Duration::from_secs(5);
        let pacer = DomainPacer::new(spacing);

        assert_eq!(pacer.reserve("shop.example"), Duration::ZERO);

        let second = pacer.reserve("shop.example");
        assert!(second <= spacing);
        assert!(second > spacing - Duration::from_millis(500));

        let third = pacer.reserve("shop.example");
        assert!(third > spacing * 2 - Duration::from_millis(500));
    }

    #[test]
    fn test_domains_are_independent() {
        let pacer = DomainPacer::new(Duration::from_secs(5));
        pacer.reserve("a.example");
        assert_eq!(pacer.reserve("b.example"), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_wait_turn_with_zero_spacing() {
        let pacer = DomainPacer::new(Duration::ZERO);
        let started = Instant::now();
        for _ in 0..3 {
            pacer.wait_turn("shop.example").await;
        }
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
