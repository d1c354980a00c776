//! Mobile and AMP renderings of the same product.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

use super::aggressive_regex::AggressiveRegexStrategy;
use super::ExtractionStrategy;
use crate::classify::PageClassifier;
use crate::config::{ExtractionConfig, FetchConfig};
use crate::errors::{FetchError, StrategyError};
use crate::fetch::{FetchedDocument, Fetcher, IdentityProfile};
use crate::pricing::{PriceCandidate, StrategyKind};

/// Hosts with a separate mobile site, as (desktop, mobile).
const MOBILE_HOSTS: &[(&str, &str)] = &[
    ("www.myntra.com", "m.myntra.com"),
    ("www.amazon.in", "m.amazon.in"),
];

/// A URL worth trying when the main page yielded nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlternateUrl {
    /// `mobile` or `amp`.
    pub surface: &'static str,
    /// Rewritten URL.
    pub url: String,
}

/// Lists the mobile and AMP variants of `url`, in the order they are tried.
#[must_use]
pub fn alternate_urls(url: &str, domain: &str) -> Vec<AlternateUrl> {
    let mut out = Vec::new();

    if let Some((desktop, mobile)) = MOBILE_HOSTS
        .iter()
        .find(|(desktop, _)| domain.contains(desktop.trim_start_matches("www.")))
    {
        let rewritten = url.replace(desktop, mobile);
        if rewritten != url {
            out.push(AlternateUrl { surface: "mobile", url: rewritten });
        }
    }

    if url.contains("/buy") || url.contains("/p/") {
        let rewritten = url.replace("/buy", "/amp").replace("/p/", "/amp/");
        if rewritten != url {
            out.push(AlternateUrl { surface: "amp", url: rewritten });
        }
    }

    out
}

/// Fetches alternate renderings once each and re-runs the aggressive regex
/// scan on the first one that looks like real content.
#[derive(Debug, Clone)]
pub struct AlternateSurfaceStrategy {
    fetcher: Fetcher,
    classifier: PageClassifier,
    regex: AggressiveRegexStrategy,
    timeout: Duration,
    min_body_len: usize,
}

impl AlternateSurfaceStrategy {
    /// Creates the strategy.
    #[must_use]
    pub fn new(
        fetcher: Fetcher,
        classifier: PageClassifier,
        fetch: &FetchConfig,
        extraction: &ExtractionConfig,
    ) -> Self {
        Self {
            fetcher,
            classifier,
            regex: AggressiveRegexStrategy::new(extraction.band()),
            timeout: fetch.alternate_timeout(),
            min_body_len: extraction.alternate_min_body_len,
        }
    }

    fn accept(&self, alternate: &AlternateUrl, page: &FetchedDocument) -> Option<PriceCandidate> {
        if page.body_len() <= self.min_body_len {
            debug!(url = %alternate.url, body_len = page.body_len(), "Alternate page too short");
            return None;
        }
        if self.classifier.is_blocked_or_error_page(page) {
            debug!(url = %alternate.url, "Alternate page is blocked");
            return None;
        }

        let mut candidate = self.regex.best(&page.body)?;
        candidate.strategy = StrategyKind::AlternateSurface;
        info!(surface = alternate.surface, url = %alternate.url, price = candidate.value, "Price found on alternate surface");
        Some(candidate)
    }
}

#[async_trait]
impl ExtractionStrategy for AlternateSurfaceStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::AlternateSurface
    }

    async fn try_extract(
        &self,
        document: &FetchedDocument,
    ) -> Result<Option<PriceCandidate>, StrategyError> {
        let alternates = alternate_urls(&document.url, &document.domain);
        if alternates.is_empty() {
            return Ok(None);
        }

        let identity = IdentityProfile::mobile();
        let mut fetch_failures: Vec<FetchError> = Vec::new();

        for alternate in &alternates {
            debug!(surface = alternate.surface, url = %alternate.url, "Trying alternate surface");
            match self.fetcher.fetch_once(&alternate.url, &identity, self.timeout).await {
                Ok(page) => {
                    if let Some(candidate) = self.accept(alternate, &page) {
                        return Ok(Some(candidate));
                    }
                }
                Err(err) => {
                    debug!(surface = alternate.surface, error = %err, "Alternate surface failed");
                    fetch_failures.push(err);
                }
            }
        }

        if fetch_failures.len() == alternates.len() {
            if let Some(last) = fetch_failures.pop() {
                return Err(StrategyError::Fetch(last));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{maintenance_page, ProductPage, RoutedTransport};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    const MYNTRA: &str = "https://www.myntra.com/kurtas/brand/cotton-kurta/12345/buy";

    fn strategy(transport: RoutedTransport) -> AlternateSurfaceStrategy {
        let config = FetchConfig::default().without_delays();
        AlternateSurfaceStrategy::new(
            Fetcher::new(Arc::new(transport), &config),
            PageClassifier::default(),
            &config,
            &ExtractionConfig::default(),
        )
    }

    fn product_page(price: &str) -> String {
        ProductPage::new("Cotton Kurta")
            .body(format!("<button>Add to cart</button><div>{price}</div>"))
            .padded_to(3000)
            .build()
    }

    #[test]
    fn test_alternate_urls() {
        assert_eq!(
            alternate_urls(MYNTRA, "myntra.com"),
            vec![
                AlternateUrl {
                    surface: "mobile",
                    url: "https://m.myntra.com/kurtas/brand/cotton-kurta/12345/buy".into(),
                },
                AlternateUrl {
                    surface: "amp",
                    url: "https://www.myntra.com/kurtas/brand/cotton-kurta/12345/amp".into(),
                },
            ]
        );

        let flipkart = alternate_urls("https://www.flipkart.com/kettle/p/itm42", "flipkart.com");
        assert_eq!(flipkart.len(), 1);
        assert_eq!(flipkart[0].url, "https://www.flipkart.com/kettle/amp/itm42");

        assert!(alternate_urls("https://shop.example/item?id=1", "shop.example").is_empty());
    }

    #[tokio::test]
    async fn test_mobile_surface_used_with_mobile_identity() {
        let transport = RoutedTransport::new().route(
            "https://m.myntra.com/kurtas/brand/cotton-kurta/12345/buy",
            200,
            product_page("₹ 1,149"),
        );
        let requests = transport.requests();
        let document = FetchedDocument::new(MYNTRA, 200, "<html></html>");

        let candidate = strategy(transport).try_extract(&document).await.unwrap().unwrap();
        assert_eq!(candidate.value, 1149.0);
        assert_eq!(candidate.strategy, StrategyKind::AlternateSurface);

        let sent = requests.lock();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].header("User-Agent").unwrap().contains("iPhone"));
        assert_eq!(sent[0].timeout, Duration::from_secs(15));
    }

    #[tokio::test]
    async fn test_falls_back_to_amp_when_mobile_is_blocked() {
        let transport = RoutedTransport::new()
            .route(
                "https://m.myntra.com/kurtas/brand/cotton-kurta/12345/buy",
                200,
                ProductPage::new("Access Denied").padded_to(3000).build(),
            )
            .route(
                "https://www.myntra.com/kurtas/brand/cotton-kurta/12345/amp",
                200,
                product_page("Rs. 899"),
            );
        let document = FetchedDocument::new(MYNTRA, 200, "<html></html>");

        let candidate = strategy(transport).try_extract(&document).await.unwrap().unwrap();
        assert_eq!(candidate.value, 899.0);
    }

    #[tokio::test]
    async fn test_short_or_blocked_pages_yield_nothing() {
        let transport = RoutedTransport::new()
            .route("https://m.myntra.com/kurtas/brand/cotton-kurta/12345/buy", 200, maintenance_page())
            .route(
                "https://www.myntra.com/kurtas/brand/cotton-kurta/12345/amp",
                200,
                "<html><body>₹999</body></html>",
            );
        let document = FetchedDocument::new(MYNTRA, 200, "<html></html>");

        assert_eq!(strategy(transport).try_extract(&document).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_all_fetches_failing_is_an_error() {
        let document = FetchedDocument::new(MYNTRA, 200, "<html></html>");
        let result = strategy(RoutedTransport::new()).try_extract(&document).await;
        assert!(matches!(result, Err(StrategyError::Fetch(FetchError::HttpStatus { status: 404, .. }))));
    }

    #[tokio::test]
    async fn test_no_alternates_makes_no_requests() {
        let transport = RoutedTransport::new();
        let requests = transport.requests();
        let document = FetchedDocument::new("https://shop.example/item?id=1", 200, "<html></html>");

        assert_eq!(strategy(transport).try_extract(&document).await.unwrap(), None);
        assert!(requests.lock().is_empty());
    }
}
