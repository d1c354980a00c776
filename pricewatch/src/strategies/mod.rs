//! Price extraction strategies.
//!
//! Strategies run in a fixed order, most trustworthy first:
//! - [`StructuredDataStrategy`]: JSON-LD product markup
//! - [`SiteSpecificStrategy`]: known retailer selectors
//! - [`MainContentStrategy`]: currency amounts inside the product area
//! - [`ContextAwareStrategy`]: weighted generic selectors
//! - [`AggressiveRegexStrategy`]: prioritized patterns over the raw page
//! - [`AlternateSurfaceStrategy`]: mobile and AMP renderings

mod aggressive_regex;
mod alternate_surface;
mod context_aware;
mod dom;
mod main_content;
mod site_specific;
mod site_table;
mod structured;

use async_trait::async_trait;
use std::fmt::Debug;

use crate::classify::PageClassifier;
use crate::config::PricewatchConfig;
use crate::errors::StrategyError;
use crate::fetch::{FetchedDocument, Fetcher};
use crate::pricing::{PriceCandidate, StrategyKind};

pub use aggressive_regex::{AggressiveRegexStrategy, PricePattern, PRICE_PATTERNS};
pub use alternate_surface::{alternate_urls, AlternateSurfaceStrategy, AlternateUrl};
pub use context_aware::ContextAwareStrategy;
pub use main_content::MainContentStrategy;
pub use site_specific::SiteSpecificStrategy;
pub use site_table::{selectors_for, SiteSelectors, SITE_SELECTORS};
pub use structured::{StructuredDataStrategy, PRICE_PATHS};

/// One way of finding a price in a fetched page.
///
/// Implementations must not panic on malformed input. Returning an error is
/// equivalent to returning `Ok(None)` for the caller; the error is only
/// logged.
#[async_trait]
pub trait ExtractionStrategy: Send + Sync + Debug {
    /// Which strategy this is.
    fn kind(&self) -> StrategyKind;

    /// Looks for a price in `document`.
    async fn try_extract(
        &self,
        document: &FetchedDocument,
    ) -> Result<Option<PriceCandidate>, StrategyError>;
}

/// Builds the standard six-strategy chain in priority order.
#[must_use]
pub fn default_chain(fetcher: Fetcher, config: &PricewatchConfig) -> Vec<Box<dyn ExtractionStrategy>> {
    let band = config.extraction.band();
    vec![
        Box::new(StructuredDataStrategy::new()),
        Box::new(SiteSpecificStrategy::new()),
        Box::new(MainContentStrategy::new(band)),
        Box::new(ContextAwareStrategy::new(config.extraction.clone())),
        Box::new(AggressiveRegexStrategy::new(band)),
        Box::new(AlternateSurfaceStrategy::new(
            fetcher,
            PageClassifier::new(config.classifier.clone()),
            &config.fetch,
            &config.extraction,
        )),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RoutedTransport;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    #[test]
    fn test_default_chain_order() {
        let config = PricewatchConfig::default();
        let fetcher = Fetcher::new(Arc::new(RoutedTransport::new()), &config.fetch);

        let kinds: Vec<StrategyKind> = default_chain(fetcher, &config).iter().map(|s| s.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                StrategyKind::StructuredData,
                StrategyKind::SiteSpecific,
                StrategyKind::MainContent,
                StrategyKind::ContextAware,
                StrategyKind::AggressiveRegex,
                StrategyKind::AlternateSurface,
            ]
        );
        assert!(kinds.windows(2).all(|w| w[0] < w[1]));
    }
}
