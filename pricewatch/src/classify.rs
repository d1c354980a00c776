//! Detection of block, maintenance and captcha pages.

use tracing::debug;

use crate::config::ClassifierConfig;
use crate::fetch::FetchedDocument;

/// Phrases that mark a page as a block, error or maintenance page.
pub const BLOCK_PHRASES: &[&str] = &[
    "site maintenance",
    "maintenance mode",
    "under maintenance",
    "temporarily unavailable",
    "service unavailable",
    "access denied",
    "forbidden",
    "blocked",
    "error 403",
    "error 404",
    "error 500",
    "something went wrong",
    "oops",
    "sorry",
    "please try again",
    "administrator",
    "captcha",
    "verify you are human",
    "bot detected",
    "automated traffic",
];

/// Tokens a real product page usually contains.
pub const ECOMMERCE_INDICATORS: &[&str] = &[
    "add to cart",
    "buy now",
    "price",
    "product",
    "₹",
    "rs.",
    "inr",
    "$",
    "discount",
    "offer",
];

/// Why a page was judged not to be real content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockReason {
    /// The title contains a block phrase.
    Title(&'static str),
    /// A short body contains a block phrase.
    ShortBody(&'static str),
    /// A short body has too few e-commerce indicators.
    Sparse {
        /// Indicators found.
        indicators: usize,
    },
}

/// Decides whether a fetched document is a genuine content page.
#[derive(Debug, Clone, Default)]
pub struct PageClassifier {
    config: ClassifierConfig,
}

impl PageClassifier {
    /// Creates a classifier with the given thresholds.
    #[must_use]
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Whether `document` is a block, error or maintenance page.
    #[must_use]
    pub fn is_blocked_or_error_page(&self, document: &FetchedDocument) -> bool {
        self.block_reason(document).is_some()
    }

    /// Explains why `document` is blocked, or `None` for a genuine page.
    #[must_use]
    pub fn block_reason(&self, document: &FetchedDocument) -> Option<BlockReason> {
        let title = document.title.as_deref().unwrap_or_default().to_lowercase();
        let body = document.body.to_lowercase();
        let body_len = document.body_len();

        if let Some(phrase) = find_phrase(&title) {
            debug!(phrase, "Block phrase in title");
            return Some(BlockReason::Title(phrase));
        }

        if body_len < self.config.short_page_threshold {
            if let Some(phrase) = find_phrase(&body) {
                debug!(phrase, body_len, "Block phrase in short body");
                return Some(BlockReason::ShortBody(phrase));
            }
        }

        if body_len < self.config.sparse_page_threshold {
            let indicators = ECOMMERCE_INDICATORS
                .iter()
                .filter(|token| body.contains(*token))
                .count();
            if indicators < self.config.min_ecommerce_indicators {
                debug!(indicators, body_len, "Too few e-commerce indicators");
                return Some(BlockReason::Sparse { indicators });
            }
        }

        None
    }
}

fn find_phrase(text: &str) -> Option<&'static str> {
    BLOCK_PHRASES.iter().copied().find(|phrase| text.contains(phrase))
}
