//! # Pricewatch
//!
//! Adaptive price extraction for e-commerce product pages.
//!
//! Given a product URL, pricewatch fetches the page with retries and rotating
//! browser identities, rejects block and maintenance pages, and then walks an
//! ordered chain of extraction strategies until one yields a plausible price:
//!
//! - **Structured data**: JSON-LD product markup
//! - **Site-specific selectors**: known retailer layouts
//! - **Main content**: currency amounts inside the product area
//! - **Context-aware selectors**: weighted, structure-scored matches
//! - **Aggressive regex**: prioritized patterns over the raw page
//! - **Alternate surfaces**: mobile and AMP renderings
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pricewatch::prelude::*;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let extractor = PriceExtractor::with_reqwest(PricewatchConfig::default())?;
//!
//! match extractor.extract("https://www.amazon.in/dp/B0EXAMPLE").await {
//!     ExtractionResult::Found { price, strategy } => println!("{price} via {strategy}"),
//!     ExtractionResult::NotFound(reason) => println!("no price: {reason}"),
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod batch;
pub mod classify;
pub mod config;
pub mod errors;
pub mod extractor;
pub mod fetch;
pub mod pricing;
pub mod strategies;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::batch::{
        BatchRunner, BatchSummary, CollectingPriceSink, LoggingPriceSink, PriceAlert,
        PriceReport, PriceSink,
    };
    pub use crate::classify::PageClassifier;
    pub use crate::config::{
        BatchConfig, ClassifierConfig, ExtractionConfig, FetchConfig, PricewatchConfig,
    };
    pub use crate::errors::{FetchError, PricewatchError, StrategyError, TransportError};
    pub use crate::extractor::{ExtractionResult, NotFoundReason, PriceExtractor};
    pub use crate::fetch::{FetchedDocument, Fetcher, HttpTransport, ReqwestTransport};
    pub use crate::pricing::{parse_price, select_price, PriceCandidate, StrategyKind};
    pub use crate::strategies::ExtractionStrategy;
}
