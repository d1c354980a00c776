//! Page retrieval.
//!
//! This module provides:
//! - The [`HttpTransport`] seam and its reqwest implementation
//! - Browser identity profiles and the rotation pool
//! - The pure retry schedule
//! - The retrying [`Fetcher`]

mod fetcher;
mod identity;
mod models;
mod schedule;
mod transport;

pub use fetcher::Fetcher;
pub use identity::{IdentityPool, IdentityProfile};
pub use models::{
    extract_host, site_domain, AttemptOutcome, FetchAttempt, FetchedDocument, HttpRequest,
    HttpResponse,
};
pub use schedule::{is_transient_status, AttemptPlan, DelayRange, IdentityChoice, RetrySchedule};
pub use transport::{HttpTransport, ReqwestTransport};

#[cfg(test)]
pub(crate) use transport::MockHttpTransport;
