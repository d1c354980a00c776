//! Error types for pricewatch.
//!
//! Only configuration and I/O problems reach callers as errors. Fetch
//! failures and strategy failures are folded into
//! [`ExtractionResult::NotFound`](crate::extractor::ExtractionResult) by the
//! orchestrator; the types here describe why.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// The main error type for pricewatch operations.
#[derive(Debug, Error)]
pub enum PricewatchError {
    /// A page could not be fetched.
    #[error("{0}")]
    Fetch(#[from] FetchError),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A price alert that cannot be checked.
    #[error("Invalid alert: {0}")]
    InvalidAlert(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for PricewatchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Coarse classification of a [`FetchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    /// Every attempt finished without a 200 response.
    Unreachable,
    /// The final attempt timed out.
    Timeout,
    /// The final attempt failed below HTTP.
    Transport,
    /// The final attempt returned a non-retryable status.
    HttpStatus,
    /// The URL could not be parsed.
    InvalidUrl,
}

/// Errors raised by [`Fetcher::fetch`](crate::fetch::Fetcher::fetch).
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// All attempts were used without a 200 response.
    #[error("Unreachable: {url} after {attempts} attempt(s) (last status: {last_status:?})")]
    Unreachable {
        /// The requested URL.
        url: String,
        /// Number of network round-trips made.
        attempts: usize,
        /// Status of the last response, if any response arrived.
        last_status: Option<u16>,
    },

    /// The final attempt timed out.
    #[error("Timed out fetching {url} after {timeout_seconds}s")]
    Timeout {
        /// The requested URL.
        url: String,
        /// Timeout of the final attempt.
        timeout_seconds: f64,
    },

    /// The final attempt failed with a connection or protocol error.
    #[error("Transport error fetching {url}: {message}")]
    Transport {
        /// The requested URL.
        url: String,
        /// Underlying error text.
        message: String,
    },

    /// The final attempt returned a status that is not retried.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The requested URL.
        url: String,
        /// The response status.
        status: u16,
    },

    /// The URL has no usable host.
    #[error("Invalid URL: {url}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
    },
}

impl FetchError {
    /// Creates an unreachable error.
    #[must_use]
    pub fn unreachable(url: impl Into<String>, attempts: usize, last_status: Option<u16>) -> Self {
        Self::Unreachable {
            url: url.into(),
            attempts,
            last_status,
        }
    }

    /// Creates an invalid URL error.
    #[must_use]
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Returns the coarse kind of this error.
    #[must_use]
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            Self::Unreachable { .. } => FetchErrorKind::Unreachable,
            Self::Timeout { .. } => FetchErrorKind::Timeout,
            Self::Transport { .. } => FetchErrorKind::Transport,
            Self::HttpStatus { .. } => FetchErrorKind::HttpStatus,
            Self::InvalidUrl { .. } => FetchErrorKind::InvalidUrl,
        }
    }

    /// Returns the URL the error refers to.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Unreachable { url, .. }
            | Self::Timeout { url, .. }
            | Self::Transport { url, .. }
            | Self::HttpStatus { url, .. }
            | Self::InvalidUrl { url } => url,
        }
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("kind".to_string(), serde_json::json!(self.kind()));
        map.insert("url".to_string(), serde_json::json!(self.url()));

        match self {
            Self::Unreachable { attempts, last_status, .. } => {
                map.insert("attempts".to_string(), serde_json::json!(attempts));
                map.insert("last_status".to_string(), serde_json::json!(last_status));
            }
            Self::Timeout { timeout_seconds, .. } => {
                map.insert("timeout_seconds".to_string(), serde_json::json!(timeout_seconds));
            }
            Self::HttpStatus { status, .. } => {
                map.insert("status".to_string(), serde_json::json!(status));
            }
            Self::Transport { .. } | Self::InvalidUrl { .. } => {}
        }

        map.insert("message".to_string(), serde_json::json!(self.to_string()));
        map
    }
}

/// Errors from a single request made by an
/// [`HttpTransport`](crate::fetch::HttpTransport).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request exceeded its timeout.
    #[error("request timed out")]
    Timeout,

    /// The connection could not be established.
    #[error("connection failed: {0}")]
    Connect(String),

    /// Any other client-side failure (body decoding, redirects, TLS).
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connect(err.to_string())
        } else {
            Self::Other(err.to_string())
        }
    }
}

/// Failures inside a single extraction strategy.
///
/// The orchestrator logs these and moves on to the next strategy.
#[derive(Debug, Error)]
pub enum StrategyError {
    /// Embedded data could not be decoded.
    #[error("Malformed data: {0}")]
    MalformedData(String),

    /// A CSS selector could not be applied.
    #[error("Selector error: {0}")]
    Selector(String),

    /// An auxiliary fetch failed.
    #[error("{0}")]
    Fetch(#[from] FetchError),
}

impl StrategyError {
    /// Creates a malformed data error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedData(message.into())
    }

    /// Creates a selector error.
    #[must_use]
    pub fn selector(message: impl Into<String>) -> Self {
        Self::Selector(message.into())
    }
}
