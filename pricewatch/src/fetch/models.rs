//! Request, response and document types for the fetch layer.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use std::time::Duration;

/// A single GET request handed to an [`HttpTransport`](super::HttpTransport).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Target URL.
    pub url: String,
    /// Headers to send, in order.
    pub headers: Vec<(String, String)>,
    /// Request timeout.
    pub timeout: Duration,
}

impl HttpRequest {
    /// Returns the value of a header, matched case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// What an [`HttpTransport`](super::HttpTransport) returns for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// URL after redirects.
    pub final_url: String,
    /// Decoded body text.
    pub body: String,
}

impl HttpResponse {
    /// Creates a response whose final URL is unknown.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            final_url: String::new(),
            body: body.into(),
        }
    }
}

/// Outcome of one network round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// A 200 response.
    Success,
    /// Any other status.
    Status(u16),
    /// The request timed out.
    Timeout,
    /// The request failed below HTTP.
    Transport(String),
}

/// Record of one attempt inside a single fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchAttempt {
    /// Zero-based attempt index.
    pub index: usize,
    /// Timeout used for this attempt.
    pub timeout_seconds: f64,
    /// Name of the identity profile sent.
    pub identity: String,
    /// What happened.
    pub outcome: AttemptOutcome,
}

/// A successfully fetched page.
///
/// Built once per successful attempt and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedDocument {
    /// The URL that was requested.
    pub url: String,
    /// The URL after redirects.
    pub final_url: String,
    /// Final HTTP status code.
    pub status: u16,
    /// Body text.
    pub body: String,
    /// Site domain with `www.`, `m.` and `mobile.` removed.
    pub domain: String,
    /// Contents of the `<title>` element, if any.
    pub title: Option<String>,
}

static TITLE_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").ok());

impl FetchedDocument {
    /// Creates a document, deriving its domain and title.
    #[must_use]
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        let url = url.into();
        let body = body.into();
        Self {
            domain: site_domain(&url).unwrap_or_else(|| "unknown".to_string()),
            title: extract_title(&body),
            final_url: url.clone(),
            url,
            status,
            body,
        }
    }

    /// Creates a document from a transport response.
    #[must_use]
    pub fn from_response(url: &str, response: HttpResponse) -> Self {
        let final_url = if response.final_url.is_empty() {
            url.to_string()
        } else {
            response.final_url
        };
        Self {
            final_url,
            ..Self::new(url, response.status, response.body)
        }
    }

    /// Body length in characters.
    #[must_use]
    pub fn body_len(&self) -> usize {
        self.body.chars().count()
    }
}

/// Extracts the lower-cased host of a URL.
#[must_use]
pub fn extract_host(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    parsed.host_str().map(str::to_ascii_lowercase)
}

/// Extracts the host of a URL with one `www.`, `m.` or `mobile.` prefix removed.
#[must_use]
pub fn site_domain(url: &str) -> Option<String> {
    let host = extract_host(url)?;
    let stripped = ["www.", "m.", "mobile."]
        .iter()
        .find_map(|prefix| host.strip_prefix(prefix))
        .unwrap_or(&host);
    Some(stripped.to_string())
}

fn extract_title(body: &str) -> Option<String> {
    let re = TITLE_RE.as_ref()?;
    let caps = re.captures(body)?;
    let title = caps.get(1)?.as_str().split_whitespace().collect::<Vec<_>>().join(" ");
    (!title.is_empty()).then_some(title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_domain_strips_prefixes() {
        assert_eq!(site_domain("https://www.amazon.in/dp/B0"), Some("amazon.in".to_string()));
        assert_eq!(site_domain("https://m.myntra.com/x"), Some("myntra.com".to_string()));
        assert_eq!(site_domain("http://mobile.shop.example"), Some("shop.example".to_string()));
        assert_eq!(site_domain("https://WWW.Flipkart.com/p/1"), Some("flipkart.com".to_string()));
        assert_eq!(site_domain("not a url"), None);
    }

    #[test]
    fn test_document_title() {
        let doc = FetchedDocument::new(
            "https://www.shop.example/p/1",
            200,
            "<html><head><TITLE>\n  Blue  Kettle </TITLE></head></html>",
        );
        assert_eq!(doc.title.as_deref(), Some("Blue Kettle"));
        assert_eq!(doc.domain, "shop.example");
        assert_eq!(doc.final_url, doc.url);

        let doc = FetchedDocument::new("https://shop.example", 200, "<p>no head</p>");
        assert!(doc.title.is_none());
    }

    #[test]
    fn test_from_response_keeps_final_url() {
        let response = HttpResponse {
            status: 200,
            final_url: "https://shop.example/p/1?ref=x".to_string(),
            body: String::new(),
        };
        let doc = FetchedDocument::from_response("https://shop.example/p/1", response);
        assert_eq!(doc.url, "https://shop.example/p/1");
        assert_eq!(doc.final_url, "https://shop.example/p/1?ref=x");
    }

    #[test]
    fn test_request_header_lookup() {
        let req = HttpRequest {
            url: "https://shop.example".to_string(),
            headers: vec![("User-Agent".to_string(), "ua".to_string())],
            timeout: Duration::from_secs(1),
        };
        assert_eq!(req.header("user-agent"), Some("ua"));
        assert_eq!(req.header("Referer"), None);
    }
}
