//! JSON-LD product markup.

use async_trait::async_trait;
use scraper::Html;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::debug;

use super::dom::parse_selector;
use super::ExtractionStrategy;
use crate::errors::StrategyError;
use crate::fetch::FetchedDocument;
use crate::pricing::{parse_price, PriceCandidate, StrategyKind};

/// Key paths tried in order within each JSON-LD object.
pub const PRICE_PATHS: &[&[&str]] = &[
    &["offers", "price"],
    &["offers", "lowPrice"],
    &["offers", "highPrice"],
    &["price"],
    &["priceRange"],
];

static LD_JSON: LazyLock<Option<scraper::Selector>> =
    LazyLock::new(|| parse_selector(r#"script[type="application/ld+json"]"#).ok());

/// Reads prices from `<script type="application/ld+json">` blocks.
#[derive(Debug, Clone, Default)]
pub struct StructuredDataStrategy;

impl StructuredDataStrategy {
    /// Creates the strategy.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn scan(&self, body: &str) -> Result<Option<PriceCandidate>, StrategyError> {
        let Some(selector) = LD_JSON.as_ref() else {
            return Err(StrategyError::selector("application/ld+json"));
        };

        let html = Html::parse_document(body);
        let mut malformed = 0usize;

        for script in html.select(selector) {
            let raw: String = script.text().collect();
            if raw.trim().is_empty() {
                continue;
            }

            let data: Value = match serde_json::from_str(&raw) {
                Ok(data) => data,
                Err(err) => {
                    debug!(error = %err, "Skipping malformed JSON-LD block");
                    malformed += 1;
                    continue;
                }
            };

            if let Some(candidate) = price_from_object(&data) {
                return Ok(Some(candidate));
            }
        }

        if malformed > 0 {
            return Err(StrategyError::malformed(format!(
                "{malformed} JSON-LD block(s) could not be parsed"
            )));
        }
        Ok(None)
    }
}

fn price_from_object(data: &Value) -> Option<PriceCandidate> {
    let root = match data {
        Value::Array(items) => items.first()?,
        other => other,
    };

    PRICE_PATHS.iter().find_map(|path| {
        let leaf = lookup(root, path)?;
        let text = match leaf {
            Value::Number(n) => n.to_string(),
            Value::String(s) => s.clone(),
            _ => return None,
        };
        let value = parse_price(&text)?;
        Some(
            PriceCandidate::new(value, StrategyKind::StructuredData, text)
                .with_source_key(path.join("."))
                .structured(),
        )
    })
}

/// Follows `path` through nested objects. Arrays met on the way descend into
/// their first element.
fn lookup<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(root, |current, key| {
        let current = match current {
            Value::Array(items) => items.first()?,
            other => other,
        };
        current.get(*key)
    })
}

#[async_trait]
impl ExtractionStrategy for StructuredDataStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::StructuredData
    }

    async fn try_extract(
        &self,
        document: &FetchedDocument,
    ) -> Result<Option<PriceCandidate>, StrategyError> {
        self.scan(&document.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ProductPage;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn extract(html: &str) -> Result<Option<PriceCandidate>, StrategyError> {
        StructuredDataStrategy::new().scan(html)
    }

    #[test]
    fn test_offers_price_string() {
        let html = ProductPage::new("Kettle")
            .json_ld(&json!({"@type": "Product", "offers": {"price": "999.00"}}))
            .build();

        let candidate = extract(&html).unwrap().unwrap();
        assert_eq!(candidate.value, 999.0);
        assert_eq!(candidate.source_key.as_deref(), Some("offers.price"));
        assert!(candidate.structured);
    }

    #[test]
    fn test_offers_array_and_numeric_leaf() {
        let html = ProductPage::new("Kettle")
            .json_ld(&json!([{"@type": "Product", "offers": [{"price": 1499}, {"price": 10}]}]))
            .build();

        assert_eq!(extract(&html).unwrap().unwrap().value, 1499.0);
    }

    #[test]
    fn test_path_order() {
        let html = ProductPage::new("Kettle")
            .json_ld(&json!({"price": "50", "offers": {"lowPrice": "40", "highPrice": "60"}}))
            .build();

        let candidate = extract(&html).unwrap().unwrap();
        assert_eq!(candidate.value, 40.0);
        assert_eq!(candidate.source_key.as_deref(), Some("offers.lowPrice"));
    }

    #[test]
    fn test_later_block_used_when_first_has_no_price() {
        let html = ProductPage::new("Kettle")
            .json_ld(&json!({"@type": "BreadcrumbList"}))
            .json_ld(&json!({"@type": "Product", "priceRange": "₹2,499"}))
            .build();

        assert_eq!(extract(&html).unwrap().unwrap().value, 2499.0);
    }

    #[test]
    fn test_malformed_block_is_an_error_only_without_a_price() {
        let broken = ProductPage::new("Kettle")
            .body(r#"<script type="application/ld+json">{"offers": </script>"#)
            .build();
        assert!(matches!(extract(&broken), Err(StrategyError::MalformedData(_))));

        let recovered = ProductPage::new("Kettle")
            .body(r#"<script type="application/ld+json">{"offers": </script>"#)
            .json_ld(&json!({"offers": {"price": 75}}))
            .build();
        assert_eq!(extract(&recovered).unwrap().unwrap().value, 75.0);
    }

    #[test]
    fn test_no_json_ld() {
        let html = ProductPage::new("Kettle").body("<p>₹999</p>").build();
        assert_eq!(extract(&html).unwrap(), None);
    }
}
