//! Small helpers over `scraper` shared by the DOM strategies.
//!
//! `scraper::Html` is not `Send`, so documents are parsed and dropped inside
//! synchronous helpers and never held across an await.

use scraper::{ElementRef, Selector};
use tracing::warn;

use crate::errors::StrategyError;

/// Parses a CSS selector.
pub fn parse_selector(css: &str) -> Result<Selector, StrategyError> {
    Selector::parse(css).map_err(|e| StrategyError::selector(format!("{css}: {e:?}")))
}

/// Compiles a selector list, dropping entries `scraper` cannot parse.
pub fn compile_all(css: &[&'static str]) -> Vec<(&'static str, Selector)> {
    css.iter()
        .filter_map(|raw| match parse_selector(raw) {
            Ok(selector) => Some((*raw, selector)),
            Err(err) => {
                warn!(selector = raw, error = %err, "Skipping unsupported selector");
                None
            }
        })
        .collect()
}

/// Text of an element with each text node trimmed and the pieces joined
/// without separators.
pub fn element_text(element: &ElementRef<'_>) -> String {
    element.text().map(str::trim).collect()
}

/// Text of an element with the trimmed pieces joined by single spaces.
pub fn spaced_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether any ancestor element has one of the given tag names.
pub fn has_ancestor(element: &ElementRef<'_>, names: &[&str]) -> bool {
    element
        .ancestors()
        .filter_map(|node| node.value().as_element())
        .any(|ancestor| names.contains(&ancestor.name()))
}
