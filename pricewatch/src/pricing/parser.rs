//! Locale-tolerant price text parsing.

use std::ops::RangeInclusive;

/// Values outside this range are never prices, whatever the band says.
pub const SANITY_RANGE: RangeInclusive<f64> = 0.01..=10_000_000.0;

/// Parses price-like text into a number.
///
/// Everything except digits, `.` and `,` is dropped. When both separators
/// occur, the one that occurs last is the decimal separator. A lone comma
/// followed by one or two digits is a decimal comma; any other comma groups
/// thousands.
///
/// ```
/// use pricewatch::pricing::parse_price;
///
/// assert_eq!(parse_price("₹1,234.56"), Some(1234.56));
/// assert_eq!(parse_price("1.234,56 €"), Some(1234.56));
/// assert_eq!(parse_price("12,34,567"), Some(1_234_567.0));
/// assert_eq!(parse_price("free"), None);
/// ```
#[must_use]
pub fn parse_price(text: &str) -> Option<f64> {
    let kept: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    // "Rs. 499" leaves a dangling "." in front of the digits.
    let kept = kept.trim_matches(|c| c == '.' || c == ',');
    if kept.is_empty() {
        return None;
    }

    let normalized = if kept.bytes().all(|b| b.is_ascii_digit()) && starts_with_decimal_point(text) {
        format!("0.{kept}")
    } else {
        normalize_separators(kept)
    };
    let value: f64 = normalized.parse().ok()?;

    SANITY_RANGE.contains(&value).then_some(value)
}

/// A separator right before the first digit is a decimal point unless it
/// ends a word such as "Rs.".
fn starts_with_decimal_point(text: &str) -> bool {
    let Some(first_digit) = text.find(|c: char| c.is_ascii_digit()) else {
        return false;
    };
    let mut before = text[..first_digit].chars().rev();
    matches!(before.next(), Some('.' | ',')) && !before.next().is_some_and(char::is_alphabetic)
}

fn normalize_separators(text: &str) -> String {
    match (text.rfind('.'), text.rfind(',')) {
        (Some(dot), Some(comma)) if dot > comma => text.replace(',', ""),
        (Some(_), Some(_)) => text.replace('.', "").replace(',', "."),
        (None, Some(comma)) => {
            let decimals = text.len() - comma - 1;
            if text.matches(',').count() == 1 && (1..=2).contains(&decimals) {
                text.replace(',', ".")
            } else {
                text.replace(',', "")
            }
        }
        _ => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_grouped_formats() {
        assert_eq!(parse_price("₹1,234.56"), Some(1234.56));
        assert_eq!(parse_price("1.234,56"), Some(1234.56));
        assert_eq!(parse_price("1,234"), Some(1234.0));
        assert_eq!(parse_price("$ 2,499.00"), Some(2499.0));
        assert_eq!(parse_price("1,234,567.89"), Some(1_234_567.89));
        assert_eq!(parse_price("1.234.567,89"), Some(1_234_567.89));
    }

    #[test]
    fn test_parse_comma_only() {
        assert_eq!(parse_price("12,5"), Some(12.5));
        assert_eq!(parse_price("12,50"), Some(12.5));
        assert_eq!(parse_price("12,345"), Some(12345.0));
        assert_eq!(parse_price("12,34,567"), Some(1_234_567.0));
        assert_eq!(parse_price("1,2,3"), Some(123.0));
    }

    #[test]
    fn test_parse_currency_prefix_with_dot() {
        assert_eq!(parse_price("Rs. 1,299"), Some(1299.0));
        assert_eq!(parse_price("Rs.499"), Some(499.0));
        assert_eq!(parse_price("INR 75.5"), Some(75.5));
    }

    #[test]
    fn test_parse_leading_decimal_point() {
        assert_eq!(parse_price("$.99"), Some(0.99));
        assert_eq!(parse_price(".5"), Some(0.5));
        assert_eq!(parse_price("Rs.99"), Some(99.0));
        assert_eq!(parse_price("Rs. 99"), Some(99.0));
        assert_eq!(parse_price("$.1,299"), Some(1299.0));
    }

    #[test]
    fn test_parse_rejects_non_numbers() {
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("Out of stock"), None);
        assert_eq!(parse_price("..."), None);
        assert_eq!(parse_price("1.2.3"), None);
    }

    #[test]
    fn test_parse_sanity_range() {
        assert_eq!(parse_price("0.01"), Some(0.01));
        assert_eq!(parse_price("0.00"), None);
        assert_eq!(parse_price("0.001"), None);
        assert_eq!(parse_price("10,000,000"), Some(10_000_000.0));
        assert_eq!(parse_price("10,000,001"), None);
        assert_eq!(parse_price("99999999999"), None);
    }
}
