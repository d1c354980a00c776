//! Retailer-specific price selectors.

use scraper::Selector;
use std::sync::LazyLock;

use super::dom::compile_all;

/// Selectors for one retailer, most specific first.
#[derive(Debug)]
pub struct SiteSelectors {
    /// Domain key matched by substring against the page's site domain.
    pub domain: &'static str,
    /// Compiled selectors paired with their source text.
    pub selectors: Vec<(&'static str, Selector)>,
}

const RAW_TABLE: &[(&str, &[&str])] = &[
    (
        "amazon.com",
        &[
            ".a-price .a-offscreen",
            ".a-price-whole",
            "#priceblock_dealprice",
            "#priceblock_ourprice",
            ".a-price.a-text-price.a-size-medium.apexPriceToPay .a-offscreen",
            ".a-price-range .a-price .a-offscreen",
            "span.a-price-symbol + span.a-price-whole",
            ".a-section .a-price .a-offscreen",
        ],
    ),
    (
        "amazon.in",
        &[
            ".a-price .a-offscreen",
            ".a-price-whole",
            "#priceblock_dealprice",
            "#priceblock_ourprice",
            r#"span[class*="a-price-symbol"] + span[class*="a-price-whole"]"#,
            ".a-section .a-price .a-offscreen",
        ],
    ),
    (
        "flipkart.com",
        &[
            "._30jeq3._16Jk6d",
            "._30jeq3",
            "._16Jk6d",
            ".CEmiEU .Nx9bqj",
            "._1_WHN1",
            ".CEmiEU ._16Jk6d",
        ],
    ),
    (
        "myntra.com",
        &[
            "span.pdp-price strong",
            ".pdp-price strong",
            ".price-container .current-price",
            ".product-price .current-price",
            r#"span[class*="price-discounted"]"#,
            r#"span[class*="price-current"]"#,
            r#"div[class*="price-current"]"#,
            r#"[data-testid="price"]"#,
            r#"[class*="ProductPrice"]"#,
            ".price-info .current-price",
            ".selling-price",
            ".final-price",
            ".price",
            r#"[class*="price"]"#,
            r#"[id*="price"]"#,
            r#"span[title*="₹"]"#,
            r#"span[aria-label*="price"]"#,
            "div[data-price]",
        ],
    ),
    (
        "ajio.com",
        &[".prod-sp", ".price-wrapper .prod-sp", r#"span[class*="prod-sp"]"#],
    ),
    (
        "snapdeal.com",
        &[".payBlkBig", ".price .payBlkBig", r#"span[class*="payBlkBig"]"#],
    ),
    (
        "ebay.com",
        &[
            ".u-flL.condText",
            "#prcIsum",
            ".u-flL .condText .shrinkFont",
            r#"span[class*="conditionalText"]"#,
            ".price .currency-value",
        ],
    ),
    (
        "walmart.com",
        &[
            r#"[data-testid="price-current"]"#,
            ".price-characteristic",
            r#"span[itemprop="price"]"#,
            ".price .visuallyhidden",
        ],
    ),
    (
        "target.com",
        &[
            r#"[data-test="product-price"]"#,
            ".price",
            r#"span[class*="Price"]"#,
        ],
    ),
    (
        "bestbuy.com",
        &[".pricing-price__range", r#"span[class*="sr-only"]"#],
    ),
    (
        "nykaa.com",
        &[
            ".css-1d0jdb",
            ".product-price .css-1d0jdb",
            r#"span[class*="css-1d0jdb"]"#,
        ],
    ),
];

/// Compiled selector table, built on first use.
pub static SITE_SELECTORS: LazyLock<Vec<SiteSelectors>> = LazyLock::new(|| {
    RAW_TABLE
        .iter()
        .map(|&(domain, css)| SiteSelectors {
            domain,
            selectors: compile_all(css),
        })
        .collect()
});

/// Returns the selectors of the first table entry whose key occurs in
/// `domain`.
#[must_use]
pub fn selectors_for(domain: &str) -> Option<&'static SiteSelectors> {
    SITE_SELECTORS
        .iter()
        .find(|entry| domain.contains(entry.domain))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_every_selector_compiles() {
        for (domain, css) in RAW_TABLE {
            let entry = selectors_for(domain).unwrap();
            assert_eq!(entry.selectors.len(), css.len(), "{domain}");
        }
        assert_eq!(SITE_SELECTORS.len(), 11);
    }

    #[test]
    fn test_lookup_by_substring() {
        assert_eq!(selectors_for("amazon.in").unwrap().domain, "amazon.in");
        assert_eq!(selectors_for("shop.flipkart.com").unwrap().domain, "flipkart.com");
        assert!(selectors_for("shop.example").is_none());
    }
}
