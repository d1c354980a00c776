//! HTML fixtures for extraction tests.

/// Builds synthetic product pages.
#[derive(Debug, Clone, Default)]
pub struct ProductPage {
    title: String,
    head: Vec<String>,
    body: Vec<String>,
    min_len: usize,
}

impl ProductPage {
    /// Creates a page with the given title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Adds a JSON-LD block to the head.
    #[must_use]
    pub fn json_ld(mut self, json: &serde_json::Value) -> Self {
        self.head.push(format!(
            r#"<script type="application/ld+json">{json}</script>"#
        ));
        self
    }

    /// Appends raw HTML to the body.
    #[must_use]
    pub fn body(mut self, html: impl Into<String>) -> Self {
        self.body.push(html.into());
        self
    }

    /// Pads the page with neutral filler until it is at least `len` chars.
    #[must_use]
    pub fn padded_to(mut self, len: usize) -> Self {
        self.min_len = len;
        self
    }

    /// Renders the page.
    #[must_use]
    pub fn build(&self) -> String {
        let mut html = format!(
            "<!DOCTYPE html><html><head><title>{}</title>{}</head><body>{}",
            self.title,
            self.head.join(""),
            self.body.join("\n"),
        );

        let footer = "</body></html>";
        let filler = "<p>Lorem ipsum dolor sit amet consectetur adipiscing elit</p>\n";
        while html.chars().count() + footer.len() < self.min_len {
            html.push_str(filler);
        }
        html.push_str(footer);
        html
    }
}

/// A short maintenance page.
#[must_use]
pub fn maintenance_page() -> String {
    "<html><head><title>Site Maintenance</title></head>\
     <body><h1>We'll be back soon!</h1>\
     <p>Sorry for the inconvenience. Our administrator is performing scheduled work.</p>\
     </body></html>"
        .to_string()
}
