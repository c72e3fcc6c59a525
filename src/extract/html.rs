//! Markup extraction strategy
//!
//! # Collected Content
//!
//! | Selector | Field |
//! |----------|-------|
//! | `a[href]` | outbound links (scope filtered) |
//! | `p` | `paragraphs` |
//! | `h1, h2, h3` | `headers` |
//! | `div` | `block_texts` |
//! | `span` | `inline_texts` |
//!
//! Element text is the concatenation of all descendant text, trimmed.
//! Nesting is not preserved: a `div` inside a `div` contributes to both.

use crate::extract::{ExtractContext, Extractable, Extraction, ExtractionRecord, TextBag};
use crate::url::NormalizedUrl;
use scraper::{Html, Selector};
use std::collections::HashSet;

pub struct HtmlExtractor<'a> {
    url: &'a NormalizedUrl,
    body: &'a str,
}

impl<'a> HtmlExtractor<'a> {
    pub fn new(url: &'a NormalizedUrl, body: &'a str) -> Self {
        Self { url, body }
    }
}

impl Extractable for HtmlExtractor<'_> {
    fn extract(&self, ctx: &ExtractContext<'_>) -> Extraction {
        let document = Html::parse_document(self.body);

        let links = extract_links(&document, ctx);

        let record = ExtractionRecord {
            source_url: self.url.clone(),
            headers: collect_texts(&document, "h1, h2, h3").into_vec(),
            paragraphs: collect_texts(&document, "p").into_vec(),
            block_texts: collect_texts(&document, "div").into_vec(),
            inline_texts: collect_texts(&document, "span").into_vec(),
            structured_payload: Vec::new(),
        };

        tracing::debug!(
            "Extracted {} headers, {} paragraphs, {} links from {}",
            record.headers.len(),
            record.paragraphs.len(),
            links.len(),
            self.url
        );

        Extraction { record, links }
    }
}

/// Collects the unique trimmed text of every element matching `selector`
fn collect_texts(document: &Html, selector: &str) -> TextBag {
    let mut bag = TextBag::new();

    if let Ok(selector) = Selector::parse(selector) {
        for element in document.select(&selector) {
            bag.insert(&element.text().collect::<String>());
        }
    }

    bag
}

/// Extracts in-scope links that the frontier has not seen
fn extract_links(document: &Html, ctx: &ExtractContext<'_>) -> Vec<NormalizedUrl> {
    let mut links = Vec::new();
    let mut seen = HashSet::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };

            let Some(link) = ctx.scope.admit(href) else {
                tracing::trace!("Out of scope: {}", href);
                continue;
            };

            if ctx.frontier.has(&link) || !seen.insert(link.clone()) {
                continue;
            }

            links.push(link);
        }
    }

    links
}
