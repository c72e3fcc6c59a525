//! Content extraction
//!
//! A fetched page becomes an `ExtractionRecord` (the flat text bags that get
//! rendered) plus the in-scope links that feed the frontier. Markup and JSON
//! bodies go through separate strategies behind the `Extractable` trait.

mod html;
mod json;

pub use html::HtmlExtractor;
pub use json::JsonExtractor;

use crate::crawler::{FetchedPage, Frontier};
use crate::url::{NormalizedUrl, Scope};
use std::collections::HashSet;

/// Insertion-ordered collection of unique, non-empty trimmed strings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBag {
    items: Vec<String>,
    seen: HashSet<String>,
}

impl TextBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `text` after trimming; empty and repeated values are dropped
    ///
    /// Returns true if the value was added.
    pub fn insert(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() || self.seen.contains(text) {
            return false;
        }
        self.seen.insert(text.to_string());
        self.items.push(text.to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.items
    }
}

impl<'a> FromIterator<&'a str> for TextBag {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut bag = Self::new();
        for text in iter {
            bag.insert(text);
        }
        bag
    }
}

/// Text extracted from one page
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionRecord {
    pub source_url: NormalizedUrl,
    /// `h1`–`h3` text
    pub headers: Vec<String>,
    /// `p` text
    pub paragraphs: Vec<String>,
    /// `div` text
    pub block_texts: Vec<String>,
    /// `span` text
    pub inline_texts: Vec<String>,
    /// Items copied verbatim from a JSON document's payload field
    pub structured_payload: Vec<serde_json::Value>,
}

impl ExtractionRecord {
    /// A record with no content
    pub fn empty(source_url: NormalizedUrl) -> Self {
        Self {
            source_url,
            headers: Vec::new(),
            paragraphs: Vec::new(),
            block_texts: Vec::new(),
            inline_texts: Vec::new(),
            structured_payload: Vec::new(),
        }
    }
}

/// Result of extracting one page
#[derive(Debug, Clone)]
pub struct Extraction {
    pub record: ExtractionRecord,
    /// In-scope links not yet in the frontier, in document order
    pub links: Vec<NormalizedUrl>,
}

/// Shared inputs for every extraction strategy
#[derive(Debug, Clone, Copy)]
pub struct ExtractContext<'a> {
    pub scope: &'a Scope,
    pub frontier: &'a Frontier,
    pub payload_field: &'a str,
}

/// A fetched body that can be turned into an `Extraction`
pub trait Extractable {
    fn extract(&self, ctx: &ExtractContext<'_>) -> Extraction;
}

impl FetchedPage {
    /// Selects the extraction strategy for this page
    pub fn extractor(&self) -> Box<dyn Extractable + '_> {
        match self {
            FetchedPage::Html { url, body } => Box::new(HtmlExtractor::new(url, body)),
            FetchedPage::Json { url, value } => Box::new(JsonExtractor::new(url, value)),
        }
    }
}

impl Extractable for FetchedPage {
    fn extract(&self, ctx: &ExtractContext<'_>) -> Extraction {
        self.extractor().extract(ctx)
    }
}
