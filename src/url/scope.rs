use crate::url::normalize::{normalize_with, NormalizedUrl};
use url::Url;

/// Same-site containment rule for discovered links
///
/// Every link is resolved against the crawl's configured base URL and kept
/// only when the resolved string starts with that base. The anchor is fixed
/// for the whole run; it does not move with the page being crawled.
#[derive(Debug, Clone)]
pub struct Scope {
    base: Url,
}

impl Scope {
    /// Creates a scope anchored at `base_url`
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        let mut base = Url::parse(base_url)?;
        base.set_fragment(None);
        Ok(Self { base })
    }

    /// The configured base URL
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// The seed URL of the crawl, normalized
    pub fn seed(&self) -> NormalizedUrl {
        normalize_with(self.base.as_str(), &self.base)
    }

    /// Resolves `href` against the base, keeping any fragment
    pub fn resolve(&self, href: &str) -> Option<String> {
        let href = href.trim();
        if href.is_empty() {
            return None;
        }
        self.base.join(href).ok().map(String::from)
    }

    /// Returns true if an absolute URL string lies inside the scope
    pub fn contains(&self, resolved: &str) -> bool {
        resolved.starts_with(self.base.as_str())
    }

    /// Resolves, filters and normalizes a link target
    ///
    /// Returns None for links outside the scope or that cannot be resolved.
    pub fn admit(&self, href: &str) -> Option<NormalizedUrl> {
        let resolved = self.resolve(href)?;
        if !self.contains(&resolved) {
            return None;
        }
        Some(normalize_with(&resolved, &self.base))
    }
}
