use std::fmt;
use url::Url;

/// Characters that cannot appear in a stored document name
const UNSAFE_NAME_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// A URL with its fragment removed and relative segments resolved
///
/// This is the frontier's dedup key and the source of the stored document
/// name. Two URLs that differ only by fragment normalize to the same value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedUrl(String);

impl NormalizedUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NormalizedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalizes `url` against `base`
///
/// # Normalization Steps
///
/// 1. Resolve `url` against `base` when it is relative
/// 2. Remove the fragment (everything from the first `#`)
///
/// Never fails: when either side cannot be parsed the raw input is kept,
/// truncated at its first `#`.
///
/// # Examples
///
/// ```
/// use folio_crawl::url::normalize;
///
/// let url = normalize("/page#top", "https://site.test/");
/// assert_eq!(url.as_str(), "https://site.test/page");
/// ```
pub fn normalize(url: &str, base: &str) -> NormalizedUrl {
    match Url::parse(base) {
        Ok(base) => normalize_with(url, &base),
        Err(_) => match Url::parse(url.trim()) {
            Ok(absolute) => without_fragment(absolute),
            Err(_) => NormalizedUrl(strip_fragment(url).to_string()),
        },
    }
}

/// Normalizes `url` against an already parsed base
pub fn normalize_with(url: &str, base: &Url) -> NormalizedUrl {
    match base.join(url.trim()) {
        Ok(resolved) => without_fragment(resolved),
        Err(e) => {
            tracing::debug!("Keeping unparseable URL {} as-is: {}", url, e);
            NormalizedUrl(strip_fragment(url).to_string())
        }
    }
}

fn without_fragment(mut url: Url) -> NormalizedUrl {
    url.set_fragment(None);
    NormalizedUrl(url.into())
}

fn strip_fragment(url: &str) -> &str {
    url.split('#').next().unwrap_or_default().trim()
}

/// Derives the stored document name for a source URL
///
/// Each of `\ / : * ? " < > |` becomes `_` and `.pdf` is appended.
///
/// ```
/// use folio_crawl::url::{normalize, storage_name};
///
/// let url = normalize("https://site.test/a?b=1", "https://site.test/");
/// assert_eq!(storage_name(&url), "https___site.test_a_b=1.pdf");
/// ```
pub fn storage_name(url: &NormalizedUrl) -> String {
    let mut name: String = url
        .as_str()
        .chars()
        .map(|c| if UNSAFE_NAME_CHARS.contains(&c) { '_' } else { c })
        .collect();
    name.push_str(".pdf");
    name
}
