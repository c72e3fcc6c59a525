//! Visited-set for one crawl run
//!
//! The frontier records every URL that has been claimed for processing,
//! together with the pipeline state it has reached. It only ever grows and is
//! dropped when the run ends.

use crate::state::PageState;
use crate::url::NormalizedUrl;
use crate::FolioError;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct Frontier {
    pages: Mutex<HashMap<NormalizedUrl, PageState>>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    fn pages(&self) -> MutexGuard<'_, HashMap<NormalizedUrl, PageState>> {
        // Every update is a single insert, so a poisoned map is still consistent.
        self.pages.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Returns true if `url` has been claimed
    pub fn has(&self, url: &NormalizedUrl) -> bool {
        self.pages().contains_key(url)
    }

    /// Claims `url` without reporting whether it was already present
    pub fn mark(&self, url: &NormalizedUrl) {
        self.check_and_mark(url);
    }

    /// Claims `url` atomically
    ///
    /// Returns true only for the caller that inserted it. This is the single
    /// gate for at-most-once processing.
    pub fn check_and_mark(&self, url: &NormalizedUrl) -> bool {
        let mut pages = self.pages();
        if pages.contains_key(url) {
            return false;
        }
        pages.insert(url.clone(), PageState::Unvisited);
        true
    }

    /// Current state of a claimed URL
    pub fn state(&self, url: &NormalizedUrl) -> Option<PageState> {
        self.pages().get(url).copied()
    }

    /// Moves a claimed URL to `to`
    pub fn transition(&self, url: &NormalizedUrl, to: PageState) -> Result<(), FolioError> {
        let mut pages = self.pages();
        let from = pages.get(url).copied().unwrap_or(PageState::Unvisited);

        if !from.can_transition_to(to) {
            return Err(FolioError::InvalidTransition { from, to });
        }

        pages.insert(url.clone(), to);
        Ok(())
    }

    /// Number of claimed URLs
    pub fn len(&self) -> usize {
        self.pages().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages().is_empty()
    }

    /// Counts claimed URLs per state
    pub fn snapshot_counts(&self) -> HashMap<PageState, u64> {
        let mut counts = HashMap::new();
        for state in self.pages().values() {
            *counts.entry(*state).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::normalize;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn url(path: &str) -> NormalizedUrl {
        normalize(path, "https://site.test/")
    }

    #[test]
    fn test_has_exactly_marked_set() {
        let frontier = Frontier::new();
        let marked = ["/a", "/b", "/a", "/c#frag", "/c"];
        for path in marked {
            frontier.mark(&url(path));
        }

        let expected: HashSet<_> = ["/a", "/b", "/c"].iter().map(|p| url(p)).collect();
        for probe in ["/a", "/b", "/c", "/d", "/a/b", "/"] {
            assert_eq!(
                frontier.has(&url(probe)),
                expected.contains(&url(probe)),
                "{}",
                probe
            );
        }
        assert_eq!(frontier.len(), 3);
    }

    #[test]
    fn test_check_and_mark_only_first_wins() {
        let frontier = Frontier::new();
        assert!(frontier.check_and_mark(&url("/page")));
        assert!(!frontier.check_and_mark(&url("/page")));
        assert!(!frontier.check_and_mark(&url("/page#again")));
    }

    #[test]
    fn test_check_and_mark_across_threads() {
        let frontier = Arc::new(Frontier::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let frontier = Arc::clone(&frontier);
                std::thread::spawn(move || frontier.check_and_mark(&url("/contended")))
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }

    #[test]
    fn test_transition_path() {
        let frontier = Frontier::new();
        let page = url("/page");
        frontier.mark(&page);

        frontier.transition(&page, PageState::Fetching).unwrap();
        frontier.transition(&page, PageState::Failed).unwrap();
        assert_eq!(frontier.state(&page), Some(PageState::Failed));

        let err = frontier.transition(&page, PageState::Fetching).unwrap_err();
        assert!(matches!(
            err,
            FolioError::InvalidTransition {
                from: PageState::Failed,
                to: PageState::Fetching
            }
        ));
    }

    #[test]
    fn test_snapshot_counts() {
        let frontier = Frontier::new();
        for path in ["/a", "/b", "/c"] {
            frontier.mark(&url(path));
        }
        frontier.transition(&url("/a"), PageState::Failed).unwrap();

        let counts = frontier.snapshot_counts();
        assert_eq!(counts.get(&PageState::Unvisited), Some(&2));
        assert_eq!(counts.get(&PageState::Failed), Some(&1));
        assert!(!frontier.is_empty());
    }
}
