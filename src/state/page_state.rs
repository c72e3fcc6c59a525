//! Page state definitions for tracking crawl progress
//!
//! A page moves through the pipeline one step at a time and ends either
//! `Visited` or `Failed`. There are no retries between steps.

use std::fmt;

/// Represents the current state of a page in the crawl process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    // ===== Active States =====
    /// Page has been claimed in the frontier but work has not started
    Unvisited,

    /// Page body is being fetched
    Fetching,

    /// Links and text are being extracted
    Extracting,

    /// The extraction record is being rendered
    Rendering,

    /// The rendered document is being uploaded
    Uploading,

    // ===== Terminal States =====
    /// Page was fetched, rendered and stored
    Visited,

    /// A step failed; the page is abandoned for this run
    Failed,
}

impl PageState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Visited | Self::Failed)
    }

    /// Returns true if this is an active state (page may still be processed)
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns true if this represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Visited)
    }

    /// The step that follows this one on the success path
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Unvisited => Some(Self::Fetching),
            Self::Fetching => Some(Self::Extracting),
            Self::Extracting => Some(Self::Rendering),
            Self::Rendering => Some(Self::Uploading),
            Self::Uploading => Some(Self::Visited),
            Self::Visited | Self::Failed => None,
        }
    }

    /// Returns true if moving from `self` to `to` is allowed
    ///
    /// Legal moves are one step forward along the pipeline, or to `Failed`
    /// from any active state.
    pub fn can_transition_to(&self, to: PageState) -> bool {
        if self.is_terminal() {
            return false;
        }
        to == Self::Failed || self.next() == Some(to)
    }

    /// Short lowercase name used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unvisited => "unvisited",
            Self::Fetching => "fetching",
            Self::Extracting => "extracting",
            Self::Rendering => "rendering",
            Self::Uploading => "uploading",
            Self::Visited => "visited",
            Self::Failed => "failed",
        }
    }

    /// Returns all possible page states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Unvisited,
            Self::Fetching,
            Self::Extracting,
            Self::Rendering,
            Self::Uploading,
            Self::Visited,
            Self::Failed,
        ]
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
