//! State module for tracking crawl progress
//!
//! `PageState` tracks where each claimed URL is in the
//! fetch → extract → render → upload pipeline.

mod page_state;

pub use page_state::PageState;
