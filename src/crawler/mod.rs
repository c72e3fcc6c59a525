//! Crawler module for page fetching and crawl orchestration
//!
//! This module contains the core crawling logic, including:
//! - The per-run frontier of claimed URLs and their states
//! - HTTP fetching and response classification
//! - Overall crawl coordination with a bounded worker pool

mod coordinator;
mod fetcher;
mod frontier;

pub use coordinator::{run_crawl, Coordinator};
pub use fetcher::{build_http_client, FetchedPage, HttpFetcher, PageFetcher};
pub use frontier::Frontier;
