//! Output module for crawl results
//!
//! This module handles:
//! - Collecting per-run counts of visited, failed and skipped pages
//! - Printing the run report

mod report;

pub use report::{print_report, CrawlReport, PageFailure};
