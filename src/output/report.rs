//! Per-run crawl report
//!
//! Counts of visited, failed and skipped URLs plus the stored document names.
//! A run always completes; this report is where page failures surface besides
//! the logs.

use crate::state::PageState;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// A URL that ended in `Failed`, with the cause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFailure {
    pub url: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub base_url: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    /// Pages fetched, rendered and stored
    pub visited: u64,
    /// Pages that failed at some step
    pub failed: u64,
    /// Pops of already-claimed URLs, plus URLs dropped by the page cap
    pub skipped: u64,

    /// Stored document names in completion order
    pub documents: Vec<String>,
    pub failures: Vec<PageFailure>,

    /// Final frontier state counts
    pub pages_by_state: HashMap<PageState, u64>,
}

impl CrawlReport {
    /// Starts a report for a run anchored at `base_url`
    pub fn start(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            started_at: Utc::now(),
            finished_at: None,
            visited: 0,
            failed: 0,
            skipped: 0,
            documents: Vec::new(),
            failures: Vec::new(),
            pages_by_state: HashMap::new(),
        }
    }

    pub fn record_visited(&mut self, document: impl Into<String>) {
        self.visited += 1;
        self.documents.push(document.into());
    }

    pub fn record_failed(&mut self, url: impl Into<String>, reason: impl Into<String>) {
        self.failed += 1;
        self.failures.push(PageFailure {
            url: url.into(),
            reason: reason.into(),
        });
    }

    pub fn record_skipped(&mut self, count: u64) {
        self.skipped += count;
    }

    pub fn finish(&mut self, pages_by_state: HashMap<PageState, u64>) {
        self.pages_by_state = pages_by_state;
        self.finished_at = Some(Utc::now());
    }

    /// Pages that reached a terminal state
    pub fn total_processed(&self) -> u64 {
        self.visited + self.failed
    }

    /// Share of processed pages that were stored, as a percentage
    pub fn success_rate(&self) -> f64 {
        let total = self.total_processed();
        if total == 0 {
            return 0.0;
        }
        (self.visited as f64 / total as f64) * 100.0
    }

    pub fn duration_seconds(&self) -> Option<f64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_milliseconds() as f64 / 1000.0)
    }
}

/// Prints the report to stdout in a formatted manner
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl Report ===\n");

    println!("Base URL: {}", report.base_url);
    println!("Started:  {}", report.started_at.to_rfc3339());
    if let Some(finished) = report.finished_at {
        println!("Finished: {}", finished.to_rfc3339());
    }
    if let Some(seconds) = report.duration_seconds() {
        println!("Duration: {:.2}s", seconds);
    }
    println!();

    println!("Pages:");
    println!("  Visited: {}", report.visited);
    println!("  Failed:  {}", report.failed);
    println!("  Skipped: {}", report.skipped);
    println!();

    if !report.failures.is_empty() {
        println!("Failures ({}):", report.failures.len());
        for failure in &report.failures {
            println!("  - {}: {}", failure.url, failure.reason);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} pages stored)",
        report.success_rate(),
        report.visited,
        report.total_processed()
    );
}
