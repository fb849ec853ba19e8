//! Run summary reporting
//!
//! Every category worker returns a [`CategoryReport`]; the coordinator
//! collects them into a [`RunSummary`] once the merge is done.

use crate::state::Quota;
use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Outcome of crawling one category
#[derive(Debug, Clone)]
pub struct CategoryReport {
    /// Category name
    pub category: String,

    /// Quota the category was crawled with
    pub quota: Quota,

    /// Listing pages fetched
    pub pages_fetched: u32,

    /// Article URLs discovered
    pub urls_discovered: usize,

    /// Articles written to the category sink
    pub articles_written: usize,

    /// Articles published on or before the cutoff date
    pub skipped_too_old: usize,

    /// Articles without any body text
    pub skipped_no_content: usize,

    /// Articles whose page could not be fetched
    pub failed_articles: usize,

    /// Why discovery stopped early, if it did
    pub discovery_error: Option<String>,

    /// Why the category produced no sink, if it did not
    pub error: Option<String>,

    /// Sink written for this category
    pub sink_path: Option<PathBuf>,
}

impl CategoryReport {
    pub fn new(category: impl Into<String>, quota: Quota) -> Self {
        Self {
            category: category.into(),
            quota,
            pages_fetched: 0,
            urls_discovered: 0,
            articles_written: 0,
            skipped_too_old: 0,
            skipped_no_content: 0,
            failed_articles: 0,
            discovery_error: None,
            error: None,
            sink_path: None,
        }
    }

    /// Returns true if the category produced its sink
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }

    /// Returns true if discovery failed and only part of the category was seen
    pub fn is_partial(&self) -> bool {
        self.discovery_error.is_some()
    }
}

/// Summary of a whole run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// One report per category, in crawl order
    pub categories: Vec<CategoryReport>,

    /// Path of the merged corpus
    pub corpus_path: PathBuf,

    /// Rows in the merged corpus
    pub merged_rows: usize,

    /// Rows dropped as cross-category duplicates
    pub duplicates_dropped: usize,

    /// Per-category sinks deleted after the merge
    pub sinks_removed: usize,
}

impl RunSummary {
    /// Articles written across all category sinks
    pub fn total_written(&self) -> usize {
        self.categories.iter().map(|c| c.articles_written).sum()
    }

    /// Categories that produced no sink
    pub fn failed_categories(&self) -> Vec<&str> {
        self.categories
            .iter()
            .filter(|c| !c.succeeded())
            .map(|c| c.category.as_str())
            .collect()
    }

    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }
}

/// Prints a run summary to stdout in a formatted manner
pub fn print_summary(summary: &RunSummary) {
    println!("=== Crawl Summary ===\n");

    println!("Categories:");
    for report in &summary.categories {
        let status = match (&report.error, &report.discovery_error) {
            (Some(e), _) => format!("FAILED: {}", e),
            (None, Some(e)) => format!("partial: {}", e),
            (None, None) => "ok".to_string(),
        };
        println!(
            "  {}: {} written (quota {}, {} urls, {} pages, {} too old, {} empty, {} failed) [{}]",
            report.category,
            report.articles_written,
            report.quota,
            report.urls_discovered,
            report.pages_fetched,
            report.skipped_too_old,
            report.skipped_no_content,
            report.failed_articles,
            status
        );
    }
    println!();

    println!("Overview:");
    println!("  Articles written: {}", summary.total_written());
    println!(
        "  Merged corpus: {} rows ({} duplicates dropped)",
        summary.merged_rows, summary.duplicates_dropped
    );
    println!("  Output: {}", summary.corpus_path.display());
    if summary.sinks_removed > 0 {
        println!("  Category files removed: {}", summary.sinks_removed);
    }
    println!("  Duration: {}s", summary.duration_seconds());
}
