//! End-of-run summary
//!
//! This module turns the scheduler's accumulators into a summary and prints
//! it for the user.

use crate::output::traits::SavedPage;
use crate::state::WorkItem;
use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// A URL that was still failing after the last pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedUrl {
    pub url: String,

    /// Number of fetch attempts made
    pub attempts: u32,

    /// Reason given by the last attempt
    pub last_error: Option<String>,
}

impl From<&WorkItem> for FailedUrl {
    fn from(item: &WorkItem) -> Self {
        Self {
            url: item.url.clone(),
            attempts: item.attempts(),
            last_error: item.last_error().map(str::to_string),
        }
    }
}

/// Summary of a complete run
#[derive(Debug, Clone)]
pub struct RunSummary {
    // Run metadata
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub sitemap_url: String,
    pub base_url: String,
    pub output_root: PathBuf,

    // Pass statistics
    pub urls_discovered: usize,
    pub passes_run: u32,
    pub max_passes: u32,
    pub total_attempts: u32,

    // Outcomes
    pub saved: Vec<SavedPage>,
    pub permanently_failed: Vec<FailedUrl>,
}

impl RunSummary {
    pub fn success_count(&self) -> usize {
        self.saved.len()
    }

    pub fn failure_count(&self) -> usize {
        self.permanently_failed.len()
    }

    /// Returns the success rate as a percentage of discovered URLs
    pub fn success_rate(&self) -> f64 {
        if self.urls_discovered == 0 {
            return 0.0;
        }
        (self.success_count() as f64 / self.urls_discovered as f64) * 100.0
    }

    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }
}

/// Prints the summary to stdout in a formatted manner
pub fn print_summary(summary: &RunSummary) {
    println!("\n=== All processing complete! ===\n");

    println!(
        "Scraped {} of {} URLs in {} pass(es) ({} attempts, {}s)",
        summary.success_count(),
        summary.urls_discovered,
        summary.passes_run,
        summary.total_attempts,
        summary.duration_seconds()
    );
    println!("  - Successfully saved: {} pages", summary.success_count());

    if summary.permanently_failed.is_empty() {
        println!("  - No failed pages after all retries!");
    } else {
        println!(
            "  - Permanently failed: {} pages",
            summary.failure_count()
        );
        println!("The following URLs could not be scraped after all attempts:");
        for failed in &summary.permanently_failed {
            println!("  - {}", failed.url);
        }
    }

    println!(
        "Check the '{}' folder for results.",
        summary.output_root.display()
    );
}
