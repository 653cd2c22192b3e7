//! Persister trait and page record types
//!
//! This module defines the interface the retry scheduler uses to archive a
//! scraped page, and the data that flows through it.

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// Title used when the extraction API reports none
pub const DEFAULT_TITLE: &str = "No Title Found";

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to build PDF: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// A successfully scraped page, ready to be archived
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    /// The page URL as it appeared in the sitemap
    pub url: String,

    /// Page title, never empty
    pub title: String,

    /// Extracted page text (markdown)
    pub content: String,
}

impl PageRecord {
    /// Builds a record, falling back to [`DEFAULT_TITLE`] for a missing or empty title
    ///
    /// Any other title is kept verbatim, surrounding whitespace included.
    pub fn new(url: impl Into<String>, title: Option<String>, content: impl Into<String>) -> Self {
        let title = title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());

        Self {
            url: url.into(),
            title,
            content: content.into(),
        }
    }
}

/// Where a page ended up on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedPage {
    /// The page URL
    pub url: String,

    /// File stem shared by the CSV and PDF files
    pub slug: String,

    pub csv_path: PathBuf,
    pub pdf_path: PathBuf,
}

/// Trait for page persisters
///
/// A persister archives one page per call. The returned future must only
/// complete once everything it wrote is durable on storage, because the
/// caller counts the page as done as soon as it resolves.
#[async_trait]
pub trait PagePersister: Send + Sync {
    /// Archives a scraped page
    ///
    /// # Arguments
    ///
    /// * `record` - The page to archive; consumed once
    ///
    /// # Returns
    ///
    /// * `Ok(SavedPage)` - Locations of the written files
    /// * `Err(OutputError)` - Writing failed; the page should be retried
    async fn persist(&self, record: PageRecord) -> OutputResult<SavedPage>;
}
