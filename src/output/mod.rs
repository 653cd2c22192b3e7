//! Output module for archiving pages and reporting on runs
//!
//! This module handles:
//! - Rendering each scraped page as a CSV record and a PDF document
//! - Writing both files under a common output root
//! - Printing and exporting the end-of-run summary

mod csv_output;
mod files;
mod markdown;
mod pdf_output;
pub mod summary;
mod traits;

pub use csv_output::{render_csv, CSV_HEADER};
pub use files::FilePersister;
pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use pdf_output::render_pdf;
pub use summary::{print_summary, FailedUrl, RunSummary};
pub use traits::{
    OutputError, OutputResult, PagePersister, PageRecord, SavedPage, DEFAULT_TITLE,
};
