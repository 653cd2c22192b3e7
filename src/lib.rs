//! Sitemap-Scribe: sitemap-driven page archiver
//!
//! This crate reads a site's sitemap page through a content-extraction API,
//! scrapes every page under a base URL, and archives each one as a CSV row
//! and a PDF document. Failed scrapes are retried over a bounded number of
//! passes with a growing delay between requests.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Sitemap-Scribe operations
#[derive(Debug, Error)]
pub enum ScribeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Sitemap extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid state transition for {url}: {from:?} -> {to:?}")]
    InvalidTransition {
        url: String,
        from: state::WorkState,
        to: state::WorkState,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid link pattern: {0}")]
    InvalidPattern(String),

    #[error("{0} is not set. Export it or add it to your shell environment.")]
    MissingCredential(String),
}

/// Fatal errors raised while turning the sitemap into a work set
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Could not scrape the sitemap page {url}: {reason}")]
    SitemapUnreachable { url: String, reason: String },

    #[error("Sitemap page {url} returned no content")]
    SitemapEmpty { url: String },

    #[error("No URLs under {base_url} found in the sitemap")]
    NoQualifyingUrls { base_url: String },
}

/// Result type alias for Sitemap-Scribe operations
pub type Result<T> = std::result::Result<T, ScribeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use state::{WorkItem, WorkState};
pub use url::{extract_urls, slugify, LinkExtractor};
