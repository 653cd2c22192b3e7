//! Configuration module for Sitemap-Scribe
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! and resolving the API credential from the environment.
//!
//! # Example
//!
//! ```no_run
//! use sitemap_scribe::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("scribe.toml")).unwrap();
//! println!("Scraping everything under {}", config.sitemap.base_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ApiConfig, Config, OutputConfig, RetryConfig, SitemapConfig, DEFAULT_LINK_PATTERN,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_with_hash, parse_config, resolve_api_key,
};
pub use validation::validate;
