//! URL handling module for Sitemap-Scribe
//!
//! This module provides link extraction from sitemap text and the slug
//! rules that turn a page URL into output file names.

mod extract;
mod slug;

// Re-export main functions
pub use extract::{extract_urls, LinkExtractor, MARKDOWN_LINK};
pub use slug::{slugify, INDEX_SLUG};
