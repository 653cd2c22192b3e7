//! Link extraction from scraped sitemap text
//!
//! The sitemap arrives as markdown from the extraction API, so links are
//! pulled out with a regex rather than an HTML parser. Only URLs that start
//! with the configured base URL survive, compared as raw strings: trailing
//! slashes, query strings and fragments are all significant.

use crate::config::{SitemapConfig, DEFAULT_LINK_PATTERN};
use crate::ConfigError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Markdown link pattern, `[text](https://...)`, capturing the URL
pub static MARKDOWN_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(DEFAULT_LINK_PATTERN).expect("default link pattern is valid"));

/// Extracts the unique URLs under `base_url` referenced in `text`
///
/// For each match of `pattern`, capture group 1 is taken as the URL (the whole
/// match if the pattern has no groups). Duplicates are dropped and the result
/// keeps first-seen order, so the same input always yields the same work set.
///
/// # Example
///
/// ```
/// use sitemap_scribe::url::{extract_urls, MARKDOWN_LINK};
///
/// let text = "[A](https://x.com/p1) [B](https://x.com/p1) [C](https://other.com/p3)";
/// let urls = extract_urls(text, &MARKDOWN_LINK, "https://x.com");
/// assert_eq!(urls, vec!["https://x.com/p1".to_string()]);
/// ```
pub fn extract_urls(text: &str, pattern: &Regex, base_url: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut urls = Vec::new();

    for caps in pattern.captures_iter(text) {
        let Some(found) = caps.get(1).or_else(|| caps.get(0)) else {
            continue;
        };
        let url = found.as_str();

        if !url.starts_with(base_url) {
            tracing::trace!("Skipping link outside base URL: {}", url);
            continue;
        }

        if seen.insert(url) {
            urls.push(url.to_string());
        }
    }

    urls
}

/// A compiled link pattern bound to a base URL prefix
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    pattern: Regex,
    base_url: String,
}

impl LinkExtractor {
    /// Compiles `pattern` for use with `base_url`
    pub fn new(pattern: &str, base_url: impl Into<String>) -> Result<Self, ConfigError> {
        let pattern = Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern(e.to_string()))?;
        Ok(Self {
            pattern,
            base_url: base_url.into(),
        })
    }

    /// Builds the extractor for a sitemap section, reusing [`MARKDOWN_LINK`] for the default pattern
    pub fn from_config(config: &SitemapConfig) -> Result<Self, ConfigError> {
        if config.link_pattern == DEFAULT_LINK_PATTERN {
            return Ok(Self {
                pattern: MARKDOWN_LINK.clone(),
                base_url: config.base_url.clone(),
            });
        }
        Self::new(&config.link_pattern, config.base_url.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Extracts the unique URLs under the base prefix from `text`
    pub fn extract(&self, text: &str) -> Vec<String> {
        extract_urls(text, &self.pattern, &self.base_url)
    }
}
