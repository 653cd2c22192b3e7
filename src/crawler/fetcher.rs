//! Page fetching through the Firecrawl content-extraction API
//!
//! This module handles:
//! - The `PageFetcher` seam the scheduler drives
//! - Building the HTTP client for the API
//! - Calling the `/v1/scrape` endpoint and decoding its response
//! - Classifying each fetch into a `FetchOutcome`

use crate::config::ApiConfig;
use crate::output::PageRecord;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// Longest slice of an unparsable error body kept in messages
const MAX_ERROR_BODY: usize = 200;

/// Errors raised by a fetch attempt
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("API returned {status} for {url}: {message}")]
    Api {
        url: String,
        status: u16,
        message: String,
    },

    #[error("Invalid API response for {url}: {message}")]
    Decode { url: String, message: String },
}

/// What the extraction API returned for a page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeResponse {
    /// The API's own success flag
    pub success: bool,

    /// Main content as markdown
    pub markdown: Option<String>,

    /// Page title from the metadata block
    pub title: Option<String>,
}

/// Result of a single fetch attempt, as the scheduler sees it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Content arrived and is ready to persist
    Success(PageRecord),

    /// The API answered but flagged failure or returned no content
    NoContent,

    /// The call itself failed
    Failed(String),
}

impl FetchOutcome {
    /// Classifies a fetch result for `url`
    ///
    /// A failure flag and empty content are deliberately the same outcome:
    /// both are retried on the next pass.
    pub fn classify(url: &str, result: Result<ScrapeResponse, ScrapeError>) -> Self {
        match result {
            Ok(ScrapeResponse {
                success: true,
                markdown: Some(markdown),
                title,
            }) if !markdown.is_empty() => Self::Success(PageRecord::new(url, title, markdown)),
            Ok(_) => Self::NoContent,
            Err(e) => Self::Failed(e.to_string()),
        }
    }
}

/// Source of page content
///
/// Implementations apply their own timeouts; callers add none.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches the main content of `url`
    async fn fetch(&self, url: &str) -> Result<ScrapeResponse, ScrapeError>;
}

/// Builds an HTTP client for the extraction API
///
/// # Example
///
/// ```no_run
/// use sitemap_scribe::config::ApiConfig;
/// use sitemap_scribe::crawler::build_http_client;
///
/// let client = build_http_client(&ApiConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &ApiConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(concat!("sitemap-scribe/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Firecrawl `/v1/scrape` client
pub struct FirecrawlClient {
    client: Client,
    scrape_url: String,
    api_key: String,
    only_main_content: bool,
}

impl FirecrawlClient {
    /// Creates a client for the configured endpoint
    pub fn new(config: &ApiConfig, api_key: impl Into<String>) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
            scrape_url: format!("{}/v1/scrape", config.endpoint.trim_end_matches('/')),
            api_key: api_key.into(),
            only_main_content: config.only_main_content,
        })
    }

    pub fn scrape_url(&self) -> &str {
        &self.scrape_url
    }
}

#[async_trait]
impl PageFetcher for FirecrawlClient {
    async fn fetch(&self, url: &str) -> Result<ScrapeResponse, ScrapeError> {
        let body = json!({
            "url": url,
            "formats": ["markdown"],
            "onlyMainContent": self.only_main_content,
        });

        let response = self
            .client
            .post(&self.scrape_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|source| ScrapeError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|source| ScrapeError::Http {
            url: url.to_string(),
            source,
        })?;

        if !status.is_success() {
            let message = serde_json::from_str::<WireResponse>(&text)
                .ok()
                .and_then(|wire| wire.error)
                .unwrap_or_else(|| truncate(&text, MAX_ERROR_BODY));
            return Err(ScrapeError::Api {
                url: url.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        let wire: WireResponse =
            serde_json::from_str(&text).map_err(|e| ScrapeError::Decode {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        tracing::debug!(
            "Scrape of {} answered success={} ({} bytes)",
            url,
            wire.success,
            text.len()
        );

        Ok(wire.into())
    }
}

/// `/v1/scrape` response body
#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<WireData>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireData {
    #[serde(default)]
    markdown: Option<String>,
    #[serde(default)]
    metadata: Option<WireMetadata>,
}

#[derive(Debug, Deserialize)]
struct WireMetadata {
    #[serde(default)]
    title: Option<String>,
}

impl From<WireResponse> for ScrapeResponse {
    fn from(wire: WireResponse) -> Self {
        let (markdown, title) = match wire.data {
            Some(data) => (data.markdown, data.metadata.and_then(|m| m.title)),
            None => (None, None),
        };
        Self {
            success: wire.success,
            markdown,
            title,
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return "empty response body".to_string();
    }
    trimmed.chars().take(max_chars).collect()
}
