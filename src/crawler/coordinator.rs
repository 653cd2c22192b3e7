//! Crawl coordinator - end-to-end run orchestration
//!
//! This module ties the pieces together:
//! - Scraping the sitemap page and extracting the work set
//! - Running the retry scheduler over it
//! - Assembling the run summary

use crate::config::Config;
use crate::crawler::fetcher::{FirecrawlClient, PageFetcher, ScrapeResponse};
use crate::crawler::scheduler::{RetryPolicy, RetryScheduler};
use crate::output::{FailedUrl, FilePersister, PagePersister, RunSummary};
use crate::url::LinkExtractor;
use crate::{ExtractionError, ScribeError};
use chrono::Utc;

/// Main crawl coordinator
pub struct Coordinator<F, P> {
    config: Config,
    extractor: LinkExtractor,
    fetcher: F,
    persister: P,
}

impl<F: PageFetcher, P: PagePersister> Coordinator<F, P> {
    /// Creates a coordinator from a validated config and its collaborators
    pub fn new(config: Config, fetcher: F, persister: P) -> Result<Self, ScribeError> {
        let extractor = LinkExtractor::from_config(&config.sitemap)?;
        Ok(Self {
            config,
            extractor,
            fetcher,
            persister,
        })
    }

    /// Scrapes the sitemap page and returns the URLs to process
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<String>)` - Unique URLs under the base URL, in sitemap order
    /// * `Err(ScribeError::Extraction)` - Sitemap unreachable, empty, or
    ///   without a single qualifying link
    pub async fn discover_urls(&self) -> Result<Vec<String>, ScribeError> {
        let source = &self.config.sitemap.source_url;
        tracing::info!("--- Phase 1: Fetching and parsing sitemap from: {} ---", source);

        // Only the markdown matters here; the API's success flag is ignored
        let markdown = match self.fetcher.fetch(source).await {
            Ok(ScrapeResponse {
                markdown: Some(markdown),
                success,
                ..
            }) if !markdown.is_empty() => {
                if !success {
                    tracing::warn!("Sitemap scrape flagged as unsuccessful but returned content");
                }
                markdown
            }
            Ok(_) => {
                return Err(ExtractionError::SitemapEmpty {
                    url: source.clone(),
                }
                .into())
            }
            Err(e) => {
                return Err(ExtractionError::SitemapUnreachable {
                    url: source.clone(),
                    reason: e.to_string(),
                }
                .into())
            }
        };

        let urls = self.extractor.extract(&markdown);
        if urls.is_empty() {
            return Err(ExtractionError::NoQualifyingUrls {
                base_url: self.extractor.base_url().to_string(),
            }
            .into());
        }

        tracing::info!(
            "Phase 1 complete! Found {} unique URLs to process.",
            urls.len()
        );
        Ok(urls)
    }

    /// Runs the full crawl: discovery, retry passes, summary
    pub async fn run(&self) -> Result<RunSummary, ScribeError> {
        let started_at = Utc::now();
        tracing::info!(
            "Starting sitemap-based crawl for {}",
            self.config.sitemap.base_url
        );

        let urls = self.discover_urls().await?;
        let urls_discovered = urls.len();

        let policy = RetryPolicy::from_config(&self.config.retry);
        let scheduler = RetryScheduler::new(policy, &self.fetcher, &self.persister);
        let report = scheduler.run(urls).await?;

        let permanently_failed = report
            .permanently_failed
            .iter()
            .map(FailedUrl::from)
            .collect();

        Ok(RunSummary {
            started_at,
            finished_at: Utc::now(),
            sitemap_url: self.config.sitemap.source_url.clone(),
            base_url: self.config.sitemap.base_url.clone(),
            output_root: self.config.output.root.clone(),
            urls_discovered,
            passes_run: report.passes_run,
            max_passes: policy.max_passes(),
            total_attempts: report.attempts,
            saved: report.saved,
            permanently_failed,
        })
    }
}

/// Builds the Firecrawl-backed coordinator for a config and API key
pub fn build_coordinator(
    config: Config,
    api_key: impl Into<String>,
) -> Result<Coordinator<FirecrawlClient, FilePersister>, ScribeError> {
    let fetcher = FirecrawlClient::new(&config.api, api_key)?;
    let persister = FilePersister::from_config(&config.output);
    Coordinator::new(config, fetcher, persister)
}

/// Runs the main crawl operation against the Firecrawl API
///
/// # Example
///
/// ```no_run
/// use sitemap_scribe::config::{load_config, resolve_api_key};
/// use sitemap_scribe::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("scribe.toml"))?;
/// let api_key = resolve_api_key(&config.api)?;
/// let summary = run_crawl(config, api_key).await?;
/// println!("Saved {} pages", summary.success_count());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: Config,
    api_key: impl Into<String>,
) -> Result<RunSummary, ScribeError> {
    build_coordinator(config, api_key)?.run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use crate::crawler::fetcher::ScrapeError;
    use crate::output::{OutputResult, PageRecord, SavedPage};
    use async_trait::async_trait;
    use std::path::PathBuf;

    /// Fetcher serving a fixed sitemap; every other URL fails
    struct SitemapOnly(Result<ScrapeResponse, String>);

    #[async_trait]
    impl PageFetcher for SitemapOnly {
        async fn fetch(&self, url: &str) -> Result<ScrapeResponse, ScrapeError> {
            if url != "https://x.com/sitemap" {
                return Ok(ScrapeResponse::default());
            }
            self.0.clone().map_err(|message| ScrapeError::Api {
                url: url.to_string(),
                status: 503,
                message,
            })
        }
    }

    struct NullPersister;

    #[async_trait]
    impl PagePersister for NullPersister {
        async fn persist(&self, record: PageRecord) -> OutputResult<SavedPage> {
            Ok(SavedPage {
                url: record.url,
                slug: "unused".to_string(),
                csv_path: PathBuf::new(),
                pdf_path: PathBuf::new(),
            })
        }
    }

    fn create_test_config() -> Config {
        parse_config(
            r#"
[sitemap]
source-url = "https://x.com/sitemap"
base-url = "https://x.com"

[retry]
max-passes = 2
base-delay-ms = 1
"#,
        )
        .unwrap()
    }

    fn sitemap(markdown: &str) -> Result<ScrapeResponse, String> {
        Ok(ScrapeResponse {
            success: true,
            markdown: Some(markdown.to_string()),
            title: Some("Sitemap".to_string()),
        })
    }

    #[tokio::test]
    async fn test_discover_urls() {
        let fetcher = SitemapOnly(sitemap(
            "[A](https://x.com/p1) [B](https://x.com/p2) [C](https://other.com/p3)",
        ));
        let coordinator = Coordinator::new(create_test_config(), fetcher, NullPersister).unwrap();

        let urls = coordinator.discover_urls().await.unwrap();
        assert_eq!(urls, vec!["https://x.com/p1", "https://x.com/p2"]);
    }

    #[tokio::test]
    async fn test_sitemap_failure_flag_with_content_is_used() {
        let fetcher = SitemapOnly(Ok(ScrapeResponse {
            success: false,
            markdown: Some("[A](https://x.com/p1)".to_string()),
            title: None,
        }));
        let coordinator = Coordinator::new(create_test_config(), fetcher, NullPersister).unwrap();

        let urls = coordinator.discover_urls().await.unwrap();
        assert_eq!(urls, vec!["https://x.com/p1"]);
    }

    #[tokio::test]
    async fn test_sitemap_without_markdown_is_empty() {
        let fetcher = SitemapOnly(Ok(ScrapeResponse {
            success: true,
            markdown: None,
            title: Some("Sitemap".to_string()),
        }));
        let coordinator = Coordinator::new(create_test_config(), fetcher, NullPersister).unwrap();

        let err = coordinator.discover_urls().await.unwrap_err();
        assert!(matches!(
            err,
            ScribeError::Extraction(ExtractionError::SitemapEmpty { .. })
        ));
    }

    #[tokio::test]
    async fn test_unreachable_sitemap_is_fatal() {
        let fetcher = SitemapOnly(Err("down".to_string()));
        let coordinator = Coordinator::new(create_test_config(), fetcher, NullPersister).unwrap();

        let err = coordinator.run().await.unwrap_err();
        assert!(matches!(
            err,
            ScribeError::Extraction(ExtractionError::SitemapUnreachable { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_sitemap_is_fatal() {
        let fetcher = SitemapOnly(sitemap(""));
        let coordinator = Coordinator::new(create_test_config(), fetcher, NullPersister).unwrap();

        let err = coordinator.run().await.unwrap_err();
        assert!(matches!(
            err,
            ScribeError::Extraction(ExtractionError::SitemapEmpty { .. })
        ));
    }

    #[tokio::test]
    async fn test_no_qualifying_urls_is_fatal() {
        let fetcher = SitemapOnly(sitemap("[C](https://other.com/p3)"));
        let coordinator = Coordinator::new(create_test_config(), fetcher, NullPersister).unwrap();

        let err = coordinator.run().await.unwrap_err();
        assert!(matches!(
            err,
            ScribeError::Extraction(ExtractionError::NoQualifyingUrls { .. })
        ));
    }

    #[tokio::test]
    async fn test_run_reports_failures() {
        let fetcher = SitemapOnly(sitemap("[A](https://x.com/p1)"));
        let coordinator = Coordinator::new(create_test_config(), fetcher, NullPersister).unwrap();

        let summary = coordinator.run().await.unwrap();

        assert_eq!(summary.urls_discovered, 1);
        assert_eq!(summary.success_count(), 0);
        assert_eq!(summary.passes_run, 2);
        assert_eq!(summary.max_passes, 2);
        assert_eq!(summary.permanently_failed[0].url, "https://x.com/p1");
        assert_eq!(summary.permanently_failed[0].attempts, 2);
    }
}
