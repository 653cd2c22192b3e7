//! Crawler module for sitemap-driven scraping
//!
//! This module contains the core crawling logic, including:
//! - Page fetching through the content-extraction API
//! - Multi-pass retry scheduling with linearly growing delays
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod scheduler;

pub use coordinator::{build_coordinator, run_crawl, Coordinator};
pub use fetcher::{
    build_http_client, FetchOutcome, FirecrawlClient, PageFetcher, ScrapeError, ScrapeResponse,
};
pub use scheduler::{PassState, RetryPolicy, RetryScheduler, RunReport};
