//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the Firecrawl API and run
//! the full discover, scrape, retry and archive cycle end-to-end.

use serde_json::json;
use sitemap_scribe::config::{parse_config, Config};
use sitemap_scribe::crawler::{build_coordinator, run_crawl};
use sitemap_scribe::output::{generate_markdown_summary, CSV_HEADER};
use sitemap_scribe::{ExtractionError, ScribeError};
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SITEMAP_URL: &str = "https://x.com/sitemap";
const API_KEY: &str = "test-key";

/// Creates a test configuration pointing at the mock API
fn create_test_config(endpoint: &str, output_root: &Path) -> Config {
    parse_config(&format!(
        r#"
[sitemap]
source-url = "{SITEMAP_URL}"
base-url = "https://x.com"

[retry]
max-passes = 3
base-delay-ms = 1

[output]
root = '{}'

[api]
endpoint = "{endpoint}"
timeout-secs = 10
"#,
        output_root.display()
    ))
    .expect("Failed to parse test config")
}

fn scraped(markdown: &str, title: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "success": true,
        "data": {
            "markdown": markdown,
            "metadata": { "title": title, "statusCode": 200 }
        }
    }))
}

/// Mounts a scrape mock answering for one target URL
async fn mount_scrape(server: &MockServer, url: &str, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .and(body_partial_json(json!({ "url": url })))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn mount_sitemap(server: &MockServer, markdown: &str) {
    mount_scrape(server, SITEMAP_URL, scraped(markdown, "Sitemap")).await;
}

#[tokio::test]
async fn test_full_crawl_with_permanent_failure() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("output");

    mount_sitemap(
        &mock_server,
        "# Sitemap\n- [A](https://x.com/p1)\n- [B](https://x.com/p2)\n- [C](https://other.com/p3)",
    )
    .await;
    mount_scrape(
        &mock_server,
        "https://x.com/p1",
        scraped("Page one body.", "Page One"),
    )
    .await;

    // Three passes, one attempt each
    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .and(body_partial_json(json!({ "url": "https://x.com/p2" })))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "success": false,
            "error": "upstream timeout"
        })))
        .expect(3)
        .mount(&mock_server)
        .await;

    // Nothing outside the base URL is ever requested
    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .and(body_partial_json(json!({ "url": "https://other.com/p3" })))
        .respond_with(scraped("unused", "unused"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), &root);
    let summary = run_crawl(config, API_KEY).await.unwrap();

    assert_eq!(summary.urls_discovered, 2);
    assert_eq!(summary.success_count(), 1);
    assert_eq!(summary.failure_count(), 1);
    assert_eq!(summary.passes_run, 3);
    assert_eq!(summary.total_attempts, 4);

    let failed = &summary.permanently_failed[0];
    assert_eq!(failed.url, "https://x.com/p2");
    assert_eq!(failed.attempts, 3);
    assert!(failed
        .last_error
        .as_deref()
        .unwrap()
        .contains("upstream timeout"));

    let csv_path = root.join("csv/p1.csv");
    let pdf_path = root.join("pdf/p1.pdf");
    assert!(csv_path.exists());
    assert!(pdf_path.exists());
    assert!(!root.join("csv/p2.csv").exists());

    let csv = std::fs::read_to_string(&csv_path).unwrap();
    assert!(csv.starts_with(CSV_HEADER));
    assert!(csv.contains(r#""https://x.com/p1","Page One","Page one body.""#));

    let pdf = std::fs::read(&pdf_path).unwrap();
    assert!(pdf.starts_with(b"%PDF-"));
}

#[tokio::test]
async fn test_failed_page_recovers_on_later_pass() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("output");

    mount_sitemap(&mock_server, "[Flaky](https://x.com/docs/flaky.html)").await;

    // First attempt reports no content, the retry succeeds
    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .and(body_partial_json(json!({ "url": "https://x.com/docs/flaky.html" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": false })))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    mount_scrape(
        &mock_server,
        "https://x.com/docs/flaky.html",
        scraped("Finally here.", ""),
    )
    .await;

    let config = create_test_config(&mock_server.uri(), &root);
    let summary = run_crawl(config, API_KEY).await.unwrap();

    assert_eq!(summary.success_count(), 1);
    assert_eq!(summary.failure_count(), 0);
    assert_eq!(summary.passes_run, 2);
    assert_eq!(summary.saved[0].slug, "docs-flaky");

    let csv = std::fs::read_to_string(root.join("csv/docs-flaky.csv")).unwrap();
    assert!(csv.contains(r#""No Title Found""#));
}

#[tokio::test]
async fn test_requests_carry_bearer_token() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "url": SITEMAP_URL,
            "formats": ["markdown"],
            "onlyMainContent": true
        })))
        .respond_with(scraped("[Home](https://x.com/)", "Sitemap"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), dir.path());
    let coordinator = build_coordinator(config, API_KEY).unwrap();
    let urls = coordinator.discover_urls().await.unwrap();

    assert_eq!(urls, vec!["https://x.com/"]);
}

#[tokio::test]
async fn test_empty_sitemap_writes_nothing() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("output");

    mount_sitemap(&mock_server, "").await;

    let config = create_test_config(&mock_server.uri(), &root);
    let err = run_crawl(config, API_KEY).await.unwrap_err();

    assert!(matches!(
        err,
        ScribeError::Extraction(ExtractionError::SitemapEmpty { .. })
    ));
    assert!(!root.exists());
}

#[tokio::test]
async fn test_unreachable_sitemap() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), dir.path());
    let err = run_crawl(config, API_KEY).await.unwrap_err();

    match err {
        ScribeError::Extraction(ExtractionError::SitemapUnreachable { url, reason }) => {
            assert_eq!(url, SITEMAP_URL);
            assert!(reason.contains("401"));
        }
        other => panic!("expected unreachable sitemap, got {:?}", other),
    }
}

#[tokio::test]
async fn test_sitemap_without_qualifying_urls() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_sitemap(
        &mock_server,
        "[Elsewhere](https://other.com/a) and a bare https://x.com/bare link",
    )
    .await;

    let config = create_test_config(&mock_server.uri(), dir.path());
    let err = run_crawl(config, API_KEY).await.unwrap_err();

    assert!(matches!(
        err,
        ScribeError::Extraction(ExtractionError::NoQualifyingUrls { .. })
    ));
}

#[tokio::test]
async fn test_markdown_summary_export() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("output");

    mount_sitemap(&mock_server, "[A](https://x.com/p1) [A again](https://x.com/p1)").await;
    mount_scrape(&mock_server, "https://x.com/p1", scraped("Body", "Page One")).await;

    let config = create_test_config(&mock_server.uri(), &root);
    let summary = run_crawl(config, API_KEY).await.unwrap();
    assert_eq!(summary.urls_discovered, 1);

    let summary_path = root.join("summary.md");
    generate_markdown_summary(&summary, &summary_path).unwrap();

    let markdown = std::fs::read_to_string(&summary_path).unwrap();
    assert!(markdown.contains("https://x.com/p1"));
    assert!(markdown.contains("No failed pages after all retries."));
}
