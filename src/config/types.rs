use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Default markdown link pattern: `[text](http(s)://...)`
pub const DEFAULT_LINK_PATTERN: &str = r"\[.*?\]\((https?://[^\s)]+)\)";

/// Main configuration structure for Sitemap-Scribe
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub sitemap: SitemapConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

/// Where the work set comes from
#[derive(Debug, Clone, Deserialize)]
pub struct SitemapConfig {
    /// Page listing every URL of the site, scraped first
    #[serde(rename = "source-url")]
    pub source_url: String,

    /// Only links starting with this prefix are scraped
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Regex matching link references in the sitemap text; group 1 is the URL
    #[serde(rename = "link-pattern", default = "default_link_pattern")]
    pub link_pattern: String,
}

/// Retry pass tunables
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of passes over the failing URLs
    #[serde(rename = "max-passes", default = "default_max_passes")]
    pub max_passes: u32,

    /// Delay after each request in pass 1 (milliseconds); pass p waits p times this
    #[serde(rename = "base-delay-ms", default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

impl RetryConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_passes: default_max_passes(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Root directory; CSV and PDF files go to `csv/` and `pdf/` below it
    #[serde(default = "default_output_root")]
    pub root: PathBuf,

    /// Optional markdown summary written at the end of a run
    #[serde(rename = "summary-path", default)]
    pub summary_path: Option<PathBuf>,
}

impl OutputConfig {
    pub fn csv_dir(&self) -> PathBuf {
        self.root.join("csv")
    }

    pub fn pdf_dir(&self) -> PathBuf {
        self.root.join("pdf")
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: default_output_root(),
            summary_path: None,
        }
    }
}

/// Content-extraction API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the Firecrawl API
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Name of the environment variable holding the API key
    #[serde(rename = "api-key-env", default = "default_api_key_env")]
    pub api_key_env: String,

    /// Ask the API to strip navigation, headers and footers
    #[serde(rename = "only-main-content", default = "default_true")]
    pub only_main_content: bool,

    /// Per-request timeout enforced by the HTTP client (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key_env: default_api_key_env(),
            only_main_content: true,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_link_pattern() -> String {
    DEFAULT_LINK_PATTERN.to_string()
}

fn default_max_passes() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1500
}

fn default_output_root() -> PathBuf {
    PathBuf::from("output")
}

fn default_endpoint() -> String {
    "https://api.firecrawl.dev".to_string()
}

fn default_api_key_env() -> String {
    "FIRECRAWL_API_KEY".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    120
}
