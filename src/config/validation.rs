use crate::config::types::{ApiConfig, Config, OutputConfig, RetryConfig, SitemapConfig};
use crate::ConfigError;
use regex::Regex;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_sitemap_config(&config.sitemap)?;
    validate_retry_config(&config.retry)?;
    validate_output_config(&config.output)?;
    validate_api_config(&config.api)?;
    Ok(())
}

/// Validates the sitemap source, base prefix and link pattern
fn validate_sitemap_config(config: &SitemapConfig) -> Result<(), ConfigError> {
    Url::parse(&config.source_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid source-url '{}': {}", config.source_url, e))
    })?;

    // The base URL is matched as a raw prefix, but it still has to look like one
    if config.base_url.is_empty() {
        return Err(ConfigError::Validation(
            "base-url cannot be empty".to_string(),
        ));
    }
    Url::parse(&config.base_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid base-url '{}': {}", config.base_url, e))
    })?;

    let pattern = Regex::new(&config.link_pattern)
        .map_err(|e| ConfigError::InvalidPattern(e.to_string()))?;
    if pattern.captures_len() < 2 {
        return Err(ConfigError::InvalidPattern(format!(
            "link-pattern '{}' must contain a capture group for the URL",
            config.link_pattern
        )));
    }

    Ok(())
}

/// Validates retry tunables
fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if config.max_passes < 1 {
        return Err(ConfigError::Validation(format!(
            "max-passes must be >= 1, got {}",
            config.max_passes
        )));
    }

    // A zero base delay would make every pass wait the same (nothing)
    if config.base_delay_ms < 1 {
        return Err(ConfigError::Validation(format!(
            "base-delay-ms must be >= 1ms, got {}ms",
            config.base_delay_ms
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.root.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output root cannot be empty".to_string(),
        ));
    }

    if let Some(path) = &config.summary_path {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "summary-path cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates API configuration
fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    let endpoint = Url::parse(&config.endpoint).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid api endpoint '{}': {}", config.endpoint, e))
    })?;
    if !matches!(endpoint.scheme(), "http" | "https") {
        return Err(ConfigError::Validation(format!(
            "api endpoint must use http or https, got '{}'",
            endpoint.scheme()
        )));
    }

    if config.api_key_env.is_empty() {
        return Err(ConfigError::Validation(
            "api-key-env cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}
