//! Sitemap-Scribe main entry point
//!
//! This is the command-line interface for the Sitemap-Scribe page archiver.

use anyhow::Context;
use clap::Parser;
use sitemap_scribe::config::{
    load_config_with_hash, resolve_api_key, validate, ApiConfig, Config,
};
use sitemap_scribe::crawler::build_coordinator;
use sitemap_scribe::output::{generate_markdown_summary, print_summary};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Sitemap-Scribe: archive every page listed on a sitemap
///
/// Sitemap-Scribe scrapes a sitemap page through the Firecrawl API, collects
/// the links under a base URL, and saves each page as a CSV record and a PDF.
/// Failed pages are retried over several passes with a growing delay.
#[derive(Parser, Debug)]
#[command(name = "sitemap-scribe")]
#[command(version)]
#[command(about = "Archive every page listed on a sitemap", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Fetch the sitemap and list the URLs that would be scraped
    #[arg(long)]
    dry_run: bool,

    /// Override the number of retry passes
    #[arg(long, value_name = "N")]
    max_passes: Option<u32>,

    /// Override the base delay between requests, in milliseconds
    #[arg(long, value_name = "MS")]
    base_delay_ms: Option<u64>,

    /// Override the output root directory
    #[arg(long, value_name = "DIR")]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let (config, api_key) = prepare(&cli)?;

    if cli.dry_run {
        handle_dry_run(config, api_key).await
    } else {
        handle_crawl(config, api_key).await
    }
}

/// Resolves the API key, then loads the config and applies CLI overrides
///
/// The credential is checked before the config is reported on, so a missing
/// key surfaces even when the config file is unusable. Its variable name comes
/// from the config when that loads, and from the defaults otherwise.
fn prepare(cli: &Cli) -> anyhow::Result<(Config, String)> {
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let loaded = load_config_with_hash(&cli.config);

    let api = match &loaded {
        Ok((config, _)) => config.api.clone(),
        Err(_) => ApiConfig::default(),
    };
    let api_key = resolve_api_key(&api)?;

    let (mut config, config_hash) = loaded
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    apply_overrides(&mut config, cli);
    validate(&config).context("Invalid command-line override")?;

    Ok((config, api_key))
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitemap_scribe=info,warn"),
            1 => EnvFilter::new("sitemap_scribe=debug,info"),
            2 => EnvFilter::new("sitemap_scribe=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(max_passes) = cli.max_passes {
        config.retry.max_passes = max_passes;
    }
    if let Some(base_delay_ms) = cli.base_delay_ms {
        config.retry.base_delay_ms = base_delay_ms;
    }
    if let Some(output) = &cli.output {
        config.output.root = output.clone();
    }
}

/// Handles the --dry-run mode: lists the URLs the sitemap yields
async fn handle_dry_run(config: Config, api_key: String) -> anyhow::Result<()> {
    println!("=== Sitemap-Scribe Dry Run ===\n");
    println!("Sitemap: {}", config.sitemap.source_url);
    println!("Base URL: {}", config.sitemap.base_url);
    println!(
        "Retry: {} passes, {}ms base delay",
        config.retry.max_passes, config.retry.base_delay_ms
    );
    println!("Output: {}", config.output.root.display());

    let coordinator = build_coordinator(config, api_key)?;
    let urls = coordinator.discover_urls().await?;

    println!("\nURLs to scrape ({}):", urls.len());
    for url in &urls {
        println!("  - {}", url);
    }

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, api_key: String) -> anyhow::Result<()> {
    let summary_path = config.output.summary_path.clone();

    let coordinator = build_coordinator(config, api_key)?;
    let summary = coordinator.run().await.context("Crawl failed")?;

    print_summary(&summary);

    if let Some(path) = summary_path {
        generate_markdown_summary(&summary, &path)
            .with_context(|| format!("Failed to write summary to {}", path.display()))?;
        tracing::info!("Summary exported to: {}", path.display());
    }

    Ok(())
}
