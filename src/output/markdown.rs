//! Markdown summary generation
//!
//! This module writes a human-readable record of a run next to the archived
//! pages: pass statistics, the files that were written, and every URL that
//! could not be scraped.

use crate::output::summary::RunSummary;
use crate::output::traits::OutputResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a markdown summary of the run to `output_path`
///
/// # Arguments
///
/// * `summary` - The run summary data
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(summary: &RunSummary, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(summary);

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a run summary as markdown
pub fn format_markdown_summary(summary: &RunSummary) -> String {
    let mut md = String::new();

    md.push_str("# Sitemap-Scribe Run Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Sitemap**: {}\n", summary.sitemap_url));
    md.push_str(&format!("- **Base URL**: {}\n", summary.base_url));
    md.push_str(&format!("- **Started**: {}\n", summary.started_at.to_rfc3339()));
    md.push_str(&format!("- **Finished**: {}\n", summary.finished_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {} seconds\n",
        summary.duration_seconds()
    ));
    md.push_str(&format!(
        "- **Output**: {}\n\n",
        summary.output_root.display()
    ));

    // Pass statistics
    md.push_str("## Statistics\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!("| URLs discovered | {} |\n", summary.urls_discovered));
    md.push_str(&format!(
        "| Passes run | {} / {} |\n",
        summary.passes_run, summary.max_passes
    ));
    md.push_str(&format!("| Fetch attempts | {} |\n", summary.total_attempts));
    md.push_str(&format!("| Saved | {} |\n", summary.success_count()));
    md.push_str(&format!(
        "| Permanently failed | {} |\n",
        summary.failure_count()
    ));
    md.push_str(&format!(
        "| Success rate | {:.2}% |\n\n",
        summary.success_rate()
    ));

    // Saved pages
    if !summary.saved.is_empty() {
        md.push_str("## Saved Pages\n\n");
        md.push_str("| URL | File |\n");
        md.push_str("|-----|------|\n");
        for page in &summary.saved {
            md.push_str(&format!("| {} | {} |\n", page.url, page.slug));
        }
        md.push('\n');
    }

    // Failures
    if summary.permanently_failed.is_empty() {
        md.push_str("No failed pages after all retries.\n");
    } else {
        md.push_str("## Permanently Failed\n\n");
        md.push_str("| URL | Attempts | Last Error |\n");
        md.push_str("|-----|----------|------------|\n");
        for failed in &summary.permanently_failed {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                failed.url,
                failed.attempts,
                failed.last_error.as_deref().unwrap_or("-").replace('|', "\\|")
            ));
        }
        md.push('\n');
    }

    md
}
