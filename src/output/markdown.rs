//! Markdown summary generation
//!
//! This module renders a human-readable markdown report of a crawl run,
//! including counts, per-category articles, and category failures.

use crate::output::summary::CrawlSummary;
use crate::output::OutputResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a markdown summary of a crawl to `output_path`
///
/// Parent directories are created if needed.
pub fn generate_markdown_summary(summary: &CrawlSummary, output_path: &Path) -> OutputResult<()> {
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

/// Formats a crawl summary as markdown
pub fn format_markdown_summary(summary: &CrawlSummary) -> String {
    let mut md = String::new();

    md.push_str("# News-Harvester Crawl Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Started**: {}\n", summary.started_at.to_rfc3339()));
    if let Some(finished) = summary.finished_at {
        md.push_str(&format!("- **Finished**: {}\n", finished.to_rfc3339()));
    }
    if let Some(duration) = summary.duration_seconds() {
        md.push_str(&format!(
            "- **Duration**: {} seconds ({:.2} minutes)\n",
            duration,
            duration as f64 / 60.0
        ));
    }
    md.push_str(&format!("- **Status**: {}\n", summary.status()));
    if let Some(hash) = &summary.config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push('\n');

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!(
        "- **Categories Discovered**: {}\n",
        summary.categories_discovered
    ));
    md.push_str(&format!(
        "- **Categories Completed**: {}\n",
        summary.categories_completed
    ));
    md.push_str(&format!("- **Listing Pages Walked**: {}\n", summary.pages_walked));
    md.push_str(&format!("- **Articles Scraped**: {}\n", summary.articles_scraped));
    md.push_str(&format!("- **Articles Failed**: {}\n", summary.articles_failed));
    md.push_str(&format!(
        "- **Articles Persisted**: {} ({} overwritten)\n",
        summary.articles_persisted, summary.articles_overwritten
    ));
    md.push_str(&format!("- **Persist Failures**: {}\n", summary.persist_failures));
    md.push_str(&format!(
        "- **Success Rate**: {:.2}%\n\n",
        summary.success_rate()
    ));

    // Per-category breakdown
    if !summary.articles_by_category.is_empty() {
        md.push_str("## Articles by Category\n\n");
        md.push_str("| Category | Articles |\n");
        md.push_str("|----------|----------|\n");
        for (category, count) in &summary.articles_by_category {
            md.push_str(&format!("| {} | {} |\n", category, count));
        }
        md.push('\n');
    }

    // Failures
    if !summary.category_failures.is_empty() {
        md.push_str("## Category Failures\n\n");
        md.push_str("| Category | Error |\n");
        md.push_str("|----------|-------|\n");
        for failure in &summary.category_failures {
            md.push_str(&format!(
                "| {} | {} |\n",
                failure.category,
                failure.error.replace('|', "\\|")
            ));
        }
        md.push('\n');
    }

    md
}
