//! Markdown summary generation
//!
//! This module renders a finished crawl as a markdown report: run
//! information, overall statistics, per-host counts, and the error table.

use crate::output::stats::CrawlStats;
use crate::output::OutputResult;
use crate::state::CrawlResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown summary of a crawl to `output_path`
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn write_markdown_summary(
    stats: &CrawlStats,
    result: &CrawlResult,
    output_path: &Path,
) -> OutputResult<()> {
    let markdown = format_markdown_summary(stats, result);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl as markdown
pub fn format_markdown_summary(stats: &CrawlStats, result: &CrawlResult) -> String {
    let mut md = String::new();

    md.push_str("# Crawl Summary\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Seed**: {}\n", stats.seed));
    md.push_str(&format!("- **Depth**: {}\n", stats.depth));
    md.push_str(&format!("- **Started**: {}\n", stats.started_at.to_rfc3339()));
    md.push_str(&format!("- **Finished**: {}\n", stats.finished_at.to_rfc3339()));
    md.push_str(&format!("- **Duration**: {} ms\n\n", stats.duration_ms()));

    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Downloaded**: {}\n", stats.downloaded));
    md.push_str(&format!("- **Failed Downloads**: {}\n", stats.failed));
    md.push_str(&format!("- **Malformed URLs**: {}\n", stats.malformed));
    md.push_str(&format!(
        "- **Success Rate**: {:.2}%\n\n",
        stats.success_rate()
    ));

    if !stats.pages_by_host.is_empty() {
        md.push_str("## Pages by Host\n\n");
        md.push_str("| Host | Pages |\n");
        md.push_str("|------|-------|\n");
        for (host, count) in &stats.pages_by_host {
            md.push_str(&format!("| {} | {} |\n", host, count));
        }
        md.push('\n');
    }

    if !result.errors.is_empty() {
        md.push_str("## Errors\n\n");
        md.push_str("| URL | Error |\n");
        md.push_str("|-----|-------|\n");

        let mut errors: Vec<_> = result.errors.iter().collect();
        errors.sort_by(|a, b| a.0.cmp(b.0));
        for (url, error) in errors {
            md.push_str(&format!("| {} | {} |\n", url, escape_cell(&error.to_string())));
        }
        md.push('\n');
    }

    md
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
