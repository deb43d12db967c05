//! Markdown summary generation
//!
//! This module generates a human-readable markdown summary of a finished
//! crawl run: run parameters, outcome breakdown and rates.

use crate::output::traits::{CrawlReport, OutputResult};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Writes a markdown summary of a crawl report
///
/// Parent directories of `output_path` are created if missing.
pub fn generate_markdown_summary(report: &CrawlReport, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(report);

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl report as markdown
pub fn format_markdown_summary(report: &CrawlReport) -> String {
    let mut md = String::new();

    md.push_str("# Sumi-Harvest Crawl Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Seed URL**: {}\n", report.seed_url));
    md.push_str(&format!("- **Target Domain**: {}\n", report.target_domain));
    md.push_str(&format!("- **Output Root**: {}\n", report.output_root));
    md.push_str(&format!("- **Workers**: {}\n", report.max_workers));
    md.push_str(&format!("- **Started**: {}\n", report.started_at.to_rfc3339()));
    md.push_str(&format!("- **Finished**: {}\n", report.finished_at.to_rfc3339()));
    let seconds = report.duration().num_milliseconds() as f64 / 1000.0;
    md.push_str(&format!(
        "- **Duration**: {:.1} seconds ({:.2} minutes)\n",
        seconds,
        seconds / 60.0
    ));
    md.push_str(&format!("- **Status**: {}\n", report.status));
    if let Some(hash) = &report.config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push('\n');

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **URLs Visited**: {}\n", report.urls_visited));
    md.push_str(&format!("- **Pages Dispatched**: {}\n", report.pages_dispatched));
    md.push_str(&format!("- **Links Enqueued**: {}\n", report.links_enqueued));
    md.push_str(&format!("- **Total Errors**: {}\n", report.total_errors()));
    md.push_str(&format!("- **Success Rate**: {:.2}%\n", report.success_rate()));
    md.push_str(&format!("- **Error Rate**: {:.2}%\n\n", report.error_rate()));

    // Outcome breakdown
    md.push_str("## Page Outcome Breakdown\n\n");
    md.push_str("| Outcome | Count |\n");
    md.push_str("|---------|-------|\n");
    md.push_str(&format!("| Persisted | {} |\n", report.pages_persisted));
    md.push_str(&format!("| Skipped (not scrapeable) | {} |\n", report.pages_skipped));
    md.push_str(&format!("| Fetch Failed | {} |\n", report.pages_fetch_failed));
    md.push_str(&format!("| Extract Failed | {} |\n", report.pages_extract_failed));
    md.push_str(&format!("| Persist Failed | {} |\n", report.pages_persist_failed));
    md.push_str(&format!("| Crashed | {} |\n\n", report.pages_crashed));

    md
}
