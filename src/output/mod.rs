//! Output module for persisting crawl results
//!
//! This module handles:
//! - Persisting one record bundle per visited page
//! - Recording crawl statistics
//! - Generating markdown summaries of finished runs

mod json_sink;
mod markdown;
mod stats;
mod traits;

pub use json_sink::{JsonFileSink, LinksFacet, PageBundle};
pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::{CrawlStatistics, StatsSnapshot};
pub use traits::{CrawlReport, OutputError, OutputResult, OutputSink};
