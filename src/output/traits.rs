//! Output sink traits and types
//!
//! This module defines the trait interface for output sinks and the
//! run-level report produced when a crawl terminates.

use crate::crawler::{ExtractionResult, WorkerSlot};
use crate::state::CrawlPhase;
use chrono::{DateTime, Utc};
use thiserror::Error;
use url::Url;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No output bundle for slot {0}")]
    MissingBundle(WorkerSlot),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Trait for output sinks
///
/// A sink durably stores one extraction result per visited page. Bundles are
/// addressed by the worker slot that produced them; the page URL is passed
/// along so the sink can record it inside the bundle. Implementations must
/// be thread-safe: workers call `persist` concurrently with distinct slots.
pub trait OutputSink: Send + Sync {
    /// Persists the extraction result of one page
    ///
    /// # Arguments
    ///
    /// * `slot` - The worker slot that produced the result
    /// * `page_url` - URL of the page the result was extracted from
    /// * `result` - The extraction result
    fn persist(&self, slot: WorkerSlot, page_url: &Url, result: &ExtractionResult)
        -> OutputResult<()>;
}

/// Final report of one crawl run
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlReport {
    // Run metadata
    pub seed_url: String,
    pub target_domain: String,
    pub output_root: String,
    pub max_workers: usize,
    pub config_hash: Option<String>,
    pub status: CrawlPhase,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    // Frontier totals
    pub urls_visited: u64,
    pub links_enqueued: u64,

    // Outcome breakdown
    pub pages_dispatched: u64,
    pub pages_persisted: u64,
    pub pages_skipped: u64,
    pub pages_fetch_failed: u64,
    pub pages_extract_failed: u64,
    pub pages_persist_failed: u64,
    pub pages_crashed: u64,
}

impl CrawlReport {
    /// Wall-clock duration of the run
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// Total number of pages that ended in an error
    pub fn total_errors(&self) -> u64 {
        self.pages_fetch_failed
            + self.pages_extract_failed
            + self.pages_persist_failed
            + self.pages_crashed
    }

    /// Returns the success rate as a percentage of dispatched pages
    pub fn success_rate(&self) -> f64 {
        if self.pages_dispatched == 0 {
            return 0.0;
        }
        (self.pages_persisted as f64 / self.pages_dispatched as f64) * 100.0
    }

    /// Returns the error rate as a percentage of dispatched pages
    pub fn error_rate(&self) -> f64 {
        if self.pages_dispatched == 0 {
            return 0.0;
        }
        (self.total_errors() as f64 / self.pages_dispatched as f64) * 100.0
    }
}
