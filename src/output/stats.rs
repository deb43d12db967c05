//! Crawl statistics
//!
//! Workers record the outcome of every dispatched page here; the counters
//! are lock-free so recording never contends with the frontier lock.

use crate::state::PageOutcome;
use std::sync::atomic::{AtomicU64, Ordering};

/// Live outcome counters shared by all workers
#[derive(Debug, Default)]
pub struct CrawlStatistics {
    dispatched: AtomicU64,
    persisted: AtomicU64,
    skipped: AtomicU64,
    fetch_failed: AtomicU64,
    extract_failed: AtomicU64,
    persist_failed: AtomicU64,
    crashed: AtomicU64,
    links_enqueued: AtomicU64,
    completed: AtomicU64,
}

/// Point-in-time copy of [`CrawlStatistics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub dispatched: u64,
    pub persisted: u64,
    pub skipped: u64,
    pub fetch_failed: u64,
    pub extract_failed: u64,
    pub persist_failed: u64,
    pub crashed: u64,
    pub links_enqueued: u64,
    /// Pages whose pipeline has finished, whatever the outcome
    pub completed: u64,
}

impl CrawlStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that a page was handed to a worker
    pub fn record_dispatch(&self) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
    }

    /// Records the outcome of a page and how many new URLs it enqueued
    ///
    /// Returns the number of completed pages including this one.
    pub fn record_outcome(&self, outcome: &PageOutcome, newly_enqueued: usize) -> u64 {
        let counter = match outcome {
            PageOutcome::Persisted { .. } => &self.persisted,
            PageOutcome::Skipped { .. } => &self.skipped,
            PageOutcome::FetchFailed { .. } => &self.fetch_failed,
            PageOutcome::ExtractFailed { .. } => &self.extract_failed,
            PageOutcome::PersistFailed { .. } => &self.persist_failed,
            PageOutcome::Crashed { .. } => &self.crashed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.links_enqueued
            .fetch_add(newly_enqueued as u64, Ordering::Relaxed);
        self.completed.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            dispatched: self.dispatched.load(Ordering::Relaxed),
            persisted: self.persisted.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            fetch_failed: self.fetch_failed.load(Ordering::Relaxed),
            extract_failed: self.extract_failed.load(Ordering::Relaxed),
            persist_failed: self.persist_failed.load(Ordering::Relaxed),
            crashed: self.crashed.load(Ordering::Relaxed),
            links_enqueued: self.links_enqueued.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
        }
    }
}
