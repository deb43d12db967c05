//! State module for tracking crawl progress
//!
//! This module provides the state definitions shared by the crawl engine.
//!
//! # Components
//!
//! - `CrawlPhase`: Lifecycle of one crawl run (seeded, running, draining, terminated)
//! - `PageOutcome`: What happened to a single dispatched URL

mod page_outcome;
mod run_phase;

// Re-export main types
pub use page_outcome::PageOutcome;
pub use run_phase::CrawlPhase;
