//! Crawler module for page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The shared frontier and visited set
//! - The scrapeability pre-check and the fetcher capability
//! - HTML extraction and link categorization
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod filter;
mod frontier;
mod links;
mod parser;

pub use coordinator::{run_configured, run_crawl, Coordinator, CrawlRun, DEFAULT_FETCH_TIMEOUT};
pub use fetcher::{
    build_http_client, fetch_url, Fetcher, FetcherFactory, HttpFetcher, HttpFetcherFactory,
};
pub use filter::{assess_document, AcceptAll, HttpScrapeFilter, ScrapeFilter, Scrapeability};
pub use frontier::{Dispatch, Frontier, FrontierSnapshot, WorkerSlot};
pub use links::{categorize_document_links, categorize_links, CategorizedLinks};
pub use parser::{extract_page, visible_text, ExtractionResult, ImageRef};

pub use crate::output::CrawlReport;
