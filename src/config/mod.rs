//! Configuration module for Sumi-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use sumi_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Crawl will use {} workers", config.crawl.max_workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlConfig, FetcherConfig, OutputConfig, ScrapeFilterConfig, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, hash_content, load_config, load_config_with_hash, parse_config,
    read_config,
};

// Re-export validation entry points
pub use validation::{
    validate, validate_seed_url, validate_target_domain, validate_worker_count, MAX_WORKERS,
};
