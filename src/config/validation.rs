use crate::config::types::{Config, CrawlConfig, FetcherConfig, OutputConfig, ScrapeFilterConfig};
use crate::ConfigError;
use url::Url;

/// Largest worker pool a run may request
pub const MAX_WORKERS: u32 = 100;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawl_config(&config.crawl)?;
    validate_scrape_filter_config(&config.scrape_filter)?;
    validate_fetcher_config(&config.fetcher)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawl run configuration
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    validate_seed_url(&config.seed_url)?;
    validate_target_domain(&config.target_domain)?;
    validate_worker_count(config.max_workers)?;

    if config.fetch_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "fetch_timeout_ms must be > 0".to_string(),
        ));
    }

    Ok(())
}

/// Validates the scrapeability pre-check configuration
fn validate_scrape_filter_config(config: &ScrapeFilterConfig) -> Result<(), ConfigError> {
    if config.enabled && config.timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "scrape filter timeout_ms must be > 0".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "scrape filter user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "fetcher user_agent cannot be empty".to_string(),
        ));
    }

    if config.connect_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "fetcher connect_timeout_ms must be > 0".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.output_root.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output_root cannot be empty".to_string(),
        ));
    }

    if let Some(summary) = &config.summary_path {
        if summary.trim().is_empty() {
            return Err(ConfigError::Validation(
                "summary_path cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates the seed URL: absolute, HTTP(S), with a host
pub fn validate_seed_url(seed: &str) -> Result<(), ConfigError> {
    let url = Url::parse(seed)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' must use HTTP or HTTPS",
            seed
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' has no host",
            seed
        )));
    }

    Ok(())
}

/// Validates the target-domain string used for internal/external scoping
pub fn validate_target_domain(domain: &str) -> Result<(), ConfigError> {
    if domain.trim().is_empty() {
        return Err(ConfigError::Validation(
            "target_domain cannot be empty".to_string(),
        ));
    }

    if domain.chars().any(char::is_whitespace) {
        return Err(ConfigError::Validation(format!(
            "target_domain '{}' cannot contain whitespace",
            domain
        )));
    }

    if domain.contains('/') {
        return Err(ConfigError::Validation(format!(
            "target_domain '{}' must be a host fragment, not a URL",
            domain
        )));
    }

    Ok(())
}

/// Validates the worker pool size
pub fn validate_worker_count(workers: u32) -> Result<(), ConfigError> {
    if workers < 1 || workers > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "max_workers must be between 1 and {}, got {}",
            MAX_WORKERS, workers
        )));
    }
    Ok(())
}
