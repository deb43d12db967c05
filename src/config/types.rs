use serde::Deserialize;

/// Browser-like user agent sent by the pre-check and the bundled fetcher
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Main configuration structure for Sumi-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawl: CrawlConfig,
    #[serde(rename = "scrape-filter", default)]
    pub scrape_filter: ScrapeFilterConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    pub output: OutputConfig,
}

/// Crawl run configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// Absolute URL the crawl starts from
    #[serde(rename = "seed-url")]
    pub seed_url: String,

    /// Substring a link's host must contain to count as internal
    #[serde(rename = "target-domain")]
    pub target_domain: String,

    /// Number of concurrent crawl workers
    #[serde(rename = "max-workers", default = "default_max_workers")]
    pub max_workers: u32,

    /// Upper bound on a single fetch (milliseconds)
    #[serde(rename = "fetch-timeout-ms", default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
}

/// Scrapeability pre-check configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScrapeFilterConfig {
    /// Whether to run the pre-check at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Minimum visible text length for a page to be worth fetching
    #[serde(rename = "min-text-length", default = "default_min_text_length")]
    pub min_text_length: usize,

    /// Timeout of the lightweight GET (milliseconds)
    #[serde(rename = "timeout-ms", default = "default_filter_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

/// Configuration of the bundled HTTP fetcher
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Connection establishment timeout (milliseconds)
    #[serde(rename = "connect-timeout-ms", default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory under which one bundle per visited page is written
    #[serde(rename = "output-root")]
    pub output_root: String,

    /// Optional path of the markdown run summary
    #[serde(rename = "summary-path", default)]
    pub summary_path: Option<String>,
}

impl Default for ScrapeFilterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_text_length: default_min_text_length(),
            timeout_ms: default_filter_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

fn default_max_workers() -> u32 {
    10
}

fn default_fetch_timeout_ms() -> u64 {
    30_000
}

fn default_true() -> bool {
    true
}

fn default_min_text_length() -> usize {
    50
}

fn default_filter_timeout_ms() -> u64 {
    10_000
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}
