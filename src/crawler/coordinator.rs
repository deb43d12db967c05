//! Crawler coordinator - main crawl orchestration logic
//!
//! This module runs one crawl from seed to termination:
//! - Validating the run parameters
//! - Opening one fetcher session per worker before anything is dispatched
//! - Driving the per-URL pipeline (filter, fetch, extract, persist, enqueue)
//! - Collecting outcome counters into the final [`CrawlReport`]

use crate::config::{
    validate_seed_url, validate_target_domain, validate_worker_count, Config, ScrapeFilterConfig,
};
use crate::crawler::fetcher::{Fetcher, FetcherFactory, HttpFetcherFactory};
use crate::crawler::filter::{AcceptAll, HttpScrapeFilter, ScrapeFilter, Scrapeability};
use crate::crawler::frontier::{Dispatch, Frontier, WorkerSlot};
use crate::crawler::links::CategorizedLinks;
use crate::crawler::parser::extract_page;
use crate::output::{
    generate_markdown_summary, CrawlReport, CrawlStatistics, JsonFileSink, OutputSink,
};
use crate::state::{CrawlPhase, PageOutcome};
use crate::url::CrawlTarget;
use crate::{ConfigError, FetchError, HarvestError};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::{JoinError, JoinSet};

/// Default upper bound on a single fetch
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Progress is logged every this many completed pages
const PROGRESS_INTERVAL: u64 = 10;

/// Parameters of one crawl run
#[derive(Debug, Clone)]
pub struct CrawlRun {
    seed: CrawlTarget,
    target_domain: String,
    output_root: PathBuf,
    max_workers: usize,
    fetch_timeout: Duration,
    config_hash: Option<String>,
}

impl CrawlRun {
    /// Validates and builds the parameters of a run
    ///
    /// # Errors
    ///
    /// Fails if the seed is not an absolute HTTP(S) URL, the target domain
    /// is empty or malformed, or `max_workers` is outside `1..=100`.
    pub fn new(
        seed_url: &str,
        target_domain: &str,
        output_root: impl Into<PathBuf>,
        max_workers: usize,
    ) -> Result<Self, HarvestError> {
        validate_seed_url(seed_url)?;
        validate_target_domain(target_domain)?;
        let workers = u32::try_from(max_workers).map_err(|_| {
            ConfigError::Validation(format!("max_workers {} is out of range", max_workers))
        })?;
        validate_worker_count(workers)?;

        Ok(Self {
            seed: CrawlTarget::parse(seed_url)?,
            target_domain: target_domain.to_string(),
            output_root: output_root.into(),
            max_workers,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            config_hash: None,
        })
    }

    /// Builds the run described by a loaded configuration
    pub fn from_config(config: &Config) -> Result<Self, HarvestError> {
        Self::new(
            &config.crawl.seed_url,
            &config.crawl.target_domain,
            &config.output.output_root,
            config.crawl.max_workers as usize,
        )?
        .with_fetch_timeout(Duration::from_millis(config.crawl.fetch_timeout_ms))
    }

    /// Sets the upper bound on a single fetch; zero is rejected
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Result<Self, HarvestError> {
        if timeout.is_zero() {
            return Err(
                ConfigError::Validation("fetch timeout must be greater than 0".to_string()).into(),
            );
        }
        self.fetch_timeout = timeout;
        Ok(self)
    }

    /// Records the hash of the configuration that produced this run
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }

    pub fn seed(&self) -> &CrawlTarget {
        &self.seed
    }

    pub fn target_domain(&self) -> &str {
        &self.target_domain
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }
}

/// Main crawler coordinator structure
///
/// Plugs the capabilities of a run together: where pages come from
/// (`FetcherFactory`), which pages are worth fetching (`ScrapeFilter`) and
/// where results go (`OutputSink`).
pub struct Coordinator {
    run: Arc<CrawlRun>,
    fetchers: Arc<dyn FetcherFactory>,
    filter: Arc<dyn ScrapeFilter>,
    sink: Arc<dyn OutputSink>,
}

impl Coordinator {
    pub fn new(
        run: CrawlRun,
        fetchers: Arc<dyn FetcherFactory>,
        filter: Arc<dyn ScrapeFilter>,
        sink: Arc<dyn OutputSink>,
    ) -> Self {
        Self {
            run: Arc::new(run),
            fetchers,
            filter,
            sink,
        }
    }

    /// Runs the crawl until the frontier is exhausted
    ///
    /// Per-page failures never abort the run; they are counted in the
    /// returned report, a panicking page pipeline included. The only fatal
    /// errors are a fetcher session that cannot be opened and worker tasks
    /// dying before the run terminated.
    pub async fn run(self) -> Result<CrawlReport, HarvestError> {
        let started_at = Utc::now();
        let start_time = Instant::now();

        // All sessions up front, so a broken backend fails before dispatch
        let mut sessions: Vec<Arc<dyn Fetcher>> = Vec::with_capacity(self.run.max_workers);
        for _ in 0..self.run.max_workers {
            sessions.push(Arc::from(self.fetchers.open_session()?));
        }

        tracing::info!(
            "Starting crawl of {} (target domain: {}, workers: {})",
            self.run.seed,
            self.run.target_domain,
            self.run.max_workers
        );

        let frontier = Arc::new(Frontier::seeded(self.run.seed.clone()));
        let stats = Arc::new(CrawlStatistics::new());

        let mut workers = JoinSet::new();
        for (id, session) in sessions.into_iter().enumerate() {
            let worker = Worker {
                id,
                pipeline: PagePipeline {
                    session,
                    run: Arc::clone(&self.run),
                    filter: Arc::clone(&self.filter),
                    sink: Arc::clone(&self.sink),
                },
                frontier: Arc::clone(&frontier),
                stats: Arc::clone(&stats),
                start_time,
            };
            workers.spawn(worker.run());
        }

        let mut worker_failures = Vec::new();
        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Crawl worker failed: {}", e);
                worker_failures.push(e.to_string());
            }
        }

        let snapshot = frontier.snapshot();
        if snapshot.phase != CrawlPhase::Terminated {
            return Err(HarvestError::Worker(format!(
                "all workers exited with {} URLs still queued: {}",
                snapshot.queued,
                worker_failures.join("; ")
            )));
        }

        let counts = stats.snapshot();
        tracing::info!(
            "Crawl completed: {} pages processed ({} persisted) in {:?}",
            counts.completed,
            counts.persisted,
            start_time.elapsed()
        );

        Ok(CrawlReport {
            seed_url: self.run.seed.to_string(),
            target_domain: self.run.target_domain.clone(),
            output_root: self.run.output_root.display().to_string(),
            max_workers: self.run.max_workers,
            config_hash: self.run.config_hash.clone(),
            status: snapshot.phase,
            started_at,
            finished_at: Utc::now(),
            urls_visited: snapshot.visited as u64,
            links_enqueued: counts.links_enqueued,
            pages_dispatched: counts.dispatched,
            pages_persisted: counts.persisted,
            pages_skipped: counts.skipped,
            pages_fetch_failed: counts.fetch_failed,
            pages_extract_failed: counts.extract_failed,
            pages_persist_failed: counts.persist_failed,
            pages_crashed: counts.crashed,
        })
    }
}

/// One long-lived crawl worker owning a fetcher session
struct Worker {
    id: usize,
    pipeline: PagePipeline,
    frontier: Arc<Frontier>,
    stats: Arc<CrawlStatistics>,
    start_time: Instant,
}

impl Worker {
    async fn run(self) {
        tracing::trace!("Worker {} started", self.id);

        while let Some(dispatch) = self.frontier.next().await {
            self.stats.record_dispatch();

            // A panic inside the page task ends only this page
            let page = self
                .pipeline
                .clone()
                .process(dispatch.slot(), dispatch.target().clone());
            let (outcome, discovered) = match tokio::spawn(page).await {
                Ok(processed) => processed,
                Err(e) => (
                    PageOutcome::Crashed {
                        error: crash_reason(e),
                    },
                    Vec::new(),
                ),
            };
            log_outcome(&dispatch, &outcome);

            let added = dispatch.finish(discovered);
            let completed = self.stats.record_outcome(&outcome, added);

            if completed % PROGRESS_INTERVAL == 0 {
                let snapshot = self.frontier.snapshot();
                let rate = completed as f64 / self.start_time.elapsed().as_secs_f64();
                tracing::info!(
                    "Progress: {} pages processed, {} queued, {} in flight, {:.2} pages/sec",
                    completed,
                    snapshot.queued,
                    snapshot.in_flight,
                    rate
                );
            }
        }

        tracing::trace!("Worker {} exiting", self.id);
    }
}

/// The per-URL pipeline of one worker, bound to that worker's session
#[derive(Clone)]
struct PagePipeline {
    session: Arc<dyn Fetcher>,
    run: Arc<CrawlRun>,
    filter: Arc<dyn ScrapeFilter>,
    sink: Arc<dyn OutputSink>,
}

impl PagePipeline {
    /// Runs the pipeline for one URL
    ///
    /// Returns the outcome and the internal links to enqueue. Links are
    /// returned whenever extraction succeeded, even if persisting failed.
    async fn process(
        self,
        slot: WorkerSlot,
        target: CrawlTarget,
    ) -> (PageOutcome, Vec<CrawlTarget>) {
        let url = target.url();

        match self.filter.check(url).await {
            Scrapeability::Scrapeable => {}
            Scrapeability::Rejected { reason } | Scrapeability::Unreachable { reason } => {
                return (PageOutcome::Skipped { reason }, Vec::new());
            }
        }

        let html = match tokio::time::timeout(self.run.fetch_timeout, self.session.fetch(url)).await
        {
            Ok(Ok(html)) => html,
            Ok(Err(e)) => {
                return (
                    PageOutcome::FetchFailed {
                        error: e.to_string(),
                    },
                    Vec::new(),
                )
            }
            Err(_) => {
                let error = FetchError::Timeout {
                    url: url.to_string(),
                };
                return (
                    PageOutcome::FetchFailed {
                        error: error.to_string(),
                    },
                    Vec::new(),
                );
            }
        };

        let result = match extract_page(&html, url, &self.run.target_domain) {
            Ok(result) => result,
            Err(e) => {
                return (
                    PageOutcome::ExtractFailed {
                        error: e.to_string(),
                    },
                    Vec::new(),
                )
            }
        };

        let discovered = internal_targets(&result.links);
        let internal_links = discovered.len();

        let sink = Arc::clone(&self.sink);
        let page_url = url.clone();
        let persisted =
            tokio::task::spawn_blocking(move || sink.persist(slot, &page_url, &result)).await;

        let outcome = match persisted {
            Ok(Ok(())) => PageOutcome::Persisted { internal_links },
            Ok(Err(e)) => PageOutcome::PersistFailed {
                error: e.to_string(),
                internal_links,
            },
            Err(e) => PageOutcome::PersistFailed {
                error: format!("persist task failed: {}", e),
                internal_links,
            },
        };

        (outcome, discovered)
    }
}

/// Converts a page's internal links into crawl targets
///
/// Internal links that are not crawlable (non-HTTP schemes) are dropped.
fn internal_targets(links: &CategorizedLinks) -> Vec<CrawlTarget> {
    links
        .internal
        .iter()
        .filter_map(|link| match CrawlTarget::parse(link) {
            Ok(target) => Some(target),
            Err(e) => {
                tracing::debug!("Not following internal link {}: {}", link, e);
                None
            }
        })
        .collect()
}

/// Describes why a page task ended without returning an outcome
fn crash_reason(error: JoinError) -> String {
    if !error.is_panic() {
        return error.to_string();
    }
    let payload = error.into_panic();
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("page pipeline panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("page pipeline panicked: {}", message)
    } else {
        "page pipeline panicked".to_string()
    }
}

fn log_outcome(dispatch: &Dispatch, outcome: &PageOutcome) {
    let url = dispatch.target();
    if outcome.is_error() {
        tracing::warn!("Error processing {}: {}", url, outcome);
    } else if outcome.is_skipped() {
        tracing::info!("Not scraping {} ({})", url, outcome);
    } else {
        tracing::debug!(
            "Saved {} as scraper={} ({} internal links)",
            url,
            dispatch.slot(),
            outcome.internal_links()
        );
    }
}

/// Runs a complete crawl with the bundled HTTP fetcher, scrapeability
/// pre-check and JSON file output
///
/// # Arguments
///
/// * `seed_url` - Absolute URL the crawl starts from
/// * `target_domain` - Substring a link's host must contain to be followed
/// * `output_root` - Directory receiving one bundle per visited page
/// * `max_workers` - Number of concurrent workers (1..=100)
///
/// # Example
///
/// ```no_run
/// # async fn demo() -> Result<(), sumi_harvest::HarvestError> {
/// let report = sumi_harvest::run_crawl("https://example.com/", "example.com", "./out", 4).await?;
/// println!("{} pages persisted", report.pages_persisted);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    seed_url: &str,
    target_domain: &str,
    output_root: impl Into<PathBuf>,
    max_workers: usize,
) -> Result<CrawlReport, HarvestError> {
    let run = CrawlRun::new(seed_url, target_domain, output_root, max_workers)?;
    let filter = build_filter(&ScrapeFilterConfig::default())?;
    let fetchers = Arc::new(HttpFetcherFactory::new(Default::default()));
    let sink = Arc::new(JsonFileSink::new(run.output_root()));

    Coordinator::new(run, fetchers, filter, sink).run().await
}

/// Runs the crawl described by a configuration file
///
/// Writes the markdown summary afterwards when `summary-path` is set.
pub async fn run_configured(
    config: &Config,
    config_hash: Option<String>,
) -> Result<CrawlReport, HarvestError> {
    let mut run = CrawlRun::from_config(config)?;
    if let Some(hash) = config_hash {
        run = run.with_config_hash(hash);
    }

    let filter: Arc<dyn ScrapeFilter> = if config.scrape_filter.enabled {
        build_filter(&config.scrape_filter)?
    } else {
        tracing::info!("Scrapeability pre-check disabled");
        Arc::new(AcceptAll)
    };
    let fetchers = Arc::new(HttpFetcherFactory::new(config.fetcher.clone()));
    let sink = Arc::new(JsonFileSink::new(run.output_root()));

    let report = Coordinator::new(run, fetchers, filter, sink).run().await?;

    if let Some(summary_path) = &config.output.summary_path {
        generate_markdown_summary(&report, Path::new(summary_path))?;
        tracing::info!("Summary written to {}", summary_path);
    }

    Ok(report)
}

fn build_filter(config: &ScrapeFilterConfig) -> Result<Arc<dyn ScrapeFilter>, HarvestError> {
    let filter = HttpScrapeFilter::new(config)
        .map_err(|e| FetchError::Session(format!("scrape filter client: {}", e)))?;
    Ok(Arc::new(filter))
}
