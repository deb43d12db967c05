//! Sumi-Harvest main entry point
//!
//! This is the command-line interface for the Sumi-Harvest page harvester.

use clap::Parser;
use std::path::PathBuf;
use sumi_harvest::config::{compute_config_hash, read_config, validate, Config};
use sumi_harvest::crawler::run_configured;
use tracing_subscriber::EnvFilter;

/// Sumi-Harvest: a breadth-first page harvester
///
/// Sumi-Harvest walks every page of a target domain reachable from a seed
/// URL and writes the metadata, images, links and visible text of each page
/// to its own directory under the output root.
#[derive(Parser, Debug)]
#[command(name = "sumi-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A breadth-first page harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Override the seed URL
    #[arg(long, value_name = "URL")]
    seed: Option<String>,

    /// Override the target domain
    #[arg(long, value_name = "DOMAIN")]
    domain: Option<String>,

    /// Override the output root directory
    #[arg(long, value_name = "DIR")]
    output: Option<String>,

    /// Override the number of concurrent workers
    #[arg(long, value_name = "N")]
    workers: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load configuration, apply overrides, then validate
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let mut config = match read_config(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };
    let config_hash = compute_config_hash(&cli.config)?;
    apply_overrides(&mut config, &cli);

    if let Err(e) = validate(&config) {
        tracing::error!("Invalid configuration: {}", e);
        return Err(e.into());
    }
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config, &config_hash);
        return Ok(());
    }

    handle_crawl(config, config_hash).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_harvest=info,warn"),
            1 => EnvFilter::new("sumi_harvest=debug,info"),
            2 => EnvFilter::new("sumi_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(seed) = &cli.seed {
        config.crawl.seed_url = seed.clone();
    }
    if let Some(domain) = &cli.domain {
        config.crawl.target_domain = domain.clone();
    }
    if let Some(output) = &cli.output {
        config.output.output_root = output.clone();
    }
    if let Some(workers) = cli.workers {
        config.crawl.max_workers = workers;
    }
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config, config_hash: &str) {
    println!("=== Sumi-Harvest Dry Run ===\n");

    println!("Crawl:");
    println!("  Seed URL: {}", config.crawl.seed_url);
    println!("  Target domain: {}", config.crawl.target_domain);
    println!("  Workers: {}", config.crawl.max_workers);
    println!("  Fetch timeout: {}ms", config.crawl.fetch_timeout_ms);

    println!("\nScrapeability pre-check:");
    if config.scrape_filter.enabled {
        println!(
            "  Minimum text length: {}",
            config.scrape_filter.min_text_length
        );
        println!("  Timeout: {}ms", config.scrape_filter.timeout_ms);
    } else {
        println!("  Disabled");
    }

    println!("\nFetcher:");
    println!("  User agent: {}", config.fetcher.user_agent);
    println!("  Connect timeout: {}ms", config.fetcher.connect_timeout_ms);

    println!("\nOutput:");
    println!("  Root: {}", config.output.output_root);
    match &config.output.summary_path {
        Some(path) => println!("  Summary: {}", path),
        None => println!("  Summary: (none)"),
    }

    println!("\n✓ Configuration is valid (hash: {})", config_hash);
    println!("✓ Would start crawling from {}", config.crawl.seed_url);
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, config_hash: String) -> Result<(), Box<dyn std::error::Error>> {
    match run_configured(&config, Some(config_hash)).await {
        Ok(report) => {
            tracing::info!(
                "Crawl completed: {} visited, {} persisted, {} skipped, {} errors ({:.1}% success)",
                report.urls_visited,
                report.pages_persisted,
                report.pages_skipped,
                report.total_errors(),
                report.success_rate()
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
