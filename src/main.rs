//! Sift main entry point
//!
//! This is the command-line interface for the Sift relevance-filtered crawler.

use anyhow::{bail, Context};
use clap::Parser;
use std::path::PathBuf;
use sift_crawl::cache::CacheStore;
use sift_crawl::config::{load_config_with_hash, Config};
use sift_crawl::crawler::{crawl_swarm, CrawlOutcome, Crawler};
use sift_crawl::output::print_report;
use tracing_subscriber::EnvFilter;

/// How many accepted pages the console report lists
const REPORT_TOP: usize = 20;

/// Sift: a relevance-filtered web crawler
///
/// Sift crawls outward from seed URLs, scores each page against a list of
/// search terms, and only follows links out of pages that match often enough.
#[derive(Parser, Debug)]
#[command(name = "sift-crawl")]
#[command(version = "1.0.0")]
#[command(about = "A relevance-filtered web crawler", long_about = None)]
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
    #[arg(long, conflicts_with_all = ["swarm", "cache_stats"])]
    dry_run: bool,

    /// Run one independent crawler per seed URL
    #[arg(long, conflicts_with_all = ["dry_run", "cache_stats"])]
    swarm: bool,

    /// Show cache occupancy and exit
    #[arg(long, conflicts_with_all = ["dry_run", "swarm"])]
    cache_stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e).context("invalid configuration");
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
        Ok(())
    } else if cli.cache_stats {
        handle_cache_stats(&config)
    } else if cli.swarm {
        handle_swarm(config).await
    } else {
        handle_crawl(config).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sift_crawl=info,warn"),
            1 => EnvFilter::new("sift_crawl=debug,info"),
            2 => EnvFilter::new("sift_crawl=trace,debug"),
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

/// Handles the --dry-run mode: shows the validated configuration
fn handle_dry_run(config: &Config) {
    println!("=== Sift Dry Run ===\n");

    println!("Crawl:");
    println!("  Page limit: {}", config.limit);
    println!("  Match threshold: {}", config.match_threshold);
    println!("  Workers: {}", config.workers);
    println!("  Request timeout: {}s", config.request_timeout_secs);
    println!("  Max redirects: {}", config.max_redirects);
    println!("  User agent: {}", config.user_agent);

    println!("\nCache:");
    println!("  Directory: {}", config.cache_dir.display());
    println!("  Limit: {} documents", config.cache_limit);

    if let Some(path) = &config.summary_path {
        println!("\nSummary: {}", path.display());
    }

    println!("\nTerms ({}):", config.terms.len());
    for term in &config.terms {
        println!("  - {}", term);
    }

    println!("\nStop Terms ({}):", config.stop_terms.len());
    for term in &config.stop_terms {
        println!("  - {}", term);
    }

    println!("\nSeeds ({}):", config.seeds.len());
    for seed in &config.seeds {
        println!("  * {}", seed);
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would start crawling with {} seed URLs",
        config.seeds.len()
    );
}

/// Handles the --cache-stats mode: shows cache occupancy
fn handle_cache_stats(config: &Config) -> anyhow::Result<()> {
    println!("Cache: {}\n", config.cache_dir.display());

    let cache = CacheStore::open(&config.cache_dir, config.cache_limit)
        .context("failed to open cache")?;

    println!("  Entries: {}", cache.len());
    println!(
        "  Stored records: {}",
        cache.stored_count().context("failed to count cache records")?
    );
    println!("  Capacity: {}", cache.capacity());

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        "Seeds: {}, Terms: {}, Stop terms: {}",
        config.seeds.len(),
        config.terms.len(),
        config.stop_terms.len()
    );

    match Crawler::new(config).crawl().await {
        CrawlOutcome::Completed(report) => {
            println!("Finished Crawling ({} pages accepted)\n", report.accepted_count());
            print_report(&report, REPORT_TOP);
            Ok(())
        }
        CrawlOutcome::Failed(reason) => {
            tracing::error!("Crawl failed: {}", reason);
            bail!("crawl failed: {}", reason)
        }
    }
}

/// Handles the --swarm mode: one crawler per seed
async fn handle_swarm(config: Config) -> anyhow::Result<()> {
    let results = crawl_swarm(config).await;

    let mut failed = 0usize;
    for result in &results {
        match &result.outcome {
            CrawlOutcome::Completed(report) => println!(
                "Finished Crawling {} ({} pages accepted)",
                result.seed,
                report.accepted_count()
            ),
            CrawlOutcome::Failed(reason) => {
                tracing::error!("Crawl from {} failed: {}", result.seed, reason);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} crawlers failed", failed, results.len());
    }
    Ok(())
}
