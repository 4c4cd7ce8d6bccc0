//! Crawl engine - main crawl orchestration logic
//!
//! This module contains the crawl loop that ties the other pieces together:
//! - Validating the configuration and opening the cache
//! - Seeding the frontier
//! - Running page tasks on a bounded worker pool
//! - Scoring pages and feeding links of accepted pages back to the frontier
//! - Producing exactly one terminal outcome per run

use crate::cache::CacheStore;
use crate::config::{validate, Config};
use crate::crawler::fetcher::{build_http_client, FetchResult, Fetcher};
use crate::crawler::frontier::{Frontier, FrontierEntry};
use crate::matcher::{MatchResult, TermMatcher};
use crate::output::{write_markdown_report, CrawlReport};
use crate::state::{CrawlStatus, PageOutcome};
use crate::url::{normalize_url, CrawlUrl};
use crate::SiftError;
use chrono::Utc;
use std::sync::Arc;
use tokio::task::JoinSet;

/// How often (in processed pages) progress is logged
const PROGRESS_INTERVAL: usize = 10;

/// Terminal result of a crawl
#[derive(Debug, Clone)]
pub enum CrawlOutcome {
    /// The run finished normally: frontier drained or page limit reached
    Completed(CrawlReport),

    /// The run halted on a systemic fault
    Failed(String),
}

impl CrawlOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// Accepted page count for a completed run
    pub fn accepted_count(&self) -> Option<usize> {
        match self {
            Self::Completed(report) => Some(report.accepted_count()),
            Self::Failed(_) => None,
        }
    }

    pub fn report(&self) -> Option<&CrawlReport> {
        match self {
            Self::Completed(report) => Some(report),
            Self::Failed(_) => None,
        }
    }
}

/// Shared, read-only context handed to every page task
struct PageContext {
    fetcher: Fetcher,
    matcher: TermMatcher,
    threshold: usize,
}

/// What a page task reports back to the coordinator
#[derive(Debug)]
struct PageResult {
    entry: FrontierEntry,
    outcome: PageOutcome,
    score: MatchResult,
    /// Links to offer to the frontier; empty unless the page was accepted
    links: Vec<CrawlUrl>,
    from_cache: bool,
}

/// Mutable state of one run, owned by the coordinator loop
struct CrawlState {
    frontier: Frontier,
    report: CrawlReport,
}

impl CrawlState {
    fn new(limit: usize) -> Self {
        Self {
            frontier: Frontier::new(limit),
            report: CrawlReport::new(Utc::now()),
        }
    }

    /// Folds a finished page into the run state
    fn record(&mut self, page: PageResult) {
        self.report.processed += 1;
        if page.from_cache {
            self.report.cache_hits += 1;
        }

        match page.outcome {
            PageOutcome::Accepted => {
                let mut admitted = 0usize;
                for link in page.links {
                    if self.frontier.enqueue(link, page.entry.depth + 1) {
                        admitted += 1;
                    }
                }
                tracing::debug!(
                    "Accepted {} (depth {}, score {}), {} new links queued",
                    page.entry.url,
                    page.entry.depth,
                    page.score.match_count,
                    admitted
                );
                self.report.accepted.push(page.score);
            }
            PageOutcome::Rejected => {
                tracing::debug!(
                    "Rejected {} (depth {}, score {})",
                    page.entry.url,
                    page.entry.depth,
                    page.score.match_count
                );
            }
            PageOutcome::SoftFailed(err) => {
                tracing::warn!("{}", err);
                self.report.failures.push(err);
            }
        }

        if self.report.processed % PROGRESS_INTERVAL == 0 {
            tracing::info!(
                "Progress: {} / {} pages processed, {} accepted, {} in frontier",
                self.report.processed,
                self.frontier.limit(),
                self.report.accepted_count(),
                self.frontier.len()
            );
        }
    }
}

/// The crawl engine
///
/// Built from a [`Config`]; [`Crawler::crawl`] is the single entry point.
/// Calling `crawl` again on the same engine starts a fresh run with a new
/// frontier; nothing carries over except what is in the on-disk cache.
///
/// # Example
///
/// ```no_run
/// use sift_crawl::{Config, CrawlOutcome, Crawler};
///
/// # async fn example() {
/// let mut config = Config::new(vec!["https://en.wikipedia.org/wiki/Algorithm".to_string()], 50, 2);
/// config.terms = vec!["algorithm".to_string(), "data".to_string()];
///
/// match Crawler::new(config).crawl().await {
///     CrawlOutcome::Completed(report) => println!("{} pages accepted", report.accepted_count()),
///     CrawlOutcome::Failed(reason) => eprintln!("crawl failed: {}", reason),
/// }
/// # }
/// ```
pub struct Crawler {
    config: Config,
    status: CrawlStatus,
    shared_cache: Option<Arc<CacheStore>>,
}

impl Crawler {
    /// Creates an idle engine; nothing is opened until `crawl` runs
    pub fn new(mut config: Config) -> Self {
        config.normalize_terms();
        Self {
            config,
            status: CrawlStatus::Idle,
            shared_cache: None,
        }
    }

    /// Creates an idle engine that uses an already opened cache
    ///
    /// Used when several engines run side by side against one cache directory,
    /// so that they share a single capacity bound.
    pub fn with_cache(config: Config, cache: Arc<CacheStore>) -> Self {
        let mut crawler = Self::new(config);
        crawler.shared_cache = Some(cache);
        crawler
    }

    pub fn status(&self) -> CrawlStatus {
        self.status
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs a crawl to completion
    ///
    /// Returns exactly one terminal outcome. Per-page failures are absorbed
    /// into the report; only systemic faults produce [`CrawlOutcome::Failed`].
    pub async fn crawl(&mut self) -> CrawlOutcome {
        if let Err(e) = self.transition(CrawlStatus::Running) {
            return CrawlOutcome::Failed(e.to_string());
        }

        tracing::info!(
            "Starting crawl: {} seeds, limit {}, match threshold {}, {} workers",
            self.config.seeds.len(),
            self.config.limit,
            self.config.match_threshold,
            self.config.workers
        );

        let (next, outcome) = match self.run().await {
            Ok(report) => {
                tracing::info!(
                    "Crawl completed: {} processed, {} accepted, {} soft failures in {}s",
                    report.processed,
                    report.accepted_count(),
                    report.soft_failures(),
                    report.duration().num_seconds()
                );
                (CrawlStatus::Completed, CrawlOutcome::Completed(report))
            }
            Err(e) => {
                tracing::error!("Crawl failed: {}", e);
                (CrawlStatus::Failed, CrawlOutcome::Failed(e.to_string()))
            }
        };

        match self.transition(next) {
            Ok(()) => outcome,
            Err(e) => CrawlOutcome::Failed(e.to_string()),
        }
    }

    fn transition(&mut self, next: CrawlStatus) -> Result<(), SiftError> {
        if !self.status.can_transition_to(next) {
            return Err(SiftError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        tracing::trace!("Crawler state {} -> {}", self.status, next);
        self.status = next;
        Ok(())
    }

    /// Opens the run's resources and drives the worker pool
    async fn run(&self) -> crate::Result<CrawlReport> {
        validate(&self.config)?;

        let cache = match &self.shared_cache {
            Some(cache) => Arc::clone(cache),
            None => Arc::new(CacheStore::open(
                &self.config.cache_dir,
                self.config.cache_limit,
            )?),
        };
        tracing::debug!(
            "Cache at {} holds {} / {} entries",
            self.config.cache_dir.display(),
            cache.len(),
            cache.capacity()
        );

        let client = build_http_client(&self.config)?;
        let context = Arc::new(PageContext {
            fetcher: Fetcher::new(client, cache),
            matcher: TermMatcher::new(&self.config.terms, &self.config.stop_terms),
            threshold: self.config.threshold(),
        });

        if context.matcher.has_no_terms() {
            tracing::warn!("No search terms configured; only seed pages can be accepted");
        }

        let mut state = CrawlState::new(self.config.limit);
        for seed in &self.config.seeds {
            let url = normalize_url(seed)?;
            if !state.frontier.enqueue(url, 0) {
                tracing::debug!("Seed {} not queued (duplicate or over limit)", seed);
            }
        }

        let mut tasks: JoinSet<crate::Result<PageResult>> = JoinSet::new();

        loop {
            // Dequeue (and count) pages only while a worker slot is free
            while tasks.len() < self.config.workers {
                let Some(entry) = state.frontier.dequeue() else {
                    break;
                };
                tracing::debug!("Processing {} (depth {})", entry.url, entry.depth);
                tasks.spawn(process_page(Arc::clone(&context), entry));
            }

            let Some(joined) = tasks.join_next().await else {
                // Nothing in flight and nothing left to hand out
                break;
            };

            match joined {
                Ok(Ok(page)) => state.record(page),
                Ok(Err(e)) => {
                    tasks.shutdown().await;
                    return Err(e);
                }
                Err(join_error) => {
                    tasks.shutdown().await;
                    return Err(SiftError::Worker(join_error.to_string()));
                }
            }
        }

        if state.frontier.is_exhausted() {
            tracing::info!("Page limit of {} reached", state.frontier.limit());
        } else {
            tracing::info!("Frontier is empty, crawl complete");
        }

        let mut report = state.report;
        report.finished_at = Utc::now();

        if let Some(path) = &self.config.summary_path {
            match write_markdown_report(&report, path) {
                Ok(()) => tracing::info!("Report written to {}", path.display()),
                Err(e) => tracing::error!("Failed to write report to {}: {}", path.display(), e),
            }
        }

        Ok(report)
    }
}

/// Fetches and scores a single page
///
/// Seeds are accepted whenever they could be fetched; every other page must
/// reach the match threshold.
async fn process_page(
    context: Arc<PageContext>,
    entry: FrontierEntry,
) -> crate::Result<PageResult> {
    match context.fetcher.fetch(&entry.url).await? {
        FetchResult::Fetched(page) => {
            let score = context.matcher.score(&page.document);
            let accepted = entry.is_seed() || score.match_count >= context.threshold;

            let (outcome, links) = if accepted {
                (PageOutcome::Accepted, page.document.outbound_links)
            } else {
                (PageOutcome::Rejected, Vec::new())
            };

            Ok(PageResult {
                entry,
                outcome,
                score,
                links,
                from_cache: page.from_cache,
            })
        }
        FetchResult::Failed(err) => Ok(PageResult {
            score: MatchResult::empty(entry.url.clone()),
            entry,
            outcome: PageOutcome::SoftFailed(err),
            links: Vec::new(),
            from_cache: false,
        }),
    }
}

/// Runs a complete crawl with the given configuration
///
/// # Example
///
/// ```no_run
/// use sift_crawl::config::load_config;
/// use sift_crawl::crawler::crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("sift.toml"))?;
/// let outcome = crawl(config).await;
/// println!("completed: {}", outcome.is_completed());
/// # Ok(())
/// # }
/// ```
pub async fn crawl(config: Config) -> CrawlOutcome {
    Crawler::new(config).crawl().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_config(dir: &TempDir) -> Config {
        let mut config = Config::new(vec!["http://127.0.0.1:9/".to_string()], 5, 1);
        config.cache_dir = dir.path().join("cache");
        config
    }

    #[test]
    fn test_new_crawler_is_idle() {
        let dir = TempDir::new().unwrap();
        let crawler = Crawler::new(test_config(&dir));
        assert_eq!(crawler.status(), CrawlStatus::Idle);
    }

    #[test]
    fn test_terms_normalized_on_construction() {
        let dir = TempDir::new().unwrap();
        let mut config = test_config(&dir);
        config.terms = vec![" Algorithm ".to_string()];
        let crawler = Crawler::new(config);
        assert_eq!(crawler.config().terms, vec!["algorithm".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_seed_list_fails() {
        let dir = TempDir::new().unwrap();
        let mut config = test_config(&dir);
        config.seeds.clear();

        let mut crawler = Crawler::new(config);
        let outcome = crawler.crawl().await;

        assert!(matches!(outcome, CrawlOutcome::Failed(_)));
        assert_eq!(crawler.status(), CrawlStatus::Failed);
    }

    #[tokio::test]
    async fn test_zero_limit_fails() {
        let dir = TempDir::new().unwrap();
        let mut config = test_config(&dir);
        config.limit = 0;

        let outcome = Crawler::new(config).crawl().await;
        assert!(matches!(outcome, CrawlOutcome::Failed(_)));
    }

    #[tokio::test]
    async fn test_negative_match_fails() {
        let dir = TempDir::new().unwrap();
        let mut config = test_config(&dir);
        config.match_threshold = -1;

        let outcome = Crawler::new(config).crawl().await;
        assert!(matches!(outcome, CrawlOutcome::Failed(reason) if reason.contains("match")));
    }

    #[tokio::test]
    async fn test_corrupt_cache_fails_before_fetching() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        std::fs::create_dir_all(&config.cache_dir).unwrap();
        std::fs::write(
            config.cache_dir.join(crate::storage::CACHE_DB_FILE),
            vec![b'x'; 4096],
        )
        .unwrap();

        let mut crawler = Crawler::new(config);
        let outcome = crawler.crawl().await;

        assert!(matches!(outcome, CrawlOutcome::Failed(reason) if reason.contains("corrupt")));
        assert_eq!(crawler.status(), CrawlStatus::Failed);
    }

    #[tokio::test]
    async fn test_unreachable_seed_completes_with_zero() {
        let dir = TempDir::new().unwrap();
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let mut config = test_config(&dir);
        config.seeds = vec![format!("http://127.0.0.1:{}/", port)];
        config.request_timeout_secs = 2;

        let mut crawler = Crawler::new(config);
        let outcome = crawler.crawl().await;

        let report = outcome.report().expect("soft failure must not fail the crawl");
        assert_eq!(report.processed, 1);
        assert_eq!(report.accepted_count(), 0);
        assert_eq!(report.soft_failures(), 1);
        assert_eq!(crawler.status(), CrawlStatus::Completed);
    }
}
