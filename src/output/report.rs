//! Crawl report data and output error types

use crate::crawler::FetchError;
use crate::matcher::MatchResult;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Everything a completed crawl reports back
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Pages dequeued and processed, accepted or not
    pub processed: usize,

    /// Scores of accepted pages, in completion order
    pub accepted: Vec<MatchResult>,

    /// Per-page fetch failures that were absorbed
    pub failures: Vec<FetchError>,

    /// Documents served from the cache instead of the network
    pub cache_hits: usize,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlReport {
    pub(crate) fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            processed: 0,
            accepted: Vec::new(),
            failures: Vec::new(),
            cache_hits: 0,
            started_at,
            finished_at: started_at,
        }
    }

    /// Number of accepted pages, the value carried by the `done` signal
    pub fn accepted_count(&self) -> usize {
        self.accepted.len()
    }

    /// Number of pages that soft-failed
    pub fn soft_failures(&self) -> usize {
        self.failures.len()
    }

    /// Wall-clock duration of the crawl
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// Accepted pages ordered by descending match count, ties broken by URL
    pub fn ranked(&self) -> Vec<&MatchResult> {
        let mut ranked: Vec<&MatchResult> = self.accepted.iter().collect();
        ranked.sort_by(|a, b| {
            b.match_count
                .cmp(&a.match_count)
                .then_with(|| a.url.cmp(&b.url))
        });
        ranked
    }
}
