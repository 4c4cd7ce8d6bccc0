use serde::Deserialize;
use std::path::PathBuf;

/// Default directory for the persistent page cache
pub const DEFAULT_CACHE_DIR: &str = "cache";

/// Default maximum number of cached documents
pub const DEFAULT_CACHE_LIMIT: usize = 500;

/// Default number of parallel fetch workers
pub const DEFAULT_WORKERS: usize = 4;

/// Upper bound accepted for `workers`
pub const MAX_WORKERS: usize = 64;

/// Default per-request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default redirect hop limit
pub const DEFAULT_MAX_REDIRECTS: usize = 5;

/// Main configuration structure for Sift
///
/// Term lists are lower-cased when the file is parsed, since matching is
/// performed on lower-cased tokens.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Seed URLs, enqueued in order at the start of a crawl
    #[serde(rename = "url")]
    pub seeds: Vec<String>,

    /// Maximum number of pages processed before the crawl stops
    pub limit: usize,

    /// Search terms used for scoring
    #[serde(default)]
    pub terms: Vec<String>,

    /// Terms excluded from scoring entirely
    #[serde(default)]
    pub stop_terms: Vec<String>,

    /// Directory holding the persistent cache
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Maximum number of documents retained in the cache
    #[serde(default = "default_cache_limit")]
    pub cache_limit: usize,

    /// Minimum match count for a page to be accepted and have its links followed
    ///
    /// Signed so that a negative value reaches validation instead of failing
    /// deserialization with a less helpful message.
    #[serde(rename = "match")]
    pub match_threshold: i64,

    /// Number of parallel fetch workers
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Per-fetch timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Maximum redirect hops followed before a fetch is a soft failure
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Optional path for a markdown report of accepted pages
    #[serde(default)]
    pub summary_path: Option<PathBuf>,
}

impl Config {
    /// Creates a configuration with defaults for everything but the required options
    pub fn new(seeds: Vec<String>, limit: usize, match_threshold: i64) -> Self {
        Self {
            seeds,
            limit,
            terms: Vec::new(),
            stop_terms: Vec::new(),
            cache_dir: default_cache_dir(),
            cache_limit: DEFAULT_CACHE_LIMIT,
            match_threshold,
            workers: DEFAULT_WORKERS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            user_agent: default_user_agent(),
            summary_path: None,
        }
    }

    /// Lower-cases and trims the term lists in place
    pub(crate) fn normalize_terms(&mut self) {
        for term in self.terms.iter_mut().chain(self.stop_terms.iter_mut()) {
            *term = term.trim().to_lowercase();
        }
    }

    /// The match threshold as an unsigned count
    ///
    /// Only meaningful after validation has rejected negative thresholds.
    pub fn threshold(&self) -> usize {
        usize::try_from(self.match_threshold).unwrap_or(0)
    }
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(DEFAULT_CACHE_DIR)
}

fn default_cache_limit() -> usize {
    DEFAULT_CACHE_LIMIT
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_max_redirects() -> usize {
    DEFAULT_MAX_REDIRECTS
}

fn default_user_agent() -> String {
    format!("sift-crawl/{}", env!("CARGO_PKG_VERSION"))
}
