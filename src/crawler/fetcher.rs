//! HTTP fetcher implementation
//!
//! This module resolves a URL to a [`Document`], including:
//! - Building the HTTP client with user agent, timeout and redirect policy
//! - Consulting the cache before going to the network
//! - Parsing successful HTML responses into text and links
//! - Writing fresh documents back to the cache
//! - Classifying transport failures as soft, per-page errors

use crate::cache::{CacheError, CacheStore};
use crate::config::Config;
use crate::crawler::parser::parse_html;
use crate::storage::Document;
use crate::url::CrawlUrl;
use reqwest::{redirect::Policy, Client};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Upper bound for the connect phase of a request
const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Why a fetch failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// The request or the body read ran past the configured timeout
    Timeout,

    /// The server answered with a non-2xx status
    HttpStatus(u16),

    /// DNS, connect, TLS, redirect-limit or body decoding failure
    Network(String),
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => f.write_str("timeout"),
            Self::HttpStatus(code) => write!(f, "HTTP {}", code),
            Self::Network(message) => write!(f, "network: {}", message),
        }
    }
}

/// A per-page fetch failure
///
/// Always soft: the page scores zero and the crawl continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("fetch of {url} failed: {reason}")]
pub struct FetchError {
    pub url: String,
    pub reason: FetchFailure,
}

impl FetchError {
    fn new(url: &CrawlUrl, reason: FetchFailure) -> Self {
        Self {
            url: url.to_string(),
            reason,
        }
    }
}

/// A successfully resolved document
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub document: Document,

    /// True if the document was served from the cache
    pub from_cache: bool,
}

/// Result of a fetch operation
#[derive(Debug, Clone)]
pub enum FetchResult {
    /// Document available, from the cache or the network
    Fetched(FetchedPage),

    /// Soft failure for this page only
    Failed(FetchError),
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use sift_crawl::config::Config;
/// use sift_crawl::crawler::build_http_client;
///
/// let config = Config::new(vec!["https://example.com/".to_string()], 10, 1);
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    let timeout = Duration::from_secs(config.request_timeout_secs);

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(timeout)
        .connect_timeout(timeout.min(MAX_CONNECT_TIMEOUT))
        .redirect(Policy::limited(config.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Cache-aware page fetcher
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    cache: Arc<CacheStore>,
}

impl Fetcher {
    pub fn new(client: Client, cache: Arc<CacheStore>) -> Self {
        Self { client, cache }
    }

    /// Resolves `url` to a document
    ///
    /// # Request Flow
    ///
    /// 1. Cache hit → return the cached document, no network round trip
    /// 2. GET with the client's redirect limit and timeout
    /// 3. Non-2xx → soft failure, nothing cached
    /// 4. 2xx HTML → parse text and links; other content types yield an empty document
    /// 5. Write the document back to the cache
    ///
    /// # Returns
    ///
    /// * `Ok(FetchResult)` - Document or per-page soft failure
    /// * `Err(CacheError)` - The cache reported a systemic fault
    pub async fn fetch(&self, url: &CrawlUrl) -> Result<FetchResult, CacheError> {
        if let Some(document) = self.cache.get(url)? {
            tracing::debug!("Cache hit: {}", url);
            return Ok(FetchResult::Fetched(FetchedPage {
                document,
                from_cache: true,
            }));
        }

        let document = match self.fetch_from_network(url).await {
            Ok(document) => document,
            Err(reason) => return Ok(FetchResult::Failed(FetchError::new(url, reason))),
        };

        self.cache.put(&document)?;

        Ok(FetchResult::Fetched(FetchedPage {
            document,
            from_cache: false,
        }))
    }

    async fn fetch_from_network(&self, url: &CrawlUrl) -> Result<Document, FetchFailure> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(classify_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure::HttpStatus(status.as_u16()));
        }

        // Relative links resolve against the URL we ended up at after redirects
        let final_url = response.url().clone();

        let is_html = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map_or(true, |ct| ct.to_ascii_lowercase().contains("html"));

        let body = response.text().await.map_err(classify_error)?;

        if !is_html {
            tracing::debug!("Non-HTML content at {}, no text or links extracted", url);
            return Ok(Document::new(url.clone(), status.as_u16(), String::new(), Vec::new()));
        }

        let parsed = parse_html(&body, &final_url);

        Ok(Document::new(
            url.clone(),
            status.as_u16(),
            parsed.text,
            parsed.links,
        ))
    }
}

/// Maps a reqwest error onto a fetch failure reason
fn classify_error(e: reqwest::Error) -> FetchFailure {
    if e.is_timeout() {
        FetchFailure::Timeout
    } else if e.is_redirect() {
        FetchFailure::Network("too many redirects".to_string())
    } else if e.is_connect() {
        FetchFailure::Network(format!("connection failed: {}", e))
    } else if let Some(status) = e.status() {
        FetchFailure::HttpStatus(status.as_u16())
    } else {
        FetchFailure::Network(e.to_string())
    }
}
