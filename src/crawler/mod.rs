//! Crawler module for page fetching and crawl orchestration
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching through the document cache
//! - HTML parsing and link extraction
//! - The depth-annotated frontier
//! - Overall crawl coordination, single-seed-set or swarm

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod swarm;

pub use coordinator::{crawl, CrawlOutcome, Crawler};
pub use fetcher::{build_http_client, FetchError, FetchFailure, FetchResult, FetchedPage, Fetcher};
pub use frontier::{Frontier, FrontierEntry};
pub use parser::{parse_html, ParsedPage};
pub use swarm::{crawl_swarm, SwarmOutcome};
