//! State tracking module
//!
//! This module defines the crawl engine's state machine and the outcome
//! recorded for every processed page.

mod crawl_status;
mod page_outcome;

pub use crawl_status::CrawlStatus;
pub use page_outcome::PageOutcome;
