//! Storage module for the persistent page cache
//!
//! This module owns the on-disk representation of cached documents:
//! - The [`Document`] record produced by the fetcher
//! - The [`DocumentStore`] trait the cache is written against
//! - A SQLite-backed implementation living inside the configured cache directory

mod schema;
mod sqlite;
mod traits;

pub use sqlite::{SqliteDocumentStore, CACHE_DB_FILE};
pub use traits::{DocumentStore, StorageError, StorageResult};

use crate::url::CrawlUrl;
use chrono::{DateTime, Utc};

/// A fetched page, immutable once produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Normalized URL the document was fetched from
    pub url: CrawlUrl,

    /// HTTP status code of the response
    pub status: u16,

    /// Visible text of the page with markup stripped
    pub raw_text: String,

    /// Absolute outbound links in extraction order, deduplicated
    pub outbound_links: Vec<CrawlUrl>,

    /// When the document was fetched from the network
    pub fetched_at: DateTime<Utc>,
}

impl Document {
    /// Creates a document stamped with the current time
    pub fn new(url: CrawlUrl, status: u16, raw_text: String, outbound_links: Vec<CrawlUrl>) -> Self {
        Self {
            url,
            status,
            raw_text,
            outbound_links,
            fetched_at: Utc::now(),
        }
    }
}
