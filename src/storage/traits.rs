//! Storage traits and error types
//!
//! This module defines the trait interface for document store backends and
//! associated error types.

use crate::storage::Document;
use chrono::{DateTime, Utc};
use rusqlite::ErrorCode;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt cache record for {url}: {message}")]
    Corrupt { url: String, message: String },

    #[error("Integrity check failed: {0}")]
    Integrity(String),

    #[error("Unsupported cache schema version {found}, expected {expected}")]
    SchemaVersion { found: i64, expected: i64 },
}

impl StorageError {
    /// Returns true if the error means the stored data itself is unusable
    ///
    /// Corruption is a systemic fault. Everything else (locked database, full
    /// disk, missing permissions) is treated as the store being unavailable.
    pub fn is_corruption(&self) -> bool {
        match self {
            Self::Corrupt { .. } | Self::Integrity(_) | Self::SchemaVersion { .. } => true,
            Self::Sqlite(rusqlite::Error::SqliteFailure(err, _)) => matches!(
                err.code,
                ErrorCode::DatabaseCorrupt | ErrorCode::NotADatabase
            ),
            _ => false,
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for persistent document store implementations
///
/// The store is a plain keyed record store. Capacity and recency policy live in
/// [`crate::cache::CacheStore`]; the store only persists the recency timestamp
/// so that the policy survives across runs.
pub trait DocumentStore: Send {
    /// Lists every stored URL with its last-used timestamp, least recent first
    fn load_index(&self) -> StorageResult<Vec<(String, DateTime<Utc>)>>;

    /// Reads the document stored under `url`
    fn get(&self, url: &str) -> StorageResult<Option<Document>>;

    /// Inserts or overwrites the record for `document.url`
    fn put(&mut self, document: &Document, last_used_at: DateTime<Utc>) -> StorageResult<()>;

    /// Updates the last-used timestamp of a record
    fn touch(&mut self, url: &str, at: DateTime<Utc>) -> StorageResult<()>;

    /// Deletes the record for `url`, if present
    fn remove(&mut self, url: &str) -> StorageResult<()>;

    /// Counts stored records
    fn count(&self) -> StorageResult<u64>;
}
