//! Bounded document cache
//!
//! The cache maps normalized URLs to previously fetched documents. It holds at
//! most `cache-limit` entries and evicts the least recently used entry when a new
//! URL arrives at capacity. Documents live in a [`DocumentStore`]; only the
//! recency index is kept in memory.
//!
//! Caching is an optimization: store failures on read degrade to a miss, store
//! failures on write are logged and dropped. Only corruption of the stored data
//! is reported to the caller.
//!
//! [`DocumentStore`]: crate::storage::DocumentStore

mod store;

pub use store::CacheStore;

use crate::storage::StorageError;
use thiserror::Error;

/// Errors surfaced by the cache
///
/// Every variant is systemic; recoverable store failures never leave the cache.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache storage is corrupt: {0}")]
    Corrupt(#[source] StorageError),

    #[error("Cache storage could not be opened: {0}")]
    Open(#[source] StorageError),

    #[error("Cache capacity must be at least 1")]
    ZeroCapacity,

    #[error("Cache lock poisoned")]
    Poisoned,
}
