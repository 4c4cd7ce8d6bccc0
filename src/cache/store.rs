use crate::cache::CacheError;
use crate::storage::{Document, DocumentStore, SqliteDocumentStore};
use crate::url::CrawlUrl;
use chrono::Utc;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Recency index plus the backing store, guarded together so that eviction
/// and the matching store delete happen in one step
struct CacheInner {
    index: LruCache<String, ()>,
    store: Box<dyn DocumentStore>,
}

/// Thread-safe, capacity-bounded LRU document cache
pub struct CacheStore {
    inner: Mutex<CacheInner>,
    capacity: NonZeroUsize,
}

impl CacheStore {
    /// Opens the cache persisted under `dir`
    ///
    /// # Returns
    ///
    /// * `Ok(CacheStore)` - Cache ready, recency order restored from disk
    /// * `Err(CacheError)` - Store could not be opened, or is corrupt
    pub fn open(dir: &Path, capacity: usize) -> Result<Self, CacheError> {
        let store = SqliteDocumentStore::open_in_dir(dir).map_err(|e| {
            if e.is_corruption() {
                CacheError::Corrupt(e)
            } else {
                CacheError::Open(e)
            }
        })?;
        Self::with_store(Box::new(store), capacity)
    }

    /// Builds a cache on top of an arbitrary document store
    ///
    /// Existing records are loaded into the recency index oldest first. If the
    /// store holds more records than `capacity` (for example because the limit
    /// was lowered since the last run) the least recently used ones are evicted.
    pub fn with_store(store: Box<dyn DocumentStore>, capacity: usize) -> Result<Self, CacheError> {
        let capacity = NonZeroUsize::new(capacity).ok_or(CacheError::ZeroCapacity)?;

        let existing = store.load_index().map_err(|e| {
            if e.is_corruption() {
                CacheError::Corrupt(e)
            } else {
                CacheError::Open(e)
            }
        })?;

        let mut inner = CacheInner {
            index: LruCache::new(capacity),
            store,
        };

        let mut evicted = 0usize;
        for (url, _last_used) in existing {
            if let Some((old_url, ())) = inner.index.push(url, ()) {
                inner.remove_from_store(&old_url);
                evicted += 1;
            }
        }

        if evicted > 0 {
            tracing::info!(
                "Evicted {} cached documents to fit cache limit {}",
                evicted,
                capacity
            );
        }
        tracing::debug!("Cache opened with {} entries", inner.index.len());

        Ok(Self {
            inner: Mutex::new(inner),
            capacity,
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, CacheInner>, CacheError> {
        self.inner.lock().map_err(|_| CacheError::Poisoned)
    }

    /// Looks up a cached document and marks it most recently used
    ///
    /// Returns `Ok(None)` on a miss or when the store cannot be read.
    pub fn get(&self, url: &CrawlUrl) -> Result<Option<Document>, CacheError> {
        let mut inner = self.lock()?;
        let key = url.as_str();

        if inner.index.get(key).is_none() {
            return Ok(None);
        }

        match inner.store.get(key) {
            Ok(Some(document)) => {
                if let Err(e) = inner.store.touch(key, Utc::now()) {
                    tracing::warn!("Failed to refresh cache recency for {}: {}", key, e);
                }
                Ok(Some(document))
            }
            Ok(None) => {
                // Record vanished underneath us; forget it so the slot is reused
                inner.index.pop(key);
                Ok(None)
            }
            Err(e) if e.is_corruption() => Err(CacheError::Corrupt(e)),
            Err(e) => {
                tracing::warn!("Cache read failed for {}, treating as miss: {}", key, e);
                Ok(None)
            }
        }
    }

    /// Stores a document, evicting the least recently used entry if needed
    ///
    /// Overwriting an existing URL refreshes its recency and never evicts.
    /// Store write failures are logged and swallowed; the entry is then simply
    /// not cached.
    pub fn put(&self, document: &Document) -> Result<(), CacheError> {
        let mut inner = self.lock()?;
        let key = document.url.as_str();

        if !inner.index.contains(key) && inner.index.len() >= self.capacity.get() {
            if let Some((old_url, ())) = inner.index.pop_lru() {
                tracing::debug!("Cache full, evicting {}", old_url);
                inner.remove_from_store(&old_url);
            }
        }

        match inner.store.put(document, Utc::now()) {
            Ok(()) => {
                inner.index.put(key.to_string(), ());
            }
            Err(e) => {
                tracing::warn!("Failed to cache {}: {}", key, e);
                // A previous version of the row may still be on disk. Only stop
                // tracking the key once the row is gone, so eviction can reach it.
                match inner.store.remove(key) {
                    Ok(()) => {
                        inner.index.pop(key);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to drop stale cache entry {}: {}", key, e);
                    }
                }
            }
        }

        Ok(())
    }

    /// Returns true if `url` currently has a cache entry
    pub fn contains(&self, url: &CrawlUrl) -> bool {
        self.lock()
            .map(|inner| inner.index.contains(url.as_str()))
            .unwrap_or(false)
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.lock().map(|inner| inner.index.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of records in the backing store
    ///
    /// Matches [`CacheStore::len`] unless the store has been modified outside
    /// this cache.
    pub fn stored_count(&self) -> Result<u64, CacheError> {
        let inner = self.lock()?;
        inner.store.count().map_err(|e| {
            if e.is_corruption() {
                CacheError::Corrupt(e)
            } else {
                CacheError::Open(e)
            }
        })
    }

    /// Maximum number of entries
    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }
}

impl CacheInner {
    fn remove_from_store(&mut self, url: &str) {
        if let Err(e) = self.store.remove(url) {
            tracing::warn!("Failed to delete evicted cache entry {}: {}", url, e);
        }
    }
}
