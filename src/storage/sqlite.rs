//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the DocumentStore trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{DocumentStore, StorageError, StorageResult};
use crate::storage::Document;
use crate::url::CrawlUrl;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// File name of the cache database inside the cache directory
pub const CACHE_DB_FILE: &str = "cache.db";

/// SQLite document store backend
pub struct SqliteDocumentStore {
    conn: Connection,
}

impl SqliteDocumentStore {
    /// Opens (creating if needed) the cache database inside `dir`
    ///
    /// The directory is created if it does not exist. The database is
    /// integrity-checked before use, so a damaged file is reported here rather
    /// than halfway through a crawl.
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteDocumentStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open, or the database is corrupt
    pub fn open_in_dir(dir: &Path) -> StorageResult<Self> {
        std::fs::create_dir_all(dir)?;
        Self::open(&dir.join(CACHE_DB_FILE))
    }

    /// Opens (creating if needed) the cache database at `path`
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        check_integrity(&conn)?;
        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

/// Runs SQLite's quick integrity check
fn check_integrity(conn: &Connection) -> StorageResult<()> {
    let result: String = conn.query_row("PRAGMA quick_check", [], |row| row.get(0))?;
    if result == "ok" {
        Ok(())
    } else {
        Err(StorageError::Integrity(result))
    }
}

/// Decodes one `documents` row into a Document
fn decode_document(
    url: String,
    status: i64,
    raw_text: String,
    links_json: String,
    fetched_at: String,
) -> StorageResult<Document> {
    let corrupt = |message: String| StorageError::Corrupt {
        url: url.clone(),
        message,
    };

    let parsed_url = CrawlUrl::parse(&url).map_err(|e| corrupt(e.to_string()))?;

    let status = u16::try_from(status).map_err(|_| corrupt(format!("invalid status {}", status)))?;

    let links: Vec<String> =
        serde_json::from_str(&links_json).map_err(|e| corrupt(format!("links: {}", e)))?;
    let outbound_links = links
        .iter()
        .map(|link| CrawlUrl::parse(link))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| corrupt(format!("link: {}", e)))?;

    let fetched_at = parse_timestamp(&fetched_at).map_err(corrupt)?;

    Ok(Document {
        url: parsed_url,
        status,
        raw_text,
        outbound_links,
        fetched_at,
    })
}

/// Fixed-width UTC timestamps so that text ordering matches time ordering
fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("timestamp '{}': {}", value, e))
}

impl DocumentStore for SqliteDocumentStore {
    fn load_index(&self) -> StorageResult<Vec<(String, DateTime<Utc>)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT url, last_used_at FROM documents ORDER BY last_used_at ASC, url ASC")?;

        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(url, last_used)| {
                let at = parse_timestamp(&last_used).map_err(|message| StorageError::Corrupt {
                    url: url.clone(),
                    message,
                })?;
                Ok((url, at))
            })
            .collect()
    }

    fn get(&self, url: &str) -> StorageResult<Option<Document>> {
        let row = self
            .conn
            .query_row(
                "SELECT url, status, raw_text, outbound_links, fetched_at
                 FROM documents WHERE url = ?1",
                params![url],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((url, status, raw_text, links, fetched_at)) => {
                decode_document(url, status, raw_text, links, fetched_at).map(Some)
            }
            None => Ok(None),
        }
    }

    fn put(&mut self, document: &Document, last_used_at: DateTime<Utc>) -> StorageResult<()> {
        let links: Vec<&str> = document.outbound_links.iter().map(CrawlUrl::as_str).collect();
        let links_json = serde_json::to_string(&links).map_err(|e| StorageError::Corrupt {
            url: document.url.to_string(),
            message: e.to_string(),
        })?;

        self.conn.execute(
            "INSERT INTO documents (url, status, raw_text, outbound_links, fetched_at, last_used_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(url) DO UPDATE SET
                status = excluded.status,
                raw_text = excluded.raw_text,
                outbound_links = excluded.outbound_links,
                fetched_at = excluded.fetched_at,
                last_used_at = excluded.last_used_at",
            params![
                document.url.as_str(),
                document.status,
                document.raw_text,
                links_json,
                format_timestamp(&document.fetched_at),
                format_timestamp(&last_used_at),
            ],
        )?;
        Ok(())
    }

    fn touch(&mut self, url: &str, at: DateTime<Utc>) -> StorageResult<()> {
        self.conn.execute(
            "UPDATE documents SET last_used_at = ?1 WHERE url = ?2",
            params![format_timestamp(&at), url],
        )?;
        Ok(())
    }

    fn remove(&mut self, url: &str) -> StorageResult<()> {
        self.conn
            .execute("DELETE FROM documents WHERE url = ?1", params![url])?;
        Ok(())
    }

    fn count(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
