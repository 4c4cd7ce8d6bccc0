//! Database schema definitions for the cache database

/// Schema version written to `PRAGMA user_version`
pub const SCHEMA_VERSION: i64 = 1;

/// SQL schema for the cache database
pub const SCHEMA_SQL: &str = r#"
-- One row per cached URL
CREATE TABLE IF NOT EXISTS documents (
    url TEXT PRIMARY KEY NOT NULL,
    status INTEGER NOT NULL,
    raw_text TEXT NOT NULL,
    outbound_links TEXT NOT NULL,
    fetched_at TEXT NOT NULL,
    last_used_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_documents_last_used ON documents(last_used_at);
"#;

/// Initializes the database schema, or verifies an existing one
///
/// A fresh database (user_version 0) gets the schema and the current version.
/// Any other version than [`SCHEMA_VERSION`] is reported as corruption, since
/// the crawler cannot interpret the rows.
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), super::StorageError> {
    let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    match version {
        0 => {
            conn.execute_batch(SCHEMA_SQL)?;
            conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
            Ok(())
        }
        SCHEMA_VERSION => {
            conn.execute_batch(SCHEMA_SQL)?;
            Ok(())
        }
        found => Err(super::StorageError::SchemaVersion {
            found,
            expected: SCHEMA_VERSION,
        }),
    }
}
