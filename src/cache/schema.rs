//! Cache schema definitions
//!
//! The store holds one table keyed by (cache key, slot).

/// SQL schema for the cache database
pub const SCHEMA_SQL: &str = r#"
-- One serialized blob per (cache key, slot); writes overwrite
CREATE TABLE IF NOT EXISTS cache_entries (
    cache_key TEXT NOT NULL,
    slot TEXT NOT NULL,
    value TEXT NOT NULL,
    written_at TEXT NOT NULL,
    PRIMARY KEY (cache_key, slot)
);
"#;

/// Initializes the cache schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
