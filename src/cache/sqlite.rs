//! SQLite cache implementation
//!
//! This module provides a SQLite-based implementation of the CacheStore trait.
//! No connection outlives a single operation: each call opens the file, does
//! its work, and closes it again.

use crate::cache::schema::initialize_schema;
use crate::cache::traits::{CacheError, CacheResult, CacheStore};
use crate::cache::{CacheEntryInfo, CacheSlot};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How long a writer waits on another process's lock before giving up
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite cache backend
#[derive(Debug, Clone)]
pub struct SqliteCache {
    path: PathBuf,
}

impl SqliteCache {
    /// Creates the store file (and its parent directory) if needed
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    pub fn new(path: impl AsRef<Path>) -> CacheResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let cache = Self { path };
        let conn = cache.open()?;
        initialize_schema(&conn)?;

        Ok(cache)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> CacheResult<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
        ",
        )?;
        Ok(conn)
    }
}

impl CacheStore for SqliteCache {
    fn put_raw(&self, key: &str, slot: CacheSlot, value: &str) -> CacheResult<()> {
        let conn = self.open()?;
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO cache_entries (cache_key, slot, value, written_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(cache_key, slot) DO UPDATE SET
                value = excluded.value,
                written_at = excluded.written_at",
            params![key, slot.to_db_string(), value, now],
        )?;

        tracing::debug!(
            "Cached {} bytes under '{}' ({})",
            value.len(),
            key,
            slot
        );
        Ok(())
    }

    fn get_raw(&self, key: &str, slot: CacheSlot) -> CacheResult<String> {
        let conn = self.open()?;
        let value: Option<String> = conn
            .query_row(
                "SELECT value FROM cache_entries WHERE cache_key = ?1 AND slot = ?2",
                params![key, slot.to_db_string()],
                |row| row.get(0),
            )
            .optional()?;

        value.ok_or_else(|| CacheError::NotFound {
            key: key.to_string(),
            slot,
        })
    }

    fn remove(&self, key: &str, slot: CacheSlot) -> CacheResult<bool> {
        let conn = self.open()?;
        let removed = conn.execute(
            "DELETE FROM cache_entries WHERE cache_key = ?1 AND slot = ?2",
            params![key, slot.to_db_string()],
        )?;
        Ok(removed > 0)
    }

    fn entries(&self) -> CacheResult<Vec<CacheEntryInfo>> {
        let conn = self.open()?;
        let mut stmt = conn.prepare(
            "SELECT cache_key, slot, written_at, LENGTH(CAST(value AS BLOB))
             FROM cache_entries ORDER BY cache_key, slot",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (key, slot, written_at, bytes) = row?;

            // Rows written by something other than this crate are skipped
            let Some(slot) = CacheSlot::from_db_string(&slot) else {
                tracing::debug!("Skipping entry '{}' with unknown slot '{}'", key, slot);
                continue;
            };
            let written_at = match written_at.parse::<DateTime<Utc>>() {
                Ok(at) => at,
                Err(e) => {
                    tracing::debug!(
                        "Entry '{}' ({}) has unreadable timestamp '{}': {}",
                        key,
                        slot,
                        written_at,
                        e
                    );
                    DateTime::<Utc>::default()
                }
            };

            entries.push(CacheEntryInfo {
                key,
                slot,
                written_at,
                bytes: bytes.max(0) as usize,
            });
        }

        Ok(entries)
    }
}
