//! Cache traits and error types
//!
//! This module defines the trait interface for cache backends and
//! associated error types.

use crate::cache::{CacheEntryInfo, CacheSlot};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur during cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("No cache entry for key '{key}' in slot '{slot}'")]
    NotFound { key: String, slot: CacheSlot },

    #[error("Corrupt cache entry for key '{key}' in slot '{slot}': {message}")]
    Corrupt {
        key: String,
        slot: CacheSlot,
        message: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl CacheError {
    /// Returns true if this error is a miss rather than a failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// Trait for cache backend implementations
///
/// Values are opaque serialized blobs to the backend. There is at most one
/// entry per (key, slot) and a write always replaces the previous one.
/// Backends provide no locking across processes: concurrent writers to the
/// same key race and the last write wins.
pub trait CacheStore {
    /// Stores a serialized value, replacing any existing entry
    fn put_raw(&self, key: &str, slot: CacheSlot, value: &str) -> CacheResult<()>;

    /// Reads a serialized value
    ///
    /// A missing entry is `CacheError::NotFound`, never an empty value.
    fn get_raw(&self, key: &str, slot: CacheSlot) -> CacheResult<String>;

    /// Deletes an entry, returning whether one existed
    fn remove(&self, key: &str, slot: CacheSlot) -> CacheResult<bool>;

    /// Lists every entry in the store, ordered by key then slot
    fn entries(&self) -> CacheResult<Vec<CacheEntryInfo>>;

    /// Serializes `value` as JSON and stores it
    fn put<T>(&self, key: &str, slot: CacheSlot, value: &T) -> CacheResult<()>
    where
        Self: Sized,
        T: Serialize + ?Sized,
    {
        let blob = serde_json::to_string(value)?;
        self.put_raw(key, slot, &blob)
    }

    /// Reads and deserializes a JSON value
    fn get<T>(&self, key: &str, slot: CacheSlot) -> CacheResult<T>
    where
        Self: Sized,
        T: DeserializeOwned,
    {
        let blob = self.get_raw(key, slot)?;
        serde_json::from_str(&blob).map_err(|e| CacheError::Corrupt {
            key: key.to_string(),
            slot,
            message: e.to_string(),
        })
    }
}
