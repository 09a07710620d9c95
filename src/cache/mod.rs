//! Cache module for persisting crawl artifacts
//!
//! A single file-backed store shared by every crawler pointed at the same path.
//! Entries are addressed by a caller-chosen cache key plus a logical slot:
//! - `Structure`: the URL structure document of a crawl session
//! - `Responses`: the raw fetched pages of a crawl session

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteCache;
pub use traits::{CacheError, CacheResult, CacheStore};

use chrono::{DateTime, Utc};
use std::fmt;

/// Logical slot an entry lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CacheSlot {
    Structure,
    Responses,
}

impl CacheSlot {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Structure => "structure",
            Self::Responses => "responses",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "structure" => Some(Self::Structure),
            "responses" => Some(Self::Responses),
            _ => None,
        }
    }
}

impl fmt::Display for CacheSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.to_db_string())
    }
}

/// Summary of a stored entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntryInfo {
    pub key: String,
    pub slot: CacheSlot,
    pub written_at: DateTime<Utc>,
    /// Size of the serialized value
    pub bytes: usize,
}
