//! Crawl phase definitions for tracking a session's lifecycle
//!
//! ```text
//! Init -> Traversing -> Classifying --\
//!   \                                  +-> StructureCached -> Fetching ---------\
//!    \-> StructureCacheHit -----------/                  \-> ResponseCacheHit -+-> ResponseCached -> Done
//! ```
use std::fmt;

/// Represents the current phase of a crawl session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Coordinator built, nothing done yet
    Init,

    // ===== Structure States =====
    /// Walking the site map to enumerate URLs
    Traversing,

    /// URL structure loaded from the cache instead of traversing
    StructureCacheHit,

    /// Grouping discovered URLs into the structure document
    Classifying,

    /// Structure document is in hand (and persisted if it was computed)
    StructureCached,

    // ===== Response States =====
    /// Fetching every content page through the pool
    Fetching,

    /// Raw responses loaded from the cache instead of fetching
    ResponseCacheHit,

    /// Response set is in hand (and persisted if it was fetched)
    ResponseCached,

    /// Session finished
    Done,
}

impl CrawlPhase {
    /// Returns true if the session may move from this phase to `next`
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        use CrawlPhase::*;

        matches!(
            (self, next),
            (Init, Traversing)
                | (Init, StructureCacheHit)
                | (Traversing, Classifying)
                | (Classifying, StructureCached)
                | (StructureCacheHit, StructureCached)
                | (StructureCached, Fetching)
                | (StructureCached, ResponseCacheHit)
                | (Fetching, ResponseCached)
                | (ResponseCacheHit, ResponseCached)
                | (ResponseCached, Done)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Traversing => "traversing",
            Self::StructureCacheHit => "structure_cache_hit",
            Self::Classifying => "classifying",
            Self::StructureCached => "structure_cached",
            Self::Fetching => "fetching",
            Self::ResponseCacheHit => "response_cache_hit",
            Self::ResponseCached => "response_cached",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
