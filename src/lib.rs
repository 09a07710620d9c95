//! Sitemap-Harvest: a caching site-map crawler
//!
//! This crate walks a site's structural index to enumerate content pages,
//! groups them into a URL structure document, and fetches every page through a
//! bounded concurrent pool. Both the URL structure and the raw responses are
//! cached in a single SQLite store so repeated runs skip redundant traffic.

pub mod cache;
pub mod config;
pub mod crawler;
pub mod fetch;
pub mod site;
pub mod state;
pub mod structure;

use thiserror::Error;

/// Main error type for Sitemap-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cache error: {0}")]
    Cache(#[from] cache::CacheError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Invalid crawl phase transition: {from} -> {to}")]
    InvalidTransition {
        from: state::CrawlPhase,
        to: state::CrawlPhase,
    },

    #[error("Precondition violated: {0}")]
    Precondition(String),

    #[error("Discovery error: {0}")]
    Discovery(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid pattern in config: {0}")]
    InvalidPattern(String),
}

/// Result type alias for Sitemap-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use cache::{CacheSlot, CacheStore, SqliteCache};
pub use config::Config;
pub use crawler::{Coordinator, CrawlReport};
pub use fetch::{FetchBatch, FetchContext, FetchError, FetchPool, FetchResponse, FetchTask};
pub use site::{LinkIndexAdapter, SiteAdapter};
pub use state::CrawlPhase;
pub use structure::UrlStructure;
