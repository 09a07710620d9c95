//! Crawl session orchestration
//!
//! This module drives a session end to end:
//! - URL structure: read from the cache, or discovered and classified
//! - Content pages: fetched through the bounded pool
//! - Raw responses: persisted, or read back from the cache

mod coordinator;
mod pages;

pub use coordinator::{Coordinator, CrawlReport};
pub use pages::{page_path, write_debug_pages, DumpSummary};

use crate::config::Config;
use crate::Result;

/// Runs a complete crawl session with the default transport and adapter
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Session completed; some fetches may still have failed
/// * `Err(HarvestError)` - Discovery, cache, or precondition failure
pub async fn crawl(config: Config) -> Result<CrawlReport> {
    Coordinator::new(config)?.run().await
}
