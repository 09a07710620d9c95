//! Site adapters
//!
//! Everything that depends on the shape of a particular site lives behind the
//! `SiteAdapter` trait: how its index pages are walked, how a parent URL maps to
//! a folder-safe name, and which discovered URLs count as content pages. The
//! crawler core only ever talks to the trait.

mod link_index;
mod parser;

pub use link_index::{parent_of, LinkIndexAdapter};
pub use parser::{parse_index, ParsedIndex};

use crate::fetch::FetchPool;
use crate::structure::UrlStructure;
use crate::Result;
use async_trait::async_trait;

/// Group holding the pages that carry the target payload
pub const CONTENT_GROUP: &str = "content";

/// Group holding every other discovered page
pub const OTHER_GROUP: &str = "other";

/// Site-specific discovery and classification
#[async_trait]
pub trait SiteAdapter: Send + Sync {
    /// Derives a stable, folder-safe name from a parent URL
    fn parse_parent(&self, url: &str) -> String;

    /// Walks the site's index structure from `site_map_root` and returns every
    /// leaf URL found
    ///
    /// Index pages are fetched through `pool`.
    async fn discover_urls(&self, site_map_root: &str, pool: &FetchPool) -> Result<Vec<String>>;

    /// Groups and filters discovered URLs into a structure document
    fn classify(&self, urls: &[String]) -> UrlStructure;
}
