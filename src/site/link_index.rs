//! Link-index site adapter
//!
//! Works for any site whose site map is a tree of index pages (HTML link lists
//! or XML sitemaps) over a flat set of pages. Which links are sub-indexes and
//! which leaves are content pages is decided by two regexes.

use crate::config::SiteConfig;
use crate::fetch::{FetchBatch, FetchPool};
use crate::site::parser::parse_index;
use crate::site::{SiteAdapter, CONTENT_GROUP, OTHER_GROUP};
use crate::structure::UrlStructure;
use crate::{ConfigError, ConfigResult, HarvestError, Result};
use async_trait::async_trait;
use regex::Regex;
use std::collections::HashSet;
use url::Url;

/// Adapter that recurses through index pages breadth-first
#[derive(Debug, Clone)]
pub struct LinkIndexAdapter {
    index_pattern: Regex,
    content_pattern: Regex,
    max_depth: u32,
}

impl LinkIndexAdapter {
    /// Creates an adapter
    ///
    /// # Arguments
    ///
    /// * `index_pattern` - Links matching this are sub-index pages
    /// * `content_pattern` - Leaves matching this are content pages
    /// * `max_depth` - How many index levels below the root are followed
    pub fn new(index_pattern: &str, content_pattern: &str, max_depth: u32) -> ConfigResult<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern)
                .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", pattern, e)))
        };

        Ok(Self {
            index_pattern: compile(index_pattern)?,
            content_pattern: compile(content_pattern)?,
            max_depth,
        })
    }

    pub fn from_config(config: &SiteConfig) -> ConfigResult<Self> {
        Self::new(&config.index_pattern, &config.content_pattern, config.max_depth)
    }
}

#[async_trait]
impl SiteAdapter for LinkIndexAdapter {
    fn parse_parent(&self, url: &str) -> String {
        let name = match Url::parse(url) {
            Ok(parsed) => {
                let segments: Vec<&str> = parsed
                    .path_segments()
                    .map(|s| s.filter(|seg| !seg.is_empty()).collect())
                    .unwrap_or_default();

                if segments.is_empty() {
                    parsed.host_str().unwrap_or("root").to_string()
                } else {
                    segments.join("_")
                }
            }
            Err(_) => url.to_string(),
        };

        sanitize(&name)
    }

    async fn discover_urls(&self, site_map_root: &str, pool: &FetchPool) -> Result<Vec<String>> {
        let root = Url::parse(site_map_root)?;
        let host = root.host_str().map(str::to_string);

        let mut visited: HashSet<String> = HashSet::from([root.to_string()]);
        let mut frontier = vec![root.to_string()];
        let mut leaf_seen = HashSet::new();
        let mut leaves = Vec::new();
        let mut depth = 0;

        while !frontier.is_empty() {
            tracing::debug!("Walking {} index pages at depth {}", frontier.len(), depth);

            let mut responses = pool
                .fetch_all(FetchBatch::plain(std::mem::take(&mut frontier)))
                .await;

            if depth == 0 && responses.is_empty() {
                return Err(HarvestError::Discovery(format!(
                    "site map root {} could not be fetched",
                    site_map_root
                )));
            }

            // Pool results arrive in completion order
            responses.sort_by(|a, b| a.url.cmp(&b.url));

            let can_descend = depth < self.max_depth;
            for response in responses {
                // Relative links resolve against where redirects ended up
                let base = Url::parse(response.base_url())?;
                visited.insert(base.to_string());
                let parsed = parse_index(&response.body, &base);

                for link in parsed.nested_sitemaps {
                    if can_descend && same_host(&link, &host) && visited.insert(link.clone()) {
                        frontier.push(link);
                    }
                }

                for link in parsed.links {
                    if link == response.url || link == base.as_str() || !same_host(&link, &host) {
                        continue;
                    }

                    if self.index_pattern.is_match(&link) {
                        if can_descend && visited.insert(link.clone()) {
                            frontier.push(link);
                        }
                    } else if leaf_seen.insert(link.clone()) {
                        leaves.push(link);
                    }
                }
            }

            depth += 1;
        }

        tracing::info!(
            "Discovered {} leaf URLs across {} index pages",
            leaves.len(),
            visited.len()
        );

        Ok(leaves)
    }

    fn classify(&self, urls: &[String]) -> UrlStructure {
        let mut structure = UrlStructure::new();
        let mut seen = HashSet::new();

        for url in urls {
            if !seen.insert(url.as_str()) {
                continue;
            }

            let group = if self.content_pattern.is_match(url) {
                CONTENT_GROUP
            } else {
                OTHER_GROUP
            };
            structure.insert(group, parent_of(url), url.as_str());
        }

        structure
    }
}

/// Returns the URL with its last path segment removed
///
/// Query and fragment are dropped. A root URL is its own parent.
///
/// ```
/// use sitemap_harvest::site::parent_of;
///
/// assert_eq!(parent_of("https://site/a/1"), "https://site/a");
/// assert_eq!(parent_of("https://site/a"), "https://site/");
/// ```
pub fn parent_of(url: &str) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return url.to_string();
    };

    let mut segments: Vec<String> = parsed
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).map(str::to_string).collect())
        .unwrap_or_default();
    segments.pop();

    parsed.set_query(None);
    parsed.set_fragment(None);
    parsed.set_path(&format!("/{}", segments.join("/")));
    parsed.to_string()
}

fn same_host(link: &str, host: &Option<String>) -> bool {
    Url::parse(link)
        .map(|u| u.host_str().map(str::to_string) == *host)
        .unwrap_or(false)
}

/// Replaces anything that is not safe in a file name
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
