//! Debug page dump
//!
//! Writes each fetched body to `{dir}/{parent}/{page}.html` for offline
//! inspection. Nothing reads these files back, so a page that cannot be
//! written is logged and counted, never fatal.

use crate::fetch::FetchResponse;
use crate::site::SiteAdapter;
use crate::structure::PARENT_KEY;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use url::Url;

/// Folder used for responses that carry no parent context
const UNGROUPED_DIR: &str = "ungrouped";

/// Longest file stem kept before it is cut and suffixed with a digest
const MAX_STEM_BYTES: usize = 120;

/// Outcome of one dump
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DumpSummary {
    /// Distinct files written
    pub written: usize,

    /// Pages that could not be written
    pub failed: usize,
}

/// Where a response body lands: `{dir}/{parent}/{page}.html`
///
/// Both names come from the adapter's `parse_parent`. URLs with a query
/// string, and names too long for a file system, get a short digest of the
/// full URL appended so distinct pages never share a file.
pub fn page_path(dir: &Path, response: &FetchResponse, adapter: &dyn SiteAdapter) -> PathBuf {
    let folder = response
        .context
        .as_ref()
        .and_then(|c| c.get(PARENT_KEY))
        .map(|parent| adapter.parse_parent(parent))
        .unwrap_or_else(|| UNGROUPED_DIR.to_string());

    let mut stem = adapter.parse_parent(&response.url);
    let has_query = Url::parse(&response.url)
        .map(|u| u.query().is_some())
        .unwrap_or(false);

    if stem.len() > MAX_STEM_BYTES {
        let mut end = MAX_STEM_BYTES;
        while !stem.is_char_boundary(end) {
            end -= 1;
        }
        stem.truncate(end);
        stem = with_digest(&stem, &response.url);
    } else if has_query {
        stem = with_digest(&stem, &response.url);
    }

    dir.join(folder).join(format!("{}.html", stem))
}

fn url_digest(url: &str) -> String {
    hex::encode(&Sha256::digest(url.as_bytes())[..4])
}

fn with_digest(stem: &str, url: &str) -> String {
    format!("{}-{}", stem, url_digest(url))
}

fn write_page(path: &Path, body: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, body)
}

/// Writes every response body under `dir`
pub fn write_debug_pages(
    dir: &Path,
    responses: &[FetchResponse],
    adapter: &dyn SiteAdapter,
) -> DumpSummary {
    let mut summary = DumpSummary::default();
    let mut seen_urls: HashSet<&str> = HashSet::new();
    let mut taken: HashSet<PathBuf> = HashSet::new();

    for response in responses {
        if !seen_urls.insert(response.url.as_str()) {
            tracing::debug!("Page {} already written", response.url);
            continue;
        }

        let mut path = page_path(dir, response, adapter);

        // Two URLs that sanitize to the same name
        if taken.contains(&path) {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            path.set_file_name(format!("{}.html", with_digest(&stem, &response.url)));
        }
        taken.insert(path.clone());

        match write_page(&path, &response.body) {
            Ok(()) => summary.written += 1,
            Err(e) => {
                tracing::warn!(
                    "Failed to write page {} to {}: {}",
                    response.url,
                    path.display(),
                    e
                );
                summary.failed += 1;
            }
        }
    }

    summary
}
