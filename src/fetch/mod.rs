//! Fetch module for bulk page retrieval
//!
//! This module contains everything needed to pull a large URL set off the network:
//! - A single-request `Transport` (reqwest-backed by default)
//! - A bounded-concurrency `FetchPool` that isolates per-URL failures
//! - A `FetchObserver` hook that reports each success and failure
//! - The task, batch, and response types threaded through all of the above

mod observer;
mod pool;
mod transport;

pub use observer::{FetchObserver, TracingObserver};
pub use pool::FetchPool;
pub use transport::{build_http_client, FetchedPage, HttpTransport, Transport};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Caller-defined key/value pairs carried from a task to its response
pub type FetchContext = BTreeMap<String, String>;

/// A single URL failed to transfer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{url} failed because of {cause}")]
pub struct FetchError {
    pub url: String,
    pub cause: String,
}

impl FetchError {
    pub fn new(url: impl Into<String>, cause: impl fmt::Display) -> Self {
        Self {
            url: url.into(),
            cause: cause.to_string(),
        }
    }
}

/// One unit of work for the fetch pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTask {
    pub url: String,
    pub context: Option<FetchContext>,
}

/// A successfully fetched page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchResponse {
    /// Full response body decoded as text
    pub body: String,

    /// The URL that was requested
    pub url: String,

    /// Context of the originating task, unchanged
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<FetchContext>,

    /// Where redirects ended up, when that differs from `url`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_url: Option<String>,
}

impl FetchResponse {
    /// The URL relative links in the body resolve against
    pub fn base_url(&self) -> &str {
        self.final_url.as_deref().unwrap_or(&self.url)
    }
}

/// A homogeneous set of fetch tasks
///
/// Either every task carries context or none does; the two constructors are
/// the only way to build a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchBatch {
    tasks: Vec<FetchTask>,
    with_context: bool,
}

impl FetchBatch {
    /// Builds a batch of bare URLs
    pub fn plain<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tasks: urls
                .into_iter()
                .map(|url| FetchTask {
                    url: url.into(),
                    context: None,
                })
                .collect(),
            with_context: false,
        }
    }

    /// Builds a batch where every URL carries a context map
    pub fn with_context<I>(tasks: I) -> Self
    where
        I: IntoIterator<Item = (String, FetchContext)>,
    {
        Self {
            tasks: tasks
                .into_iter()
                .map(|(url, context)| FetchTask {
                    url,
                    context: Some(context),
                })
                .collect(),
            with_context: true,
        }
    }

    /// Returns true if the tasks in this batch carry context
    pub fn has_context(&self) -> bool {
        self.with_context
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn tasks(&self) -> &[FetchTask] {
        &self.tasks
    }

    /// Keeps only the first `limit` tasks
    pub fn truncate(&mut self, limit: usize) {
        self.tasks.truncate(limit);
    }

    pub fn into_tasks(self) -> Vec<FetchTask> {
        self.tasks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(group: &str, parent: &str) -> FetchContext {
        FetchContext::from([
            ("group".to_string(), group.to_string()),
            ("parent".to_string(), parent.to_string()),
        ])
    }

    #[test]
    fn test_plain_batch_has_no_context() {
        let batch = FetchBatch::plain(["https://example.com/a", "https://example.com/b"]);
        assert_eq!(batch.len(), 2);
        assert!(!batch.has_context());
        assert!(batch.tasks().iter().all(|t| t.context.is_none()));
    }

    #[test]
    fn test_context_batch_carries_context() {
        let batch = FetchBatch::with_context(vec![(
            "https://example.com/a/1".to_string(),
            context("content", "https://example.com/a"),
        )]);
        assert!(batch.has_context());
        assert_eq!(
            batch.tasks()[0].context,
            Some(context("content", "https://example.com/a"))
        );
    }

    #[test]
    fn test_truncate() {
        let mut batch = FetchBatch::plain((0..10).map(|i| format!("https://example.com/{}", i)));
        batch.truncate(3);
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.tasks()[2].url, "https://example.com/2");

        batch.truncate(100);
        assert_eq!(batch.len(), 3);
    }

    #[test]
    fn test_fetch_error_display() {
        let err = FetchError::new("https://example.com/", "connection refused");
        assert_eq!(
            err.to_string(),
            "https://example.com/ failed because of connection refused"
        );
    }

    #[test]
    fn test_response_without_context_omits_field() {
        let response = FetchResponse {
            body: "<html></html>".to_string(),
            url: "https://example.com/".to_string(),
            context: None,
            final_url: None,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("context"));
        assert!(!json.contains("final_url"));
        assert_eq!(response.base_url(), "https://example.com/");
    }

    #[test]
    fn test_base_url_follows_redirect() {
        let response = FetchResponse {
            body: String::new(),
            url: "https://example.com/sitemap".to_string(),
            context: None,
            final_url: Some("https://example.com/sitemap/".to_string()),
        };
        assert_eq!(response.base_url(), "https://example.com/sitemap/");
    }
}
