//! Per-fetch reporting hook

use crate::fetch::{FetchError, FetchResponse};

/// Receives one call per completed fetch task
///
/// The pool calls exactly one of the two methods for every dispatched task.
pub trait FetchObserver: Send + Sync {
    fn on_success(&self, response: &FetchResponse);

    fn on_failure(&self, error: &FetchError);
}

/// Default observer: DEBUG per success, WARN per failure
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl FetchObserver for TracingObserver {
    fn on_success(&self, response: &FetchResponse) {
        tracing::debug!("Response received from {}", response.url);
    }

    fn on_failure(&self, error: &FetchError) {
        tracing::warn!("{}", error);
    }
}
