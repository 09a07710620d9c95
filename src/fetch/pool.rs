//! Bounded-concurrency fetch pool
//!
//! Every task in a batch runs as its own tokio task on the multi-threaded
//! runtime. A semaphore caps how many of them hold an open request at once, and
//! a failure in one task never touches another: it is reported to the observer
//! and left out of the returned responses.

use crate::fetch::observer::{FetchObserver, TracingObserver};
use crate::fetch::transport::Transport;
use crate::fetch::{FetchBatch, FetchError, FetchResponse};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Fans a batch of fetch tasks out across a bounded set of workers
#[derive(Clone)]
pub struct FetchPool {
    transport: Arc<dyn Transport>,
    observer: Arc<dyn FetchObserver>,
    max_concurrent: usize,
    cancel: CancellationToken,
}

impl FetchPool {
    /// Creates a pool that never has more than `max_concurrent` requests in flight
    ///
    /// A bound of zero is raised to one.
    pub fn new(transport: Arc<dyn Transport>, max_concurrent: usize) -> Self {
        Self {
            transport,
            observer: Arc::new(TracingObserver),
            max_concurrent: max_concurrent.max(1),
            cancel: CancellationToken::new(),
        }
    }

    /// Replaces the default tracing observer
    pub fn with_observer(mut self, observer: Arc<dyn FetchObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Uses a caller-owned cancellation token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Token that aborts the current and all future batches when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Fetches every task in the batch and returns the successes
    ///
    /// Results come back in completion order, not submission order. Use the
    /// task context to re-associate a response with its origin.
    ///
    /// Once cancelled, tasks not yet dispatched are skipped and in-flight
    /// transfers resolve as failures.
    pub async fn fetch_all(&self, batch: FetchBatch) -> Vec<FetchResponse> {
        let total = batch.len();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut workers = JoinSet::new();
        let mut responses = Vec::with_capacity(total);
        let mut dispatched = 0;

        tracing::debug!(
            "Dispatching {} fetch tasks (max {} in flight)",
            total,
            self.max_concurrent
        );

        for task in batch.into_tasks() {
            let permit = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                    Ok(p) => p,
                    Err(_) => break,
                },
            };

            // Drain whatever finished while we waited for a slot
            while let Some(joined) = workers.try_join_next() {
                self.collect(joined, &mut responses);
            }

            let transport = Arc::clone(&self.transport);
            let cancel = self.cancel.clone();
            workers.spawn(async move {
                let _permit = permit;
                let result = tokio::select! {
                    _ = cancel.cancelled() => Err(FetchError::new(&task.url, "cancelled")),
                    page = transport.fetch_page(&task.url) => page,
                };
                result.map(|page| FetchResponse {
                    body: page.body,
                    final_url: (page.final_url != task.url).then_some(page.final_url),
                    url: task.url,
                    context: task.context,
                })
            });
            dispatched += 1;
        }

        if dispatched < total {
            tracing::warn!(
                "Fetch batch cancelled: {} of {} tasks were never dispatched",
                total - dispatched,
                total
            );
        }

        while let Some(joined) = workers.join_next().await {
            self.collect(joined, &mut responses);
        }

        tracing::debug!(
            "Fetch batch finished: {} of {} tasks succeeded",
            responses.len(),
            total
        );

        responses
    }

    fn collect(
        &self,
        joined: Result<Result<FetchResponse, FetchError>, tokio::task::JoinError>,
        responses: &mut Vec<FetchResponse>,
    ) {
        match joined {
            Ok(Ok(response)) => {
                self.observer.on_success(&response);
                responses.push(response);
            }
            Ok(Err(error)) => self.observer.on_failure(&error),
            Err(e) => tracing::warn!("Fetch worker aborted: {}", e),
        }
    }
}
