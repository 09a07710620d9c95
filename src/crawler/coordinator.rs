//! Crawler coordinator - crawl session orchestration
//!
//! This module ties the crawl stages together:
//! - Loading the URL structure from the cache, or discovering and classifying it
//! - Flattening the structure into a fetch batch and running it through the pool
//! - Persisting raw responses, or loading them back from the cache
//!
//! Each stage is an explicit cache-or-compute branch chosen by configuration;
//! a stage never reads and refreshes the same entry in one run.

use crate::cache::{CacheSlot, CacheStore, SqliteCache};
use crate::config::Config;
use crate::crawler::pages::write_debug_pages;
use crate::fetch::{FetchPool, FetchResponse, HttpTransport, Transport};
use crate::site::{LinkIndexAdapter, SiteAdapter};
use crate::state::CrawlPhase;
use crate::structure::UrlStructure;
use crate::{HarvestError, Result};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Summary of a finished (or partially finished) crawl session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Every phase the session passed through, in order
    pub phases: Vec<CrawlPhase>,

    /// Leaf URLs found by traversal (0 on a structure cache hit)
    pub discovered_urls: usize,

    /// Fetch tasks dispatched after any fetch limit was applied
    pub fetch_tasks: usize,

    /// Tasks that produced a response
    pub fetched: usize,

    /// Tasks that failed and were dropped
    pub failed: usize,

    /// Pages written to the html directory in debug mode
    pub pages_written: usize,

    /// Pages the debug dump could not write
    pub pages_failed: usize,

    pub structure_from_cache: bool,
    pub responses_from_cache: bool,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Config,
    adapter: Arc<dyn SiteAdapter>,
    pool: FetchPool,
    cache: SqliteCache,
    phase: CrawlPhase,
    structure: Option<UrlStructure>,
    responses: Option<Vec<FetchResponse>>,
    report: CrawlReport,
}

impl Coordinator {
    /// Creates a coordinator with the reqwest transport and the link-index adapter
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(HarvestError)` - Failed to build the client, adapter, or cache
    pub fn new(config: Config) -> Result<Self> {
        let transport = HttpTransport::new(&config.user_agent, &config.fetch)?;
        let adapter = LinkIndexAdapter::from_config(&config.site)?;
        Self::with_parts(config, Arc::new(adapter), Arc::new(transport))
    }

    /// Creates a coordinator around a caller-supplied adapter and transport
    pub fn with_parts(
        config: Config,
        adapter: Arc<dyn SiteAdapter>,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        let cache = SqliteCache::new(Path::new(&config.output.cache_path))?;
        let pool = FetchPool::new(transport, config.fetch.max_concurrent_requests);

        Ok(Self {
            config,
            adapter,
            pool,
            cache,
            phase: CrawlPhase::Init,
            structure: None,
            responses: None,
            report: CrawlReport {
                phases: vec![CrawlPhase::Init],
                ..CrawlReport::default()
            },
        })
    }

    /// Replaces the fetch pool (e.g. to attach an observer)
    pub fn with_pool(mut self, pool: FetchPool) -> Self {
        self.pool = pool;
        self
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    pub fn structure(&self) -> Option<&UrlStructure> {
        self.structure.as_ref()
    }

    pub fn responses(&self) -> Option<&[FetchResponse]> {
        self.responses.as_deref()
    }

    pub fn report(&self) -> &CrawlReport {
        &self.report
    }

    /// Token that aborts the fetch stage when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.pool.cancellation_token()
    }

    /// Runs every stage of the session
    ///
    /// Partial or total fetch failure does not fail the run; inspect
    /// `CrawlReport::fetched` to detect a degraded run.
    pub async fn run(&mut self) -> Result<CrawlReport> {
        tracing::info!(
            "Starting crawl session '{}' from {}",
            self.config.crawler.cache_key,
            self.config.crawler.site_map_url
        );

        self.load_structure().await?;
        self.fetch_pages().await?;
        self.cache_responses()?;
        self.transition(CrawlPhase::Done)?;

        tracing::info!(
            "Crawl session finished: {} of {} pages fetched ({} failed)",
            self.report.fetched,
            self.report.fetch_tasks,
            self.report.failed
        );

        Ok(self.report.clone())
    }

    /// Loads the URL structure from the cache, or discovers, classifies and caches it
    pub async fn load_structure(&mut self) -> Result<&UrlStructure> {
        let key = self.config.crawler.cache_key.clone();

        let structure = if self.config.crawler.read_structure_cache {
            self.transition(CrawlPhase::StructureCacheHit)?;
            let structure: UrlStructure = self.cache.get(&key, CacheSlot::Structure)?;
            tracing::info!(
                "Loaded URL structure '{}' from cache ({} URLs)",
                key,
                structure.child_count()
            );
            self.report.structure_from_cache = true;
            structure
        } else {
            self.transition(CrawlPhase::Traversing)?;
            let urls = self
                .adapter
                .discover_urls(&self.config.crawler.site_map_url, &self.pool)
                .await?;
            self.report.discovered_urls = urls.len();

            self.transition(CrawlPhase::Classifying)?;
            let structure = self.adapter.classify(&urls);
            self.cache.put(&key, CacheSlot::Structure, &structure)?;
            tracing::info!(
                "Cached URL structure '{}' ({} groups, {} URLs)",
                key,
                structure.groups().len(),
                structure.child_count()
            );
            structure
        };

        self.transition(CrawlPhase::StructureCached)?;
        Ok(self.structure.insert(structure))
    }

    /// Fetches every page named by the structure document
    ///
    /// Does nothing when responses are to be read from the cache.
    pub async fn fetch_pages(&mut self) -> Result<()> {
        if self.config.crawler.read_response_cache {
            tracing::debug!("Response cache read enabled, skipping fetch");
            return Ok(());
        }

        let Some(structure) = self.structure.as_ref() else {
            return Err(self.precondition("cannot fetch pages before the URL structure is loaded"));
        };

        let mut batch = structure.to_fetch_batch();
        if let Some(limit) = self.config.crawler.fetch_limit {
            if batch.len() > limit {
                tracing::info!("Fetch limit {} applied to {} tasks", limit, batch.len());
                batch.truncate(limit);
            }
        }

        self.transition(CrawlPhase::Fetching)?;
        let tasks = batch.len();
        let responses = self.pool.fetch_all(batch).await;

        self.report.fetch_tasks = tasks;
        self.report.fetched = responses.len();
        self.report.failed = tasks - responses.len();

        let responses = self.responses.insert(responses);

        if self.config.crawler.debug_mode {
            let dir = Path::new(&self.config.output.html_dir);
            let dump = write_debug_pages(dir, responses, self.adapter.as_ref());
            self.report.pages_written = dump.written;
            self.report.pages_failed = dump.failed;
            tracing::debug!(
                "Wrote {} pages to {} ({} failed)",
                dump.written,
                dir.display(),
                dump.failed
            );
        }

        Ok(())
    }

    /// Persists the fetched responses, or loads them from the cache
    ///
    /// # Errors
    ///
    /// `HarvestError::Precondition` when writing is enabled and no fetch batch
    /// has completed yet.
    pub fn cache_responses(&mut self) -> Result<&[FetchResponse]> {
        let key = self.config.crawler.url_cache_key.clone();

        if self.config.crawler.read_response_cache {
            self.transition(CrawlPhase::ResponseCacheHit)?;
            let responses: Vec<FetchResponse> = self.cache.get(&key, CacheSlot::Responses)?;
            tracing::info!(
                "Loaded {} responses '{}' from cache",
                responses.len(),
                key
            );
            self.report.responses_from_cache = true;
            self.responses = Some(responses);
        } else {
            let Some(responses) = self.responses.as_ref() else {
                return Err(self.precondition(
                    "cannot cache responses: no fetch batch has completed in this session",
                ));
            };
            self.cache.put(&key, CacheSlot::Responses, responses)?;
            tracing::info!("Cached {} responses under '{}'", responses.len(), key);
        }

        self.transition(CrawlPhase::ResponseCached)?;
        Ok(self.responses.as_deref().unwrap_or_default())
    }

    fn transition(&mut self, next: CrawlPhase) -> Result<()> {
        if !self.phase.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }

        tracing::debug!("Crawl phase {} -> {}", self.phase, next);
        self.phase = next;
        self.report.phases.push(next);
        Ok(())
    }

    fn precondition(&self, message: &str) -> HarvestError {
        tracing::error!("{} (phase: {})", message, self.phase);
        HarvestError::Precondition(message.to_string())
    }
}
