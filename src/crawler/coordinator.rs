//! Crawler coordinator - breadth-first crawl orchestration
//!
//! This module drives a crawl level by level:
//! - Dispatching every URL of the current level through its host-gate
//! - Recording downloads and failures in the shared crawl state
//! - Handing downloaded pages to the extractor pool while depth remains
//! - Waiting on the level barrier, then rotating frontiers
//! - Reclaiming idle host-gates between levels

use crate::config::{validate_crawler_config, CrawlerConfig};
use crate::crawler::barrier::TaskBarrier;
use crate::crawler::downloader::{Downloader, Page};
use crate::crawler::host_gate::HostGate;
use crate::crawler::pool::WorkerPool;
use crate::state::{CrawlResult, CrawlState};
use crate::url::{extract_host, is_excluded};
use crate::ConfigError;
use dashmap::DashMap;
use std::sync::{Arc, Weak};

/// Bounded-concurrency breadth-first web crawler
///
/// Downloads run on a pool of `downloaders` workers, at most `per_host` of
/// them against any one host. Link extraction runs on a separate pool of
/// `extractors` workers. Host-gates live as long as the crawler and are
/// shared by concurrent crawls.
pub struct WebCrawler<D: Downloader> {
    downloader: Arc<D>,
    config: CrawlerConfig,
    download_pool: Arc<WorkerPool>,
    extract_pool: Arc<WorkerPool>,
    host_gates: DashMap<String, Arc<HostGate>>,
}

/// References a task needs, cloned into every job
struct TaskContext<D: Downloader> {
    downloader: Arc<D>,
    state: Arc<CrawlState>,
    barrier: Arc<TaskBarrier>,
    extract_pool: Arc<WorkerPool>,
}

impl<D: Downloader> Clone for TaskContext<D> {
    fn clone(&self) -> Self {
        Self {
            downloader: self.downloader.clone(),
            state: self.state.clone(),
            barrier: self.barrier.clone(),
            extract_pool: self.extract_pool.clone(),
        }
    }
}

/// Releases the host-gate and deregisters from the barrier when dropped
///
/// Owned by every job, so both happen on every exit path: normal return,
/// early skip, panic, or the job being dropped unpolled by a closed pool.
/// The gate is released first so that a drained barrier implies idle gates.
struct TaskGuard {
    barrier: Arc<TaskBarrier>,
    gate: Option<Weak<HostGate>>,
}

impl TaskGuard {
    /// Registers a new party on `barrier`
    fn register(barrier: &Arc<TaskBarrier>, gate: Option<Weak<HostGate>>) -> Self {
        barrier.register();
        Self {
            barrier: barrier.clone(),
            gate,
        }
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        if let Some(gate) = self.gate.take().and_then(|gate| gate.upgrade()) {
            gate.release();
        }
        self.barrier.deregister();
    }
}

impl<D: Downloader> WebCrawler<D> {
    /// Creates a crawler and starts both worker pools
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Returns
    ///
    /// * `Ok(WebCrawler)` - Pools started
    /// * `Err(ConfigError)` - A pool size or the per-host cap is zero
    pub fn new(downloader: D, config: CrawlerConfig) -> Result<Self, ConfigError> {
        validate_crawler_config(&config)?;

        tracing::info!(
            "Starting crawler: {} downloaders, {} extractors, {} per host",
            config.downloaders,
            config.extractors,
            config.per_host
        );

        Ok(Self {
            downloader: Arc::new(downloader),
            download_pool: Arc::new(WorkerPool::new("downloader", config.downloaders)),
            extract_pool: Arc::new(WorkerPool::new("extractor", config.extractors)),
            host_gates: DashMap::new(),
            config,
        })
    }

    /// Creates a crawler from pool sizes and the per-host cap
    pub fn with_limits(
        downloader: D,
        downloaders: usize,
        extractors: usize,
        per_host: usize,
    ) -> Result<Self, ConfigError> {
        Self::new(
            downloader,
            CrawlerConfig::new(downloaders, extractors, per_host),
        )
    }

    /// Returns the crawler configuration
    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    /// Returns the number of host-gates currently held
    pub fn host_gate_count(&self) -> usize {
        self.host_gates.len()
    }

    /// Crawls from `url` down to `depth` levels with no exclusions
    pub async fn download(&self, url: &str, depth: u32) -> CrawlResult {
        self.download_excluding(url, depth, &[]).await
    }

    /// Crawls from `url` down to `depth` levels, skipping excluded URLs
    ///
    /// A depth of 1 downloads only the seed; 0 downloads nothing. A URL that
    /// contains any of `excludes` is never downloaded and never recorded.
    /// Per-URL failures are collected in the result, never returned as `Err`.
    pub async fn download_excluding(
        &self,
        url: &str,
        depth: u32,
        excludes: &[String],
    ) -> CrawlResult {
        if is_excluded(url, excludes) {
            tracing::debug!("Seed {} is excluded", url);
            return CrawlResult::default();
        }

        let ctx = TaskContext {
            downloader: self.downloader.clone(),
            state: Arc::new(CrawlState::new(excludes.to_vec())),
            barrier: Arc::new(TaskBarrier::new()),
            extract_pool: self.extract_pool.clone(),
        };

        let mut current = vec![url.to_string()];
        let mut remaining = depth;
        let mut level = 0u32;

        while !current.is_empty() && remaining > 0 {
            tracing::info!("Level {}: dispatching {} URLs", level, current.len());

            // Hold the barrier open until every URL of this level is submitted
            ctx.barrier.register();
            for page_url in current.drain(..) {
                self.dispatch_download(&ctx, page_url, remaining);
            }
            ctx.barrier.arrive_and_wait().await;

            current = ctx.state.take_next();
            remaining -= 1;
            level += 1;

            tracing::info!(
                "Level {} done: {} downloaded, {} errors, {} queued for next level",
                level - 1,
                ctx.state.visited_count(),
                ctx.state.error_count(),
                current.len()
            );

            self.reclaim_host_gates();
        }

        let result = ctx.state.drain_result();
        tracing::info!(
            "Crawl from {} finished: {} downloaded, {} errors",
            url,
            result.downloaded.len(),
            result.errors.len()
        );
        result
    }

    /// Stops both pools, downloader pool first
    ///
    /// Downloads already handed to the pool still run and may still queue
    /// extractions; those run too. Crawls started afterwards record nothing.
    pub async fn close(&self) {
        self.download_pool.close().await;
        self.extract_pool.close().await;
        tracing::info!("Crawler closed");
    }

    /// Registers a download task for `url` and submits it through its host's gate
    ///
    /// Malformed URLs are recorded as errors instead. The map entry stays
    /// locked until the gate has admitted or queued the task, so reclamation
    /// running for a concurrent crawl cannot detach the gate in between.
    fn dispatch_download(&self, ctx: &TaskContext<D>, url: String, remaining: u32) {
        let host = match extract_host(&url) {
            Ok(host) => host,
            Err(e) => {
                tracing::debug!("Skipping malformed URL {}: {}", url, e);
                ctx.state.record_error(url, e.into());
                return;
            }
        };

        let gate = self.host_gates.entry(host.clone()).or_insert_with(|| {
            Arc::new(HostGate::new(
                host,
                self.config.per_host,
                self.download_pool.clone(),
            ))
        });

        let guard = TaskGuard::register(&ctx.barrier, Some(Arc::downgrade(gate.value())));
        let task_ctx = ctx.clone();
        gate.submit(Box::pin(async move {
            let _guard = guard;
            download_page(&task_ctx, url, remaining).await;
        }));
    }

    /// Drops idle host-gates once there are more than the soft cap
    fn reclaim_host_gates(&self) {
        let before = self.host_gates.len();
        if before <= self.config.host_gate_soft_cap {
            return;
        }

        // Shard locks serialise this with dispatch_download's entry lock
        self.host_gates.retain(|_, gate| !gate.is_idle());
        tracing::debug!(
            "Reclaimed {} idle host-gates ({} remain)",
            before - self.host_gates.len(),
            self.host_gates.len()
        );
    }
}

/// Body of a download task
async fn download_page<D: Downloader>(ctx: &TaskContext<D>, url: String, remaining: u32) {
    if ctx.state.is_settled(&url) {
        tracing::trace!("Already processed {}, skipping", url);
        return;
    }

    match ctx.downloader.download(&url).await {
        Ok(page) => {
            tracing::debug!("Downloaded {}", url);
            ctx.state.mark_visited(url.clone());
            if remaining > 1 {
                dispatch_extraction(ctx, url, page);
            }
        }
        Err(e) => {
            tracing::debug!("Download failed for {}: {}", url, e);
            ctx.state.record_error(url, e.into());
        }
    }
}

/// Registers an extraction task for `page` and submits it to the extractor pool
fn dispatch_extraction<D: Downloader>(ctx: &TaskContext<D>, url: String, page: D::Page) {
    let guard = TaskGuard::register(&ctx.barrier, None);
    let state = ctx.state.clone();

    let submitted = ctx.extract_pool.submit(async move {
        let _guard = guard;
        extract_page_links(&state, &url, page).await;
    });

    if let Err(e) = submitted {
        tracing::error!("Could not queue link extraction: {}", e);
    }
}

/// Body of an extraction task
///
/// Extraction failures are logged and otherwise dropped: the page stays
/// downloaded and simply contributes no links.
async fn extract_page_links<P: Page>(state: &CrawlState, url: &str, page: P) {
    match page.extract_links().await {
        Ok(links) => {
            let found = links.len();
            let queued = links
                .into_iter()
                .filter(|link| state.is_novel(link))
                .filter(|link| state.push_next(link.clone()))
                .count();
            tracing::debug!("{}: {} links, {} new", url, found, queued);
        }
        Err(e) => {
            tracing::warn!("Link extraction failed for {}: {}", url, e);
        }
    }
}
