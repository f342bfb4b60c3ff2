//! Crawler coordinator - main crawl orchestration logic
//!
//! This module drives one crawl through its phases:
//! - Initializing: seed normalization, base domain, HTTP client, robots.txt
//! - Running: seeding the frontier and starting the worker pool
//! - Draining: waiting for the frontier to empty, then shutting workers down
//! - Stopped: building the final report

use crate::config::{validate_crawl_config, CrawlConfig};
use crate::crawler::fetcher::build_http_client;
use crate::crawler::frontier::FrontierEntry;
use crate::crawler::report::CrawlReport;
use crate::crawler::worker::{run_worker, CrawlContext};
use crate::robots::load_policy;
use crate::state::CrawlPhase;
use crate::storage::Archive;
use crate::url::{normalize_seed, registrable_domain_of, LinkFilter};
use crate::{CrawlError, Result};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Controller of a single crawl
///
/// A `Crawler` is consumed by [`Crawler::run`]; a new crawl needs a new instance,
/// which brings a fresh frontier and visited set with it.
pub struct Crawler {
    config: CrawlConfig,
    archive: Arc<Archive>,
    phase: CrawlPhase,
    cancel: CancellationToken,
}

impl Crawler {
    /// Creates a crawler that will write into `archive`
    ///
    /// # Arguments
    ///
    /// * `config` - Settings of this crawl
    /// * `archive` - Persistence gateway shared with the caller
    pub fn new(config: CrawlConfig, archive: Arc<Archive>) -> Self {
        Self {
            config,
            archive,
            phase: CrawlPhase::Idle,
            cancel: CancellationToken::new(),
        }
    }

    /// Replaces the crawler's cancellation token
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Returns a token that stops the crawl when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    fn transition(&mut self, next: CrawlPhase) -> Result<()> {
        if !self.phase.can_transition_to(next) {
            return Err(CrawlError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        tracing::debug!("Crawl phase {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }

    /// Runs the crawl to completion
    ///
    /// Fetch, parse and persistence failures never abort the crawl; they are
    /// counted in the returned report. Only invalid settings or a failure to build
    /// the HTTP client end it early.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - The crawl finished or was cancelled
    /// * `Err(CrawlError)` - The crawl could not start
    pub async fn run(mut self) -> Result<CrawlReport> {
        let started = Instant::now();

        self.transition(CrawlPhase::Initializing)?;
        let ctx = match self.initialize().await {
            Ok(ctx) => Arc::new(ctx),
            Err(e) => {
                tracing::error!("Crawl initialization failed: {}", e);
                self.transition(CrawlPhase::Stopped)?;
                return Err(e);
            }
        };

        self.transition(CrawlPhase::Running)?;
        let seed = FrontierEntry::new(0, ctx.seed.clone());
        tracing::info!(
            "Crawling {} with {} workers (max depth {}, max pages {})",
            seed.url,
            self.config.workers,
            self.config.max_depth,
            if self.config.max_pages == 0 {
                "unlimited".to_string()
            } else {
                self.config.max_pages.to_string()
            }
        );
        ctx.frontier.put(seed);
        let workers = self.spawn_workers(&ctx);

        self.transition(CrawlPhase::Draining)?;
        let cancelled = tokio::select! {
            _ = ctx.frontier.wait_until_drained() => false,
            _ = self.cancel.cancelled() => true,
        };
        if cancelled {
            tracing::warn!("Crawl cancelled with {} entries pending", ctx.frontier.pending());
        }

        ctx.frontier.shutdown(workers.len());
        for (id, handle) in workers.into_iter().enumerate() {
            if let Err(e) = handle.await {
                tracing::error!("Worker {} failed: {}", id, e);
            }
        }

        self.transition(CrawlPhase::Stopped)?;
        let report = ctx
            .stats
            .report(started.elapsed(), ctx.visited.scheduled(), cancelled);

        tracing::info!(
            "Crawl finished in {:.2?}: {} pages scheduled, {} fetched, {} edges",
            report.elapsed,
            report.pages_scheduled,
            report.pages_fetched,
            report.edges_recorded
        );

        Ok(report)
    }

    /// Builds the shared context: validated settings, seed, client and robots policy
    async fn initialize(&self) -> Result<CrawlContext> {
        validate_crawl_config(&self.config)?;

        let seed = normalize_seed(&self.config.seed).map_err(|e| CrawlError::InvalidSeed {
            seed: self.config.seed.clone(),
            reason: e.to_string(),
        })?;

        let base_domain =
            registrable_domain_of(&seed).ok_or_else(|| CrawlError::InvalidSeed {
                seed: self.config.seed.clone(),
                reason: "no host".to_string(),
            })?;
        tracing::debug!("Seed {} has base domain {}", seed, base_domain);

        let client = build_http_client(&self.config.user_agent, self.config.request_timeout)?;
        let robots = load_policy(&client, &seed, &base_domain).await;
        let filter = LinkFilter::new(base_domain, self.config.exclude_external_links);

        Ok(CrawlContext::new(
            self.config.clone(),
            client,
            robots,
            filter,
            seed,
            Arc::clone(&self.archive),
            self.cancel.clone(),
        ))
    }

    fn spawn_workers(&self, ctx: &Arc<CrawlContext>) -> Vec<JoinHandle<()>> {
        (0..self.config.workers)
            .map(|id| {
                let span = tracing::info_span!("worker", id);
                tokio::spawn(run_worker(id, Arc::clone(ctx)).instrument(span))
            })
            .collect()
    }
}

/// Runs a complete crawl
///
/// This is the main entry point for embedding applications.
///
/// # Arguments
///
/// * `config` - The crawl settings
/// * `archive` - Where pages and links are stored
///
/// # Example
///
/// ```no_run
/// use site_archiver::{run_crawl, Archive, CrawlConfig, SqliteStorage};
/// use std::sync::Arc;
///
/// # async fn demo() -> site_archiver::Result<()> {
/// let archive = Arc::new(Archive::new(SqliteStorage::new_in_memory()?));
/// let report = run_crawl(CrawlConfig::new("example.com", 2, 100), archive).await?;
/// println!("{}", report);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: CrawlConfig, archive: Arc<Archive>) -> Result<CrawlReport> {
    Crawler::new(config, archive).run().await
}
