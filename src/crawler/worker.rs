//! Crawl workers
//!
//! Each worker repeatedly takes an entry from the frontier, fetches and processes
//! the page, stores its text and schedules the links it may follow. Every failure
//! is confined to the entry that caused it.

use crate::config::CrawlConfig;
use crate::crawler::fetcher::{fetch_url, FetchResult};
use crate::crawler::frontier::{Frontier, FrontierEntry};
use crate::crawler::parser::process_page;
use crate::crawler::report::CrawlStats;
use crate::crawler::visited::{Admission, VisitedSet};
use crate::robots::RobotsPolicy;
use crate::storage::Archive;
use crate::url::LinkFilter;
use reqwest::Client;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Everything the workers of one crawl share
pub struct CrawlContext {
    pub config: CrawlConfig,
    pub client: Client,
    pub robots: RobotsPolicy,
    pub filter: LinkFilter,
    /// Normalized seed URL
    pub seed: Url,
    pub archive: Arc<Archive>,
    pub frontier: Frontier,
    pub visited: VisitedSet,
    pub stats: CrawlStats,
    pub cancel: CancellationToken,
}

impl CrawlContext {
    pub fn new(
        config: CrawlConfig,
        client: Client,
        robots: RobotsPolicy,
        filter: LinkFilter,
        seed: Url,
        archive: Arc<Archive>,
        cancel: CancellationToken,
    ) -> Self {
        let visited = VisitedSet::new(config.max_pages);
        Self {
            config,
            client,
            robots,
            filter,
            seed,
            archive,
            frontier: Frontier::new(),
            visited,
            stats: CrawlStats::new(),
            cancel,
        }
    }
}

/// Acknowledges a frontier entry when dropped, even if processing panicked
struct Acknowledge<'a>(&'a Frontier);

impl Drop for Acknowledge<'_> {
    fn drop(&mut self) {
        self.0.task_done();
    }
}

/// Runs one worker until it receives a shutdown signal or the crawl is cancelled
///
/// # Arguments
///
/// * `id` - Worker number, used in log lines
/// * `ctx` - The shared crawl context
pub async fn run_worker(id: usize, ctx: Arc<CrawlContext>) {
    tracing::debug!("Worker {} started", id);

    while let Some(entry) = ctx.frontier.take(&ctx.cancel).await {
        let _ack = Acknowledge(&ctx.frontier);

        if ctx.cancel.is_cancelled() {
            tracing::debug!("Skipping {}: crawl cancelled", entry.url);
            continue;
        }

        process_entry(&ctx, &entry).await;
    }

    tracing::debug!("Worker {} is done", id);
}

/// Fetches, stores and expands one frontier entry
async fn process_entry(ctx: &CrawlContext, entry: &FrontierEntry) {
    let url = entry.url.as_str();

    // Scheduled links were marked on admission; only the seed is new here
    ctx.visited.mark_if_new(url);

    tracing::info!("Fetching {} (depth {})", url, entry.depth);

    let body = match fetch_url(&ctx.client, url).await {
        FetchResult::Success { body, final_url, .. } => {
            if final_url != url {
                tracing::debug!("{} redirected to {}", url, final_url);
            }
            body
        }
        FetchResult::ContentMismatch { content_type } => {
            ctx.stats.increment_content_mismatches();
            tracing::info!("Skipping {}: content type {:?} is not HTML", url, content_type);
            return;
        }
        FetchResult::HttpError { status_code } => {
            ctx.stats.increment_fetch_failures();
            tracing::warn!("Failed to fetch {}: HTTP {}", url, status_code);
            return;
        }
        FetchResult::NetworkError { error, timed_out } => {
            ctx.stats.increment_fetch_failures();
            if timed_out {
                tracing::warn!("Timed out fetching {}", url);
            } else {
                tracing::warn!("Failed to fetch {}: {}", url, error);
            }
            return;
        }
    };

    ctx.stats.increment_pages_fetched();

    let page = process_page(&body, &entry.url, &ctx.filter);
    tracing::debug!(
        "Processed {}: {} chars of text, {} links",
        url,
        page.text.len(),
        page.links.len()
    );

    if let Err(e) = ctx.archive.upsert_page(url, &page.text) {
        ctx.stats.increment_persistence_failures();
        tracing::error!("Failed to store page {}: {}", url, e);
        return;
    }

    let next_depth = entry.depth + 1;
    if next_depth > ctx.config.max_depth {
        tracing::trace!("Not following links of {}: max depth reached", url);
        return;
    }

    for link in &page.links {
        if ctx.cancel.is_cancelled() {
            break;
        }
        schedule_link(ctx, url, link, next_depth);
    }
}

/// Applies robots, dedup and budget checks to one link and enqueues it
fn schedule_link(ctx: &CrawlContext, from_url: &str, link: &str, depth: u32) {
    let link_url = match Url::parse(link) {
        Ok(url) => url,
        Err(e) => {
            tracing::trace!("Dropping unparseable link {}: {}", link, e);
            return;
        }
    };

    if !ctx.robots.is_allowed(&link_url) {
        ctx.stats.increment_robots_denied();
        tracing::info!("robots.txt disallows {}", link);
        return;
    }

    match ctx.visited.try_schedule(link) {
        Admission::Admitted => {}
        Admission::AlreadyVisited => {
            ctx.stats.increment_already_visited();
            tracing::trace!("Already scheduled: {}", link);
            return;
        }
        Admission::BudgetExhausted => {
            ctx.stats.increment_budget_dropped();
            tracing::debug!("Page budget exhausted, dropping {}", link);
            return;
        }
    }

    match ctx.archive.insert_edge(from_url, link) {
        Ok(()) => ctx.stats.increment_edges_recorded(),
        Err(e) => {
            ctx.stats.increment_persistence_failures();
            tracing::error!("Failed to store link {} -> {}: {}", from_url, link, e);
        }
    }

    // A failed edge write still leaves the page worth visiting
    ctx.frontier.put(FrontierEntry::new(depth, link_url));
}
