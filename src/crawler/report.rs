//! Crawl counters and the final report
//!
//! Workers bump shared atomic counters; the controller turns them into a
//! [`CrawlReport`] once every worker has been joined.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Live counters shared by every worker of one crawl
#[derive(Debug, Default)]
pub struct CrawlStats {
    pages_fetched: AtomicUsize,
    fetch_failures: AtomicUsize,
    content_mismatches: AtomicUsize,
    robots_denied: AtomicUsize,
    already_visited: AtomicUsize,
    budget_dropped: AtomicUsize,
    persistence_failures: AtomicUsize,
    edges_recorded: AtomicUsize,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_pages_fetched(&self) {
        self.pages_fetched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_fetch_failures(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_content_mismatches(&self) {
        self.content_mismatches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_robots_denied(&self) {
        self.robots_denied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_already_visited(&self) {
        self.already_visited.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_budget_dropped(&self) {
        self.budget_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_persistence_failures(&self) {
        self.persistence_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_edges_recorded(&self) {
        self.edges_recorded.fetch_add(1, Ordering::Relaxed);
    }

    /// Freezes the counters into a report
    pub fn report(&self, elapsed: Duration, pages_scheduled: usize, cancelled: bool) -> CrawlReport {
        CrawlReport {
            elapsed,
            pages_scheduled,
            pages_fetched: self.pages_fetched.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            content_mismatches: self.content_mismatches.load(Ordering::Relaxed),
            robots_denied: self.robots_denied.load(Ordering::Relaxed),
            already_visited: self.already_visited.load(Ordering::Relaxed),
            budget_dropped: self.budget_dropped.load(Ordering::Relaxed),
            persistence_failures: self.persistence_failures.load(Ordering::Relaxed),
            edges_recorded: self.edges_recorded.load(Ordering::Relaxed),
            cancelled,
        }
    }
}

/// Summary of a finished crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    /// Wall time from start of initialization to the last worker joining
    pub elapsed: Duration,
    /// Distinct pages scheduled, seed included
    pub pages_scheduled: usize,
    /// Pages fetched as HTML and processed
    pub pages_fetched: usize,
    /// Timeouts, connection errors and non-2xx answers
    pub fetch_failures: usize,
    /// Responses that were not HTML
    pub content_mismatches: usize,
    /// Links refused by robots.txt
    pub robots_denied: usize,
    /// Links dropped because they were already scheduled
    pub already_visited: usize,
    /// Links dropped because the page budget was used up
    pub budget_dropped: usize,
    /// Page or edge writes that failed
    pub persistence_failures: usize,
    /// Edges written to the archive
    pub edges_recorded: usize,
    /// Whether the crawl was cut short
    pub cancelled: bool,
}

impl CrawlReport {
    /// Pages fetched per second of wall time
    pub fn pages_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.pages_fetched as f64 / secs
        } else {
            0.0
        }
    }
}

impl fmt::Display for CrawlReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Crawl {}", if self.cancelled { "cancelled" } else { "complete" })?;
        writeln!(f, "  Elapsed:              {:.2?}", self.elapsed)?;
        writeln!(f, "  Pages scheduled:      {}", self.pages_scheduled)?;
        writeln!(
            f,
            "  Pages fetched:        {} ({:.2} pages/sec)",
            self.pages_fetched,
            self.pages_per_second()
        )?;
        writeln!(f, "  Fetch failures:       {}", self.fetch_failures)?;
        writeln!(f, "  Non-HTML responses:   {}", self.content_mismatches)?;
        writeln!(f, "  Denied by robots.txt: {}", self.robots_denied)?;
        writeln!(f, "  Duplicate links:      {}", self.already_visited)?;
        writeln!(f, "  Over page budget:     {}", self.budget_dropped)?;
        writeln!(f, "  Edges recorded:       {}", self.edges_recorded)?;
        write!(f, "  Persistence failures: {}", self.persistence_failures)
    }
}
