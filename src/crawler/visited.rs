//! Visited set and page budget
//!
//! One lock guards both the set of known URLs and the count of scheduled pages,
//! so "is it new" and "is there budget left" are decided together.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

/// Outcome of offering a discovered URL to the visited set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// New URL within budget; it is now marked and counted
    Admitted,
    /// URL was already scheduled or visited
    AlreadyVisited,
    /// The page budget is used up
    BudgetExhausted,
}

#[derive(Debug)]
struct Inner {
    urls: HashSet<String>,
    scheduled: usize,
}

/// URLs already scheduled or visited during one crawl
#[derive(Debug)]
pub struct VisitedSet {
    inner: Mutex<Inner>,
    /// Maximum pages to schedule, 0 for unlimited
    max_pages: usize,
}

impl VisitedSet {
    /// Creates the set for a crawl whose seed has already been scheduled
    ///
    /// The seed counts against `max_pages`.
    pub fn new(max_pages: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                urls: HashSet::new(),
                scheduled: 1,
            }),
            max_pages,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Records `url`, returning true if it was not present before
    pub fn mark_if_new(&self, url: &str) -> bool {
        self.lock().urls.insert(url.to_string())
    }

    /// Marks and counts `url` if it is new and the budget allows another page
    pub fn try_schedule(&self, url: &str) -> Admission {
        let mut inner = self.lock();

        if inner.urls.contains(url) {
            return Admission::AlreadyVisited;
        }

        if self.max_pages != 0 && inner.scheduled >= self.max_pages {
            return Admission::BudgetExhausted;
        }

        inner.urls.insert(url.to_string());
        inner.scheduled += 1;
        Admission::Admitted
    }

    /// Number of distinct pages scheduled, seed included
    pub fn scheduled(&self) -> usize {
        self.lock().scheduled
    }

    /// Number of URLs recorded
    pub fn len(&self) -> usize {
        self.lock().urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
