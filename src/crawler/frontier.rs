//! The crawl frontier
//!
//! A FIFO work queue shared by all workers, with a join barrier: every entry that
//! is `put` must later be acknowledged with `task_done`, and `wait_until_drained`
//! returns only when nothing is queued or in progress.

use tokio::sync::{mpsc, watch, Mutex};
use tokio_util::sync::CancellationToken;
use url::Url;

/// A unit of work: a URL and its link distance from the seed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub depth: u32,
    pub url: Url,
}

impl FrontierEntry {
    pub fn new(depth: u32, url: Url) -> Self {
        Self { depth, url }
    }
}

#[derive(Debug)]
enum Task {
    Visit(FrontierEntry),
    Shutdown,
}

/// Concurrent work queue with drain tracking
pub struct Frontier {
    sender: mpsc::UnboundedSender<Task>,
    receiver: Mutex<mpsc::UnboundedReceiver<Task>>,
    /// Entries put but not yet acknowledged
    pending: watch::Sender<usize>,
}

impl Frontier {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let (pending, _) = watch::channel(0);
        Self {
            sender,
            receiver: Mutex::new(receiver),
            pending,
        }
    }

    /// Enqueues an entry
    pub fn put(&self, entry: FrontierEntry) {
        // Count before sending so a fast consumer can never acknowledge first
        self.pending.send_modify(|n| *n += 1);
        if self.sender.send(Task::Visit(entry)).is_err() {
            self.pending.send_modify(|n| *n = n.saturating_sub(1));
        }
    }

    /// Waits for the next entry
    ///
    /// Returns `None` when a shutdown signal is received or `cancel` fires.
    pub async fn take(&self, cancel: &CancellationToken) -> Option<FrontierEntry> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            task = async { self.receiver.lock().await.recv().await } => match task {
                Some(Task::Visit(entry)) => Some(entry),
                Some(Task::Shutdown) | None => None,
            },
        }
    }

    /// Acknowledges that an entry returned by `take` has been fully processed
    pub fn task_done(&self) {
        self.pending.send_modify(|n| *n = n.saturating_sub(1));
    }

    /// Returns once every entry put so far has been taken and acknowledged
    pub async fn wait_until_drained(&self) {
        let mut rx = self.pending.subscribe();
        // The sender lives as long as `self`, so this cannot fail
        let _ = rx.wait_for(|n| *n == 0).await;
    }

    /// Sends one shutdown signal per worker
    pub fn shutdown(&self, workers: usize) {
        for _ in 0..workers {
            let _ = self.sender.send(Task::Shutdown);
        }
    }

    /// Number of entries put but not yet acknowledged
    pub fn pending(&self) -> usize {
        *self.pending.borrow()
    }
}

impl Default for Frontier {
    fn default() -> Self {
        Self::new()
    }
}
