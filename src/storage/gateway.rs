//! Serialized access to the archive shared by all workers

use crate::storage::traits::{PageStore, StorageResult};
use std::sync::{Mutex, MutexGuard};

/// The persistence gateway of a crawl
///
/// Every read and write goes through one mutex, so the backend never sees two
/// concurrent calls. Calls are short and synchronous; they are never held across
/// an `.await`.
pub struct Archive {
    store: Mutex<Box<dyn PageStore + Send>>,
}

impl Archive {
    /// Wraps a storage backend
    pub fn new<S>(store: S) -> Self
    where
        S: PageStore + Send + 'static,
    {
        Self {
            store: Mutex::new(Box::new(store)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn PageStore + Send>> {
        // A panic inside one call must not take the archive down for everyone else
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Stores a fetched page's text (see [`PageStore::upsert_page`])
    pub fn upsert_page(&self, url: &str, text: &str) -> StorageResult<()> {
        self.lock().upsert_page(url, text)
    }

    /// Records a directed edge (see [`PageStore::insert_edge`])
    pub fn insert_edge(&self, from_url: &str, to_url: &str) -> StorageResult<()> {
        self.lock().insert_edge(from_url, to_url)
    }

    /// Empties the archive before a fresh crawl
    pub fn clear_all(&self) -> StorageResult<()> {
        self.lock().clear_all()
    }

    /// Runs a read-only closure against the backend under the gateway lock
    ///
    /// # Example
    ///
    /// ```
    /// use site_archiver::storage::{Archive, PageStore, SqliteStorage};
    ///
    /// let archive = Archive::new(SqliteStorage::new_in_memory().unwrap());
    /// archive.upsert_page("http://example.com/", "hello").unwrap();
    ///
    /// let total = archive.with_store(|store| store.count_total_pages()).unwrap();
    /// assert_eq!(total, 1);
    /// ```
    pub fn with_store<T>(&self, f: impl FnOnce(&dyn PageStore) -> T) -> T {
        let guard = self.lock();
        f(&**guard)
    }
}

impl std::fmt::Debug for Archive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Archive").finish_non_exhaustive()
    }
}
