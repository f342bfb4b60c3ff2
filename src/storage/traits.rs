//! Storage traits and error types
//!
//! This module defines the trait interface for archive backends and
//! associated error types.

use crate::storage::{LinkRecord, PageRecord};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Failed to prepare database location: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for archive backend implementations
///
/// Implementations are not required to be thread-safe; the crawl wraps its
/// backend in [`crate::storage::Archive`], which serializes every call.
pub trait PageStore {
    // ===== Writes =====

    /// Stores the text of a page, creating the page if it is unknown
    ///
    /// Calling this twice for the same URL leaves one page holding the latest text.
    ///
    /// # Arguments
    ///
    /// * `url` - The normalized page URL
    /// * `text` - The page's visible text
    fn upsert_page(&mut self, url: &str, text: &str) -> StorageResult<()>;

    /// Records that `from_url` links to `to_url`
    ///
    /// Missing endpoint pages are created as stubs with empty text. Recording an
    /// existing edge again is a no-op.
    fn insert_edge(&mut self, from_url: &str, to_url: &str) -> StorageResult<()>;

    /// Removes every page and link
    fn clear_all(&mut self) -> StorageResult<()>;

    // ===== Reads =====

    /// Gets a page by URL
    fn get_page_by_url(&self, url: &str) -> StorageResult<Option<PageRecord>>;

    /// Gets all outgoing links from the page with the given URL
    fn get_outgoing_links(&self, from_url: &str) -> StorageResult<Vec<LinkRecord>>;

    /// Gets total page count, stubs included
    fn count_total_pages(&self) -> StorageResult<u64>;

    /// Gets the number of pages whose text was stored by a fetch
    fn count_fetched_pages(&self) -> StorageResult<u64>;

    /// Counts the total number of links
    fn count_links(&self) -> StorageResult<u64>;
}
