//! Storage module for persisting the archive
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite database initialization and schema management
//! - Page text persistence
//! - Link relationship tracking
//! - Serialized access for concurrent workers

mod gateway;
mod schema;
mod sqlite;
mod traits;

pub use gateway::Archive;
pub use sqlite::SqliteStorage;
pub use traits::{PageStore, StorageError, StorageResult};

use std::path::Path;

/// Opens (or creates) an archive database and wraps it in a gateway
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(Archive)` - Successfully initialized storage
/// * `Err(StorageError)` - Failed to initialize storage
pub fn open_archive(path: &Path) -> StorageResult<Archive> {
    Ok(Archive::new(SqliteStorage::new(path)?))
}

/// Represents a page in the database
#[derive(Debug, Clone)]
pub struct PageRecord {
    pub id: i64,
    pub url: String,
    pub text: String,
    pub discovered_at: String,
    pub fetched_at: Option<String>,
}

impl PageRecord {
    /// Returns true if the page is only known as a link target
    pub fn is_stub(&self) -> bool {
        self.fetched_at.is_none()
    }
}

/// Represents a link relationship between pages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRecord {
    pub from_url: String,
    pub to_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_archive_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested.db");

        let archive = open_archive(&path).unwrap();
        archive.upsert_page("http://example.com/", "x").unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_open_archive_bad_path() {
        let result = open_archive(Path::new("/nonexistent-dir/sub/archive.db"));
        assert!(result.is_err());
    }
}
