//! Statistics generation from the archive database
//!
//! This module provides functionality for extracting and displaying
//! archive statistics from the storage layer.

use crate::storage::{PageStore, StorageResult};

/// Archive statistics summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveStatistics {
    /// Total number of pages known, stubs included
    pub total_pages: u64,

    /// Pages whose text was stored by a fetch
    pub fetched_pages: u64,

    /// Pages only known as link targets
    pub stub_pages: u64,

    /// Total number of links recorded
    pub total_links: u64,
}

impl ArchiveStatistics {
    /// Percentage of known pages that were fetched
    pub fn fetched_percentage(&self) -> f64 {
        if self.total_pages > 0 {
            (self.fetched_pages as f64 / self.total_pages as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(ArchiveStatistics)` - Successfully loaded statistics
/// * `Err(StorageError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn PageStore) -> StorageResult<ArchiveStatistics> {
    let total_pages = storage.count_total_pages()?;
    let fetched_pages = storage.count_fetched_pages()?;
    let total_links = storage.count_links()?;

    Ok(ArchiveStatistics {
        total_pages,
        fetched_pages,
        stub_pages: total_pages.saturating_sub(fetched_pages),
        total_links,
    })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &ArchiveStatistics) {
    println!("=== Archive Statistics ===\n");

    println!("Pages:");
    println!("  Total pages: {}", stats.total_pages);
    println!(
        "  Fetched: {} ({:.1}%)",
        stats.fetched_pages,
        stats.fetched_percentage()
    );
    println!("  Link targets only: {}", stats.stub_pages);
    println!();

    println!("Links:");
    println!("  Total links: {}", stats.total_links);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStorage;

    #[test]
    fn test_statistics_of_empty_archive() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        let stats = load_statistics(&storage).unwrap();

        assert_eq!(stats.total_pages, 0);
        assert_eq!(stats.total_links, 0);
        assert_eq!(stats.fetched_percentage(), 0.0);
    }

    #[test]
    fn test_statistics_count_stubs() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        storage.upsert_page("http://example.com/", "root").unwrap();
        storage
            .insert_edge("http://example.com/", "http://example.com/a")
            .unwrap();
        storage
            .insert_edge("http://example.com/", "http://example.com/b")
            .unwrap();
        storage.upsert_page("http://example.com/a", "A").unwrap();

        let stats = load_statistics(&storage).unwrap();

        assert_eq!(
            stats,
            ArchiveStatistics {
                total_pages: 3,
                fetched_pages: 2,
                stub_pages: 1,
                total_links: 2,
            }
        );
        assert!((stats.fetched_percentage() - 66.666).abs() < 0.01);
    }
}
