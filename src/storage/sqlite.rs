//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the PageStore trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{PageStore, StorageResult};
use crate::storage::{LinkRecord, PageRecord};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

/// Ensures a page row exists and returns its id
fn ensure_page(conn: &Connection, url: &str, now: &str) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT OR IGNORE INTO pages (url, text, discovered_at) VALUES (?1, '', ?2)",
        params![url, now],
    )?;
    conn.query_row("SELECT id FROM pages WHERE url = ?1", params![url], |row| {
        row.get(0)
    })
}

impl PageStore for SqliteStorage {
    fn upsert_page(&mut self, url: &str, text: &str) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO pages (url, text, discovered_at, fetched_at) VALUES (?1, ?2, ?3, ?3)
             ON CONFLICT(url) DO UPDATE SET text = excluded.text, fetched_at = excluded.fetched_at",
            params![url, text, now],
        )?;
        Ok(())
    }

    fn insert_edge(&mut self, from_url: &str, to_url: &str) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;

        let from_id = ensure_page(&tx, from_url, &now)?;
        let to_id = ensure_page(&tx, to_url, &now)?;

        tx.execute(
            "INSERT OR IGNORE INTO links (from_page_id, to_page_id) VALUES (?1, ?2)",
            params![from_id, to_id],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn clear_all(&mut self) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM links", [])?;
        tx.execute("DELETE FROM pages", [])?;
        tx.commit()?;
        Ok(())
    }

    fn get_page_by_url(&self, url: &str) -> StorageResult<Option<PageRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, url, text, discovered_at, fetched_at FROM pages WHERE url = ?1",
        )?;

        let page = stmt
            .query_row(params![url], |row| {
                Ok(PageRecord {
                    id: row.get(0)?,
                    url: row.get(1)?,
                    text: row.get(2)?,
                    discovered_at: row.get(3)?,
                    fetched_at: row.get(4)?,
                })
            })
            .optional()?;

        Ok(page)
    }

    fn get_outgoing_links(&self, from_url: &str) -> StorageResult<Vec<LinkRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT src.url, dst.url FROM links
             JOIN pages src ON src.id = links.from_page_id
             JOIN pages dst ON dst.id = links.to_page_id
             WHERE src.url = ?1
             ORDER BY dst.url",
        )?;

        let links = stmt
            .query_map(params![from_url], |row| {
                Ok(LinkRecord {
                    from_url: row.get(0)?,
                    to_url: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(links)
    }

    fn count_total_pages(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM pages", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_fetched_pages(&self) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM pages WHERE fetched_at IS NOT NULL",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_links(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM links", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
