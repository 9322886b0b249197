//! Storage module for the frontier queue and harvested records
//!
//! This module handles all database operations for the engine, including:
//! - SQLite database initialization and schema management
//! - Frontier queue persistence and deduplication
//! - Profile and organization record storage
//! - Crawl progress statistics

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{Store, StorageError, StorageResult};

use std::path::Path;

/// Initializes or opens a storage database
pub fn open_store(path: &Path) -> StorageResult<SqliteStore> {
    SqliteStore::new(path)
}

/// A URL waiting in (or already drained from) the frontier queue
#[derive(Debug, Clone)]
pub struct FrontierEntry {
    pub id: i64,
    pub url: String,
    pub processed: bool,
    pub discovered_at: String,
}

/// Aggregate counts across the frontier and record tables
#[derive(Debug, Clone, Copy, Default)]
pub struct CrawlStats {
    pub queued: u64,
    pub processed: u64,
    pub profiles: u64,
    pub organizations: u64,
}
