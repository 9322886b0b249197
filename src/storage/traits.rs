//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::record::{OrganizationRecord, ProfileRecord};
use crate::storage::{CrawlStats, FrontierEntry};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Record has no canonical URL to key on")]
    MissingCanonicalUrl,

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serialization(e.to_string())
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// This trait defines all database operations needed by the crawl loop.
pub trait Store {
    // ===== Frontier Queue =====

    /// Adds a URL to the frontier
    ///
    /// Returns `true` when the URL was new, `false` when it was already
    /// queued or processed (the insert is silently ignored).
    fn enqueue(&mut self, url: &str) -> StorageResult<bool>;

    /// Returns the oldest unprocessed entry, if any
    fn next_unprocessed(&self) -> StorageResult<Option<FrontierEntry>>;

    /// Marks a frontier entry as processed
    ///
    /// Idempotent: marking an already-processed entry is a no-op.
    fn mark_processed(&mut self, url: &str) -> StorageResult<()>;

    // ===== Records =====

    /// Inserts or replaces a profile record keyed by canonical URL
    fn upsert_profile(&mut self, record: &ProfileRecord) -> StorageResult<()>;

    /// Inserts or replaces an organization record keyed by canonical URL
    fn upsert_organization(&mut self, record: &OrganizationRecord) -> StorageResult<()>;

    /// Fetches a stored profile by canonical URL
    fn get_profile(&self, url: &str) -> StorageResult<Option<ProfileRecord>>;

    /// Fetches a stored organization by canonical URL
    fn get_organization(&self, url: &str) -> StorageResult<Option<OrganizationRecord>>;

    // ===== Statistics =====

    /// Returns aggregate counts for progress reporting
    fn stats(&self) -> StorageResult<CrawlStats>;
}
