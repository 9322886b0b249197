//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Store trait.
//! Record rows carry a handful of queryable columns; the full record is
//! kept as a JSON blob in the `data` column.

use crate::record::{OrganizationRecord, ProfileRecord};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{StorageError, StorageResult, Store};
use crate::storage::{CrawlStats, FrontierEntry};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens or creates the database at the given path
    pub fn new(path: &Path) -> StorageResult<Self> {
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

    /// Creates an in-memory database (for testing)
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl Store for SqliteStore {
    fn enqueue(&mut self, url: &str) -> StorageResult<bool> {
        let now = Utc::now().to_rfc3339();
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO frontier (url, discovered_at) VALUES (?1, ?2)",
            params![url, now],
        )?;
        Ok(inserted > 0)
    }

    fn next_unprocessed(&self) -> StorageResult<Option<FrontierEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, url, processed, discovered_at FROM frontier
             WHERE processed = 0 ORDER BY id LIMIT 1",
        )?;

        let entry = stmt
            .query_row([], |row| {
                Ok(FrontierEntry {
                    id: row.get(0)?,
                    url: row.get(1)?,
                    processed: row.get::<_, i64>(2)? != 0,
                    discovered_at: row.get(3)?,
                })
            })
            .optional()?;

        Ok(entry)
    }

    fn mark_processed(&mut self, url: &str) -> StorageResult<()> {
        self.conn.execute(
            "UPDATE frontier SET processed = 1 WHERE url = ?1",
            params![url],
        )?;
        Ok(())
    }

    fn upsert_profile(&mut self, record: &ProfileRecord) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let data = serde_json::to_string(record)?;
        self.conn.execute(
            "INSERT INTO profiles (url, first_name, last_name, headline, location, fetched_at, data)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(url) DO UPDATE SET
                first_name = excluded.first_name,
                last_name = excluded.last_name,
                headline = excluded.headline,
                location = excluded.location,
                fetched_at = excluded.fetched_at,
                data = excluded.data",
            params![
                record.canonical_url,
                record.first_name,
                record.last_name,
                record.headline,
                record.location,
                now,
                data
            ],
        )?;
        Ok(())
    }

    fn upsert_organization(&mut self, record: &OrganizationRecord) -> StorageResult<()> {
        let url = record
            .canonical_url
            .as_deref()
            .ok_or(StorageError::MissingCanonicalUrl)?;
        let now = Utc::now().to_rfc3339();
        let data = serde_json::to_string(record)?;
        self.conn.execute(
            "INSERT INTO organizations (url, name, industry, headquarters, fetched_at, data)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(url) DO UPDATE SET
                name = excluded.name,
                industry = excluded.industry,
                headquarters = excluded.headquarters,
                fetched_at = excluded.fetched_at,
                data = excluded.data",
            params![
                url,
                record.name,
                record.industry,
                record.headquarters,
                now,
                data
            ],
        )?;
        Ok(())
    }

    fn get_profile(&self, url: &str) -> StorageResult<Option<ProfileRecord>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT data FROM profiles WHERE url = ?1",
                params![url],
                |row| row.get(0),
            )
            .optional()?;

        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn get_organization(&self, url: &str) -> StorageResult<Option<OrganizationRecord>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT data FROM organizations WHERE url = ?1",
                params![url],
                |row| row.get(0),
            )
            .optional()?;

        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn stats(&self) -> StorageResult<CrawlStats> {
        let one = |sql: &str| -> StorageResult<u64> {
            let n: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
            Ok(n as u64)
        };
        Ok(CrawlStats {
            queued: one("SELECT COUNT(*) FROM frontier WHERE processed = 0")?,
            processed: one("SELECT COUNT(*) FROM frontier WHERE processed = 1")?,
            profiles: one("SELECT COUNT(*) FROM profiles")?,
            organizations: one("SELECT COUNT(*) FROM organizations")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(url: &str) -> ProfileRecord {
        ProfileRecord {
            canonical_url: url.to_string(),
            first_name: "Joana".to_string(),
            last_name: "Vieira".to_string(),
            headline: Some("Engineer".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_in_memory() {
        assert!(SqliteStore::new_in_memory().is_ok());
    }

    #[test]
    fn test_enqueue_is_idempotent() {
        let mut store = SqliteStore::new_in_memory().unwrap();
        assert!(store.enqueue("https://example.com/in/joana").unwrap());
        assert!(!store.enqueue("https://example.com/in/joana").unwrap());
        assert_eq!(store.stats().unwrap().queued, 1);
    }

    #[test]
    fn test_next_unprocessed_is_fifo() {
        let mut store = SqliteStore::new_in_memory().unwrap();
        store.enqueue("https://example.com/in/first").unwrap();
        store.enqueue("https://example.com/in/second").unwrap();

        let entry = store.next_unprocessed().unwrap().unwrap();
        assert_eq!(entry.url, "https://example.com/in/first");
        assert!(!entry.processed);

        store.mark_processed(&entry.url).unwrap();
        let entry = store.next_unprocessed().unwrap().unwrap();
        assert_eq!(entry.url, "https://example.com/in/second");
    }

    #[test]
    fn test_mark_processed_is_idempotent() {
        let mut store = SqliteStore::new_in_memory().unwrap();
        store.enqueue("https://example.com/in/joana").unwrap();
        store.mark_processed("https://example.com/in/joana").unwrap();
        store.mark_processed("https://example.com/in/joana").unwrap();
        assert!(store.next_unprocessed().unwrap().is_none());

        let stats = store.stats().unwrap();
        assert_eq!(stats.processed, 1);
        assert_eq!(stats.queued, 0);
    }

    #[test]
    fn test_processed_url_stays_deduplicated() {
        let mut store = SqliteStore::new_in_memory().unwrap();
        store.enqueue("https://example.com/in/joana").unwrap();
        store.mark_processed("https://example.com/in/joana").unwrap();

        // Re-discovering a processed URL must not requeue it
        assert!(!store.enqueue("https://example.com/in/joana").unwrap());
        assert!(store.next_unprocessed().unwrap().is_none());
    }

    #[test]
    fn test_profile_round_trip() {
        let mut store = SqliteStore::new_in_memory().unwrap();
        store
            .upsert_profile(&profile("https://example.com/in/joana"))
            .unwrap();

        let got = store
            .get_profile("https://example.com/in/joana")
            .unwrap()
            .unwrap();
        assert_eq!(got.first_name, "Joana");
        assert_eq!(got.headline.as_deref(), Some("Engineer"));
        assert!(store.get_profile("https://example.com/in/other").unwrap().is_none());
    }

    #[test]
    fn test_profile_upsert_replaces() {
        let mut store = SqliteStore::new_in_memory().unwrap();
        store
            .upsert_profile(&profile("https://example.com/in/joana"))
            .unwrap();

        let mut updated = profile("https://example.com/in/joana");
        updated.headline = Some("Staff Engineer".to_string());
        store.upsert_profile(&updated).unwrap();

        let got = store
            .get_profile("https://example.com/in/joana")
            .unwrap()
            .unwrap();
        assert_eq!(got.headline.as_deref(), Some("Staff Engineer"));
        assert_eq!(store.stats().unwrap().profiles, 1);
    }

    #[test]
    fn test_organization_requires_canonical_url() {
        let mut store = SqliteStore::new_in_memory().unwrap();
        let record = OrganizationRecord {
            name: "Acme".to_string(),
            ..Default::default()
        };
        let err = store.upsert_organization(&record).unwrap_err();
        assert!(matches!(err, StorageError::MissingCanonicalUrl));
    }

    #[test]
    fn test_organization_round_trip() {
        let mut store = SqliteStore::new_in_memory().unwrap();
        let record = OrganizationRecord {
            canonical_url: Some("https://example.com/company/acme".to_string()),
            name: "Acme".to_string(),
            industry: Some("Manufacturing".to_string()),
            ..Default::default()
        };
        store.upsert_organization(&record).unwrap();

        let got = store
            .get_organization("https://example.com/company/acme")
            .unwrap()
            .unwrap();
        assert_eq!(got.name, "Acme");
        assert_eq!(got.industry.as_deref(), Some("Manufacturing"));
    }
}
