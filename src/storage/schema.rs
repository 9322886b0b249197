//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the vitae database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Frontier queue: every URL ever discovered, in discovery order
CREATE TABLE IF NOT EXISTS frontier (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL UNIQUE,
    processed INTEGER NOT NULL DEFAULT 0,
    discovered_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_frontier_processed ON frontier(processed, id);

-- Harvested person records, full payload as JSON
CREATE TABLE IF NOT EXISTS profiles (
    url TEXT PRIMARY KEY,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    headline TEXT,
    location TEXT,
    fetched_at TEXT NOT NULL,
    data TEXT NOT NULL
);

-- Harvested organization records, full payload as JSON
CREATE TABLE IF NOT EXISTS organizations (
    url TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    industry TEXT,
    headquarters TEXT,
    fetched_at TEXT NOT NULL,
    data TEXT NOT NULL
);
"#;

/// Initializes the schema on a fresh or existing connection
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
