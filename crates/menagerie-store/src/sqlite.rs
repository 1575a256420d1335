// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! SQLite key-value backend
//!
//! Embedded bucketed byte store in a single database file.

use crate::store::KvStore;
use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// SQLite key-value store
///
/// Thread-safe via internal Mutex (SQLite Connection is not Sync).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE buckets (
///     name TEXT PRIMARY KEY
/// );
/// CREATE TABLE entries (
///     bucket TEXT NOT NULL,
///     key TEXT NOT NULL,
///     value BLOB NOT NULL,
///     PRIMARY KEY (bucket, key)
/// );
/// ```
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a file-backed store
    ///
    /// `timeout` bounds how long any statement waits on a database locked by
    /// another connection before failing with `SQLITE_BUSY`.
    pub fn open(path: impl AsRef<Path>, timeout: Duration) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open SQLite database at {}", path.display()))?;
        conn.busy_timeout(timeout)
            .context("Failed to set SQLite busy timeout")?;

        tracing::debug!("Opened kennel database {} (timeout {:?})", path.display(), timeout);

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory SQLite store (for testing)
    pub fn new_in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().context("Failed to create in-memory SQLite database")?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("SQLite connection mutex poisoned"))
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS buckets (
                name TEXT PRIMARY KEY
            );
            CREATE TABLE IF NOT EXISTS entries (
                bucket TEXT NOT NULL,
                key TEXT NOT NULL,
                value BLOB NOT NULL,
                PRIMARY KEY (bucket, key)
            );",
        )
        .context("Failed to initialize kennel schema")?;

        Ok(())
    }
}

impl KvStore for SqliteStore {
    fn create_bucket(&self, bucket: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR IGNORE INTO buckets (name) VALUES (?1)",
            params![bucket],
        )
        .with_context(|| format!("create bucket {}", bucket))?;
        Ok(())
    }

    fn get(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>> {
        let conn = self.conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM entries WHERE bucket = ?1 AND key = ?2",
                params![bucket, key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn put(&self, bucket: &str, key: &str, value: &[u8]) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT OR IGNORE INTO buckets (name) VALUES (?1)",
            params![bucket],
        )?;
        tx.execute(
            "INSERT OR REPLACE INTO entries (bucket, key, value) VALUES (?1, ?2, ?3)",
            params![bucket, key, value],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn delete(&self, bucket: &str, key: &str) -> Result<bool> {
        let conn = self.conn()?;
        let removed = conn.execute(
            "DELETE FROM entries WHERE bucket = ?1 AND key = ?2",
            params![bucket, key],
        )?;
        Ok(removed > 0)
    }

    fn keys(&self, bucket: &str) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT key FROM entries WHERE bucket = ?1 ORDER BY key ASC")?;
        let keys = stmt
            .query_map([bucket], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(keys)
    }

    fn buckets(&self) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT name FROM buckets ORDER BY name ASC")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(names)
    }
}
