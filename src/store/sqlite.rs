//! SQLite-backed [`KvStore`].
//!
//! One table, `kv_entries(key TEXT PRIMARY KEY, value TEXT)`. A connection
//! is opened per operation so the store can be shared freely between tasks
//! without holding a connection across awaits.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension};

use super::{KvStore, StoreError};

/// File name used when the store is created inside a storage directory.
pub const DEFAULT_DB_FILE: &str = "skillscript.db";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Durable key-value store in a SQLite database file.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    /// Path to the SQLite database file.
    pub db_path: PathBuf,
}

impl SqliteStore {
    /// Open (or create) the database at `db_path`.
    ///
    /// Parent directories are created as needed and the table is created
    /// if it does not exist yet.
    pub fn open(db_path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let db_path = db_path.into();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let store = Self { db_path };
        store.initialize_db()?;
        Ok(store)
    }

    /// Open `skillscript.db` inside `dir`.
    pub fn in_dir(dir: &Path) -> Result<Self, StoreError> {
        Self::open(dir.join(DEFAULT_DB_FILE))
    }

    fn initialize_db(&self) -> Result<(), StoreError> {
        let conn = self.connect()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv_entries (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    /// Writers from different owners share the file; wait out their locks.
    fn connect(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open(&self.db_path).map_err(|e| {
            log::error!(
                "STORE ERROR: could not open {}: {}",
                self.db_path.display(),
                e
            );
            StoreError::from(e)
        })?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(conn)
    }
}

impl KvStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let conn = self.connect()?;
        let value = conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO kv_entries (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let conn = self.connect()?;
        conn.execute("DELETE FROM kv_entries WHERE key = ?1", params![key])?;
        Ok(())
    }
}
