//! Durable key-value storage.
//!
//! The usage recommender and the note skill keep their state behind the
//! [`KvStore`] trait: string keys, string values, and the three operations
//! `get`, `set`, `remove`. Two backends ship with the crate:
//!
//! - [`MemoryStore`]: process-local, lost on restart. Used in tests and
//!   when no storage directory is available.
//! - [`SqliteStore`]: a single-table SQLite database that survives restarts.

pub mod memory;
pub mod sqlite;

use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Errors raised by a key-value backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The SQLite backend failed.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A stored value could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Filesystem error while preparing the store location.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The blocking task running the operation panicked or was cancelled.
    #[error("store task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// A string-keyed, string-valued store.
///
/// Implementations must be safe to share across tasks; each call is
/// independent and the store imposes no multi-call transactions.
pub trait KvStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Insert or overwrite the value stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Run `op` against `store` on the blocking thread pool while holding `lock`.
///
/// Backends such as [`SqliteStore`] do synchronous disk I/O, so async
/// callers go through here instead of touching the store on a runtime
/// worker. The lock serializes read-modify-write cycles of one owner.
pub async fn run_blocking<T, F>(
    store: &Arc<dyn KvStore>,
    lock: &Arc<Mutex<()>>,
    op: F,
) -> Result<T, StoreError>
where
    F: FnOnce(&dyn KvStore) -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    let store = Arc::clone(store);
    let lock = Arc::clone(lock);
    tokio::task::spawn_blocking(move || {
        let _guard = lock.lock();
        op(store.as_ref())
    })
    .await?
}
