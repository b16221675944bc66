//! Usage tracking and shortcut recommendation.
//!
//! Every raw input that was run is counted, keyed by its exact text. Once an
//! input has been run often enough it is proposed as a shortcut.
//!
//! Counts are kept as one JSON document under [`USAGE_KEY`] in a
//! [`KvStore`]: an array of `{input, count}` records in first-seen order.
//! Ties on the highest count go to the input that was logged first.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::store::{run_blocking, KvStore, StoreError};

/// Store key holding the usage counts.
pub const USAGE_KEY: &str = "usage_counts";

/// Minimum count before an input is proposed as a shortcut.
pub const DEFAULT_SHORTCUT_THRESHOLD: u64 = 3;

/// Count for one raw input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageCount {
    pub input: String,
    pub count: u64,
}

/// Counts executed inputs and proposes the most used one.
///
/// The `a*` methods run the store work on the blocking pool and are the
/// ones to call from async code; the plain methods block the caller.
pub struct UsageRecommender {
    store: Arc<dyn KvStore>,
    threshold: u64,
    /// Serializes read-modify-write cycles on the counts document.
    write_lock: Arc<Mutex<()>>,
}

impl UsageRecommender {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self::with_threshold(store, DEFAULT_SHORTCUT_THRESHOLD)
    }

    pub fn with_threshold(store: Arc<dyn KvStore>, threshold: u64) -> Self {
        Self {
            store,
            threshold,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    /// Count one execution of `raw`. Blank input is ignored.
    pub fn log_command(&self, raw: &str) -> Result<(), StoreError> {
        if raw.trim().is_empty() {
            return Ok(());
        }
        let _guard = self.write_lock.lock();
        increment(self.store.as_ref(), raw)
    }

    /// Async variant of [`log_command`](Self::log_command).
    pub async fn alog_command(&self, raw: &str) -> Result<(), StoreError> {
        if raw.trim().is_empty() {
            return Ok(());
        }
        let raw = raw.to_string();
        run_blocking(&self.store, &self.write_lock, move |store| {
            increment(store, &raw)
        })
        .await
    }

    /// Most used input, if it has been run at least `threshold` times.
    pub fn recommend_shortcut(&self) -> Result<Option<String>, StoreError> {
        Ok(best_over(load(self.store.as_ref())?, self.threshold))
    }

    /// Async variant of [`recommend_shortcut`](Self::recommend_shortcut).
    pub async fn arecommend_shortcut(&self) -> Result<Option<String>, StoreError> {
        let threshold = self.threshold;
        run_blocking(&self.store, &self.write_lock, move |store| {
            Ok(best_over(load(store)?, threshold))
        })
        .await
    }

    /// All recorded counts in first-seen order.
    pub fn counts(&self) -> Result<Vec<UsageCount>, StoreError> {
        load(self.store.as_ref())
    }

    /// Forget every recorded count.
    pub fn reset(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock();
        self.store.remove(USAGE_KEY)
    }
}

fn load(store: &dyn KvStore) -> Result<Vec<UsageCount>, StoreError> {
    match store.get(USAGE_KEY)? {
        Some(json) => Ok(serde_json::from_str(&json)?),
        None => Ok(Vec::new()),
    }
}

/// Caller holds the write lock.
fn increment(store: &dyn KvStore, raw: &str) -> Result<(), StoreError> {
    let mut counts = load(store)?;
    match counts.iter_mut().find(|c| c.input == raw) {
        Some(entry) => entry.count += 1,
        None => counts.push(UsageCount {
            input: raw.to_string(),
            count: 1,
        }),
    }
    store.set(USAGE_KEY, &serde_json::to_string(&counts)?)?;

    log::debug!("Usage: logged input ({} distinct)", counts.len());
    Ok(())
}

fn best_over(counts: Vec<UsageCount>, threshold: u64) -> Option<String> {
    let mut best: Option<UsageCount> = None;
    for entry in counts {
        // Strictly greater keeps the earliest among equals.
        if best.as_ref().map_or(true, |b| entry.count > b.count) {
            best = Some(entry);
        }
    }
    best.filter(|b| b.count >= threshold).map(|b| b.input)
}

impl std::fmt::Debug for UsageRecommender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsageRecommender")
            .field("threshold", &self.threshold)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, SqliteStore};

    fn recommender() -> UsageRecommender {
        UsageRecommender::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_empty_store_has_no_recommendation() {
        assert_eq!(recommender().recommend_shortcut().unwrap(), None);
    }

    #[test]
    fn test_three_runs_recommend_two_do_not() {
        let usage = recommender();
        usage.log_command("play lofi beats").unwrap();
        usage.log_command("play lofi beats").unwrap();
        assert_eq!(usage.recommend_shortcut().unwrap(), None);

        usage.log_command("play lofi beats").unwrap();
        assert_eq!(
            usage.recommend_shortcut().unwrap().as_deref(),
            Some("play lofi beats")
        );
    }

    #[test]
    fn test_blank_input_is_not_counted() {
        let usage = recommender();
        usage.log_command("").unwrap();
        usage.log_command("   ").unwrap();
        assert!(usage.counts().unwrap().is_empty());
    }

    #[test]
    fn test_keyed_by_literal_text() {
        let usage = recommender();
        usage.log_command("play jazz").unwrap();
        usage.log_command("Play jazz").unwrap();
        usage.log_command("play jazz ").unwrap();

        let counts = usage.counts().unwrap();
        assert_eq!(counts.len(), 3);
        assert!(counts.iter().all(|c| c.count == 1));
    }

    #[test]
    fn test_tie_goes_to_first_seen() {
        let usage = UsageRecommender::with_threshold(Arc::new(MemoryStore::new()), 2);
        for raw in ["b", "a", "a", "b"] {
            usage.log_command(raw).unwrap();
        }
        assert_eq!(usage.recommend_shortcut().unwrap().as_deref(), Some("b"));

        usage.log_command("a").unwrap();
        assert_eq!(usage.recommend_shortcut().unwrap().as_deref(), Some("a"));
    }

    #[test]
    fn test_reset_clears_counts() {
        let usage = recommender();
        for _ in 0..3 {
            usage.log_command("x").unwrap();
        }
        usage.reset().unwrap();
        assert_eq!(usage.recommend_shortcut().unwrap(), None);
    }

    #[test]
    fn test_counts_survive_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usage.db");

        {
            let usage = UsageRecommender::new(Arc::new(SqliteStore::open(&path).unwrap()));
            usage.log_command("note: water plants").unwrap();
            usage.log_command("note: water plants").unwrap();
        }

        let usage = UsageRecommender::new(Arc::new(SqliteStore::open(&path).unwrap()));
        usage.log_command("note: water plants").unwrap();
        assert_eq!(
            usage.recommend_shortcut().unwrap().as_deref(),
            Some("note: water plants")
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_logging_loses_no_increment() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(dir.path().join("usage.db")).unwrap();
        let usage = Arc::new(UsageRecommender::new(Arc::new(store)));

        let tasks = 8;
        let per_task = 5;
        let mut handles = Vec::new();
        for _ in 0..tasks {
            let usage = Arc::clone(&usage);
            handles.push(tokio::spawn(async move {
                for _ in 0..per_task {
                    usage.alog_command("play lofi beats").await.unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let counts = usage.counts().unwrap();
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[0].count, (tasks * per_task) as u64);
        assert_eq!(
            usage.arecommend_shortcut().await.unwrap().as_deref(),
            Some("play lofi beats")
        );
    }

    #[test]
    fn test_threaded_sync_logging_loses_no_increment() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(dir.path().join("usage.db")).unwrap();
        let usage = Arc::new(UsageRecommender::new(Arc::new(store)));

        let threads: Vec<_> = (0..4)
            .map(|_| {
                let usage = Arc::clone(&usage);
                std::thread::spawn(move || {
                    for _ in 0..10 {
                        usage.log_command("note: x").unwrap();
                    }
                })
            })
            .collect();
        for thread in threads {
            thread.join().unwrap();
        }

        assert_eq!(usage.counts().unwrap()[0].count, 40);
    }
}
