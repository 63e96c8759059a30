pub mod compare;
pub mod log;

use crate::domain::business::RankedBusiness;
use crate::domain::history::{normalize_term, RankingComparison, RankingSnapshot};
use crate::error::{RankError, Result};
use crate::storage::BlobStore;
use crate::time::{next_timestamp, Clock, SystemClock};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

pub const DEFAULT_RECENT_LIMIT: usize = 10;

#[derive(Debug, thiserror::Error)]
enum LoadError {
    #[error("failed to read ranking history: {0:#}")]
    Backend(anyhow::Error),

    #[error(transparent)]
    Decode(#[from] log::DecodeError),
}

/// Ranking snapshot log persisted as a single blob.
#[derive(Clone)]
pub struct RankingHistory {
    store: Arc<dyn BlobStore>,
    clock: Arc<dyn Clock>,
    // Serializes load-append-persist so concurrent saves never drop each other.
    write_lock: Arc<tokio::sync::Mutex<()>>,
}

impl RankingHistory {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn BlobStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            write_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    pub async fn save(
        &self,
        keyword: &str,
        location: &str,
        businesses: &[RankedBusiness],
    ) -> Result<RankingSnapshot> {
        if businesses.is_empty() {
            return Err(RankError::validation(
                "cannot record a ranking snapshot without businesses",
            ));
        }

        let _guard = self.write_lock.lock().await;
        // Only a malformed payload may be replaced.
        let mut log = match self.try_load().await {
            Ok(log) => log,
            Err(LoadError::Decode(log::DecodeError::Malformed(err))) => {
                tracing::warn!(error = %err, "ranking history is malformed; starting a fresh log");
                Vec::new()
            }
            Err(err) => {
                return Err(RankError::Persistence {
                    message: err.to_string(),
                });
            }
        };

        let last = log.iter().map(|s| s.timestamp).max();
        let snapshot = RankingSnapshot {
            id: Uuid::new_v4().to_string(),
            keyword: normalize_term(keyword),
            location: normalize_term(location),
            timestamp: next_timestamp(self.clock.now_millis(), last),
            businesses: businesses.to_vec(),
        };

        log.push(snapshot.clone());
        log::evict_oldest(&mut log);

        let payload = log::encode(&log).map_err(|e| RankError::Persistence {
            message: format!("failed to encode ranking history: {e:#}"),
        })?;
        self.store
            .put(log::HISTORY_BLOB_KEY, &payload)
            .await
            .map_err(|e| RankError::Persistence {
                message: format!("failed to persist ranking history: {e:#}"),
            })?;

        tracing::info!(
            snapshot_id = %snapshot.id,
            keyword = %snapshot.keyword,
            location = %snapshot.location,
            businesses = snapshot.businesses.len(),
            log_len = log.len(),
            "recorded ranking snapshot"
        );
        Ok(snapshot)
    }

    /// The full log, oldest first. Missing or unreadable history is an empty log.
    pub async fn load_all(&self) -> Vec<RankingSnapshot> {
        match self.try_load().await {
            Ok(log) => log,
            Err(err) => {
                tracing::warn!(
                    backend = self.store.backend_name(),
                    error = %err,
                    "ranking history unreadable; treating as empty"
                );
                Vec::new()
            }
        }
    }

    async fn try_load(&self) -> Result<Vec<RankingSnapshot>, LoadError> {
        match self
            .store
            .get(log::HISTORY_BLOB_KEY)
            .await
            .map_err(LoadError::Backend)?
        {
            Some(payload) => Ok(log::decode(&payload)?),
            None => Ok(Vec::new()),
        }
    }

    pub async fn comparisons(&self, keyword: &str, location: &str) -> Vec<RankingComparison> {
        let log = self.load_all().await;
        compare::compare(&log, keyword, location)
    }

    /// Latest snapshot per `(keyword, location)`, newest first.
    pub async fn recent_searches(&self, limit: usize) -> Vec<RankingSnapshot> {
        let log = self.load_all().await;
        recent_searches(log, limit)
    }
}

fn recent_searches(log: Vec<RankingSnapshot>, limit: usize) -> Vec<RankingSnapshot> {
    let mut latest: HashMap<(String, String), RankingSnapshot> = HashMap::new();
    for snapshot in log {
        let key = (snapshot.keyword.clone(), snapshot.location.clone());
        match latest.get(&key) {
            Some(existing) if existing.timestamp >= snapshot.timestamp => {}
            _ => {
                latest.insert(key, snapshot);
            }
        }
    }

    let mut out: Vec<RankingSnapshot> = latest.into_values().collect();
    out.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    out.truncate(limit);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::history::Trend;
    use crate::storage::memory::MemoryBlobStore;
    use crate::time::testing::ManualClock;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn biz(id: &str, rank: u32) -> RankedBusiness {
        RankedBusiness {
            id: id.to_string(),
            name: format!("Business {id}"),
            rank,
            rating: 4.2,
            total_ratings: 7,
        }
    }

    fn history_at(millis: i64) -> (RankingHistory, Arc<ManualClock>, Arc<MemoryBlobStore>) {
        let store = Arc::new(MemoryBlobStore::new());
        let clock = Arc::new(ManualClock::at(millis));
        let history = RankingHistory::with_clock(store.clone(), clock.clone());
        (history, clock, store)
    }

    #[tokio::test]
    async fn save_then_load_round_trips_normalized_snapshot() {
        let (history, _, _) = history_at(1_000);

        let saved = history
            .save("  Pizza ", " Austin, TX", &[biz("a", 1), biz("b", 2)])
            .await
            .unwrap();
        assert_eq!(saved.keyword, "pizza");
        assert_eq!(saved.location, "austin, tx");
        assert_eq!(saved.timestamp, 1_000);

        let log = history.load_all().await;
        assert_eq!(log.last(), Some(&saved));
    }

    #[tokio::test]
    async fn empty_results_are_never_persisted() {
        let (history, _, store) = history_at(1_000);
        let err = history.save("pizza", "austin", &[]).await.unwrap_err();
        assert_eq!(err.kind(), "validation");
        assert_eq!(store.get(log::HISTORY_BLOB_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn log_is_capped_with_fifo_eviction() {
        let (history, clock, _) = history_at(0);
        let mut ids = Vec::new();
        for i in 0..101 {
            clock.set(i * 10);
            let s = history
                .save(&format!("kw{i}"), "austin", &[biz("a", 1)])
                .await
                .unwrap();
            ids.push(s.id);
        }

        let log = history.load_all().await;
        assert_eq!(log.len(), log::MAX_SNAPSHOTS);
        assert!(log.iter().all(|s| s.id != ids[0]));
        let kept: Vec<_> = log.iter().map(|s| s.id.clone()).collect();
        assert_eq!(kept, ids[1..].to_vec());
    }

    /// Memory store whose next `get` fails once when armed.
    struct FlakyStore {
        inner: MemoryBlobStore,
        fail_next_get: AtomicBool,
    }

    #[async_trait]
    impl BlobStore for FlakyStore {
        fn backend_name(&self) -> &'static str {
            "flaky"
        }

        async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
            if self.fail_next_get.swap(false, Ordering::SeqCst) {
                anyhow::bail!("connection reset");
            }
            self.inner.get(key).await
        }

        async fn put(&self, key: &str, value: &str) -> anyhow::Result<()> {
            self.inner.put(key, value).await
        }
    }

    #[tokio::test]
    async fn malformed_payload_reads_as_empty_and_is_replaced_on_save() {
        let store = Arc::new(MemoryBlobStore::with_blob(log::HISTORY_BLOB_KEY, "{oops"));
        let history = RankingHistory::new(store.clone());
        assert!(history.load_all().await.is_empty());

        history.save("pizza", "austin", &[biz("a", 1)]).await.unwrap();
        assert_eq!(history.load_all().await.len(), 1);
    }

    #[tokio::test]
    async fn newer_version_reads_as_empty_but_is_never_overwritten() {
        let newer = r#"{"version": 2, "snapshots": [], "extra": true}"#;
        let store = Arc::new(MemoryBlobStore::with_blob(log::HISTORY_BLOB_KEY, newer));
        let history = RankingHistory::new(store.clone());
        assert!(history.load_all().await.is_empty());

        let err = history
            .save("pizza", "austin", &[biz("a", 1)])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "persistence");
        assert!(err.to_string().contains("unsupported history log version 2"));

        let stored = store.get(log::HISTORY_BLOB_KEY).await.unwrap().unwrap();
        assert_eq!(stored, newer);
    }

    #[tokio::test]
    async fn read_failure_fails_the_save_and_keeps_the_log() {
        let store = Arc::new(FlakyStore {
            inner: MemoryBlobStore::new(),
            fail_next_get: AtomicBool::new(false),
        });
        let clock = Arc::new(ManualClock::at(1));
        let history = RankingHistory::with_clock(store.clone(), clock);
        for i in 0..5 {
            history
                .save(&format!("kw{i}"), "austin", &[biz("a", 1)])
                .await
                .unwrap();
        }

        store.fail_next_get.store(true, Ordering::SeqCst);
        let err = history
            .save("pizza", "austin", &[biz("a", 1)])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "persistence");
        assert!(err.to_string().contains("connection reset"));

        assert_eq!(history.load_all().await.len(), 5);
    }

    #[tokio::test]
    async fn read_failure_loads_as_empty() {
        let store = Arc::new(FlakyStore {
            inner: MemoryBlobStore::with_blob(log::HISTORY_BLOB_KEY, "[]"),
            fail_next_get: AtomicBool::new(true),
        });
        let history = RankingHistory::new(store);
        assert!(history.load_all().await.is_empty());
    }

    #[tokio::test]
    async fn timestamps_stay_strictly_increasing_when_clock_stalls() {
        let (history, _, _) = history_at(5_000);
        let first = history.save("pizza", "austin", &[biz("a", 3)]).await.unwrap();
        let second = history.save("pizza", "austin", &[biz("a", 1)]).await.unwrap();
        assert!(second.timestamp > first.timestamp);
        assert_ne!(first.id, second.id);

        let out = history.comparisons("Pizza", "AUSTIN").await;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].rank_change, 2);
        assert_eq!(out[0].trend, Trend::Up);
    }

    #[tokio::test]
    async fn comparisons_are_empty_for_a_single_observation() {
        let (history, _, _) = history_at(1);
        history.save("pizza", "austin", &[biz("a", 1)]).await.unwrap();
        assert!(history.comparisons("pizza", "austin").await.is_empty());
    }

    #[tokio::test]
    async fn recent_searches_dedupes_pairs_newest_first() {
        let (history, clock, _) = history_at(100);
        history.save("pizza", "austin", &[biz("a", 1)]).await.unwrap();
        clock.set(200);
        history.save("tacos", "austin", &[biz("a", 1)]).await.unwrap();
        clock.set(300);
        let latest_pizza = history.save("PIZZA", "austin", &[biz("b", 1)]).await.unwrap();
        clock.set(400);
        history.save("pizza", "dallas", &[biz("c", 1)]).await.unwrap();

        let recent = history.recent_searches(DEFAULT_RECENT_LIMIT).await;
        let pairs: Vec<_> = recent
            .iter()
            .map(|s| (s.keyword.as_str(), s.location.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![("pizza", "dallas"), ("pizza", "austin"), ("tacos", "austin")]
        );
        assert_eq!(recent[1].id, latest_pizza.id);

        assert_eq!(history.recent_searches(2).await.len(), 2);
        assert!(history.recent_searches(0).await.is_empty());
    }

    #[tokio::test]
    async fn concurrent_saves_are_not_lost() {
        let (history, _, _) = history_at(1);
        let mut handles = Vec::new();
        for i in 0..8 {
            let h = history.clone();
            handles.push(tokio::spawn(async move {
                h.save(&format!("kw{i}"), "austin", &[biz("a", 1)]).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(history.load_all().await.len(), 8);
    }
}
