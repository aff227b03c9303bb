//! Verdict cache
//!
//! Keyed store of serialized verdicts with a write timestamp. Reads apply the
//! freshness window; stale rows stay in place until the next write for the
//! same policy supersedes them. There is no expiry sweep.

pub mod memory;
#[cfg(feature = "database")]
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::FRESHNESS_WINDOW;
use crate::error::StoreError;
use crate::verdict::Verdict;

pub use memory::InMemoryVerdictStore;

/// One stored row: `(policy_id, serialized verdict, written_at)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub policy_id: String,
    pub payload: String,
    pub written_at: DateTime<Utc>,
}

/// Storage backend for cache entries
///
/// `upsert` must be a single atomic replace per key; the last completed
/// write for a policy wins.
#[async_trait]
pub trait VerdictStore: Send + Sync {
    async fn get(&self, policy_id: &str) -> Result<Option<CacheEntry>, StoreError>;

    async fn upsert(&self, entry: CacheEntry) -> Result<(), StoreError>;
}

/// Freshness-aware view over a `VerdictStore`
#[derive(Clone)]
pub struct VerdictCache {
    store: Arc<dyn VerdictStore>,
    freshness: Duration,
}

impl VerdictCache {
    pub fn new(store: Arc<dyn VerdictStore>) -> Self {
        Self {
            store,
            freshness: Duration::seconds(FRESHNESS_WINDOW.as_secs() as i64),
        }
    }

    /// Read a fresh verdict, marked `cached = true`
    pub async fn read(&self, policy_id: &str) -> Result<Option<Verdict>, StoreError> {
        self.read_at(policy_id, Utc::now()).await
    }

    /// Read as of `now`; an entry is fresh while `now - written_at < 24h`
    pub async fn read_at(
        &self,
        policy_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Verdict>, StoreError> {
        let Some(entry) = self.store.get(policy_id).await? else {
            return Ok(None);
        };

        let age = now.signed_duration_since(entry.written_at);
        if age >= self.freshness {
            debug!(policy_id, age_secs = age.num_seconds(), "cache entry is stale");
            return Ok(None);
        }

        let mut verdict: Verdict =
            serde_json::from_str(&entry.payload).map_err(|e| StoreError::Corrupt {
                policy_id: policy_id.to_string(),
                reason: e.to_string(),
            })?;
        verdict.cached = true;
        Ok(Some(verdict))
    }

    /// Replace any existing entry for the policy
    pub async fn write(&self, policy_id: &str, verdict: &Verdict) -> Result<(), StoreError> {
        self.write_at(policy_id, verdict, Utc::now()).await
    }

    pub async fn write_at(
        &self,
        policy_id: &str,
        verdict: &Verdict,
        written_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut stored = verdict.clone();
        stored.cached = false;
        let payload = serde_json::to_string(&stored)
            .map_err(|e| StoreError::Backend(format!("failed to serialize verdict: {}", e)))?;

        self.store
            .upsert(CacheEntry {
                policy_id: policy_id.to_string(),
                payload,
                written_at,
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verdict::RiskLevel;
    use serde_json::json;

    const POLICY: &str = "a1b2c3";

    fn sample_verdict() -> Verdict {
        Verdict::new(
            POLICY,
            "Native Asset",
            RiskLevel::Low,
            10,
            json!({"note": "test"}),
            "Standard native asset",
        )
    }

    #[tokio::test]
    async fn test_miss_on_empty_store() {
        let cache = VerdictCache::new(Arc::new(InMemoryVerdictStore::new()));
        assert!(cache.read(POLICY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_roundtrip_marks_cached() {
        let cache = VerdictCache::new(Arc::new(InMemoryVerdictStore::new()));
        let verdict = sample_verdict();
        cache.write(POLICY, &verdict).await.unwrap();

        let hit = cache.read(POLICY).await.unwrap().unwrap();
        assert!(hit.cached);
        assert_eq!(hit.asset_type, verdict.asset_type);
        assert_eq!(hit.timestamp, verdict.timestamp);
        assert_eq!(hit.details, verdict.details);
    }

    #[tokio::test]
    async fn test_freshness_boundary() {
        let cache = VerdictCache::new(Arc::new(InMemoryVerdictStore::new()));
        let written = Utc::now() - Duration::days(3);
        cache
            .write_at(POLICY, &sample_verdict(), written)
            .await
            .unwrap();

        let almost = written + Duration::hours(23) + Duration::minutes(59);
        assert!(cache.read_at(POLICY, almost).await.unwrap().is_some());

        let exactly = written + Duration::hours(24);
        assert!(cache.read_at(POLICY, exactly).await.unwrap().is_none());

        let past = written + Duration::hours(24) + Duration::seconds(1);
        assert!(cache.read_at(POLICY, past).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stale_entry_superseded_by_write() {
        let store = Arc::new(InMemoryVerdictStore::new());
        let cache = VerdictCache::new(store.clone());
        cache
            .write_at(POLICY, &sample_verdict(), Utc::now() - Duration::hours(30))
            .await
            .unwrap();
        assert!(cache.read(POLICY).await.unwrap().is_none());
        assert_eq!(store.len().await, 1);

        let mut newer = sample_verdict();
        newer.asset_type = "Multi-Sig Script".to_string();
        cache.write(POLICY, &newer).await.unwrap();

        assert_eq!(store.len().await, 1);
        let hit = cache.read(POLICY).await.unwrap().unwrap();
        assert_eq!(hit.asset_type, "Multi-Sig Script");
    }

    #[tokio::test]
    async fn test_corrupt_payload_is_error() {
        let store = Arc::new(InMemoryVerdictStore::new());
        store
            .upsert(CacheEntry {
                policy_id: POLICY.to_string(),
                payload: "{not json".to_string(),
                written_at: Utc::now(),
            })
            .await
            .unwrap();

        let cache = VerdictCache::new(store);
        let err = cache.read(POLICY).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }
}
