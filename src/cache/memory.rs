//! In-memory verdict store
//!
//! Process-local backend used when no database is configured, and by tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CacheEntry, VerdictStore};
use crate::error::StoreError;

#[derive(Clone, Default)]
pub struct InMemoryVerdictStore {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl InMemoryVerdictStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn contains(&self, policy_id: &str) -> bool {
        self.entries.read().await.contains_key(policy_id)
    }
}

#[async_trait]
impl VerdictStore for InMemoryVerdictStore {
    async fn get(&self, policy_id: &str) -> Result<Option<CacheEntry>, StoreError> {
        let entries = self.entries.read().await;
        Ok(entries.get(policy_id).cloned())
    }

    async fn upsert(&self, entry: CacheEntry) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        entries.insert(entry.policy_id.clone(), entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(policy_id: &str, payload: &str) -> CacheEntry {
        CacheEntry {
            policy_id: policy_id.to_string(),
            payload: payload.to_string(),
            written_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_upsert_replaces() {
        let store = InMemoryVerdictStore::new();
        assert!(store.is_empty().await);

        store.upsert(entry("p1", "first")).await.unwrap();
        store.upsert(entry("p1", "second")).await.unwrap();
        store.upsert(entry("p2", "other")).await.unwrap();

        assert_eq!(store.len().await, 2);
        assert!(store.contains("p1").await);
        let stored = store.get("p1").await.unwrap().unwrap();
        assert_eq!(stored.payload, "second");
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let store = InMemoryVerdictStore::new();
        let handle = store.clone();
        handle.upsert(entry("p1", "x")).await.unwrap();
        assert!(store.contains("p1").await);
        assert!(store.get("missing").await.unwrap().is_none());
    }
}
