use crate::{CacheStore, StoreError};
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: DateTime<Utc>,
}

/// Process-local expiring store. Used in tests and as a fallback when no
/// database is configured.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let now = Utc::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.expires_at > now => return Ok(Some(entry.value.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }

        // Expired: drop it, unless a writer refreshed it in the meantime
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get(key) {
            if entry.expires_at <= now {
                tracing::debug!(key, expires_at = %entry.expires_at, "evicting expired cache entry");
                entries.remove(key);
            }
        }
        Ok(None)
    }

    async fn put(&self, key: &str, value: Value, ttl_hours: u32) -> Result<(), StoreError> {
        let now = Utc::now();
        let expires_at = now + Duration::hours(i64::from(ttl_hours));

        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(key.to_string(), Entry { value, expires_at });
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_put_get_remove() {
        let store = MemoryStore::new();
        store.put("k", json!({"owner": "Unilever"}), 24).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(json!({"owner": "Unilever"})));
        assert_eq!(store.len().await, 1);

        store.remove("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_zero_ttl_is_expired() {
        let store = MemoryStore::new();
        store.put("k", json!(1), 0).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_entry_evicted_on_read() {
        let store = MemoryStore::new();
        store.put("k", json!(1), 0).await.unwrap();
        assert_eq!(store.len().await, 1);

        assert_eq!(store.get("k").await.unwrap(), None);
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_put_sweeps_expired_entries() {
        let store = MemoryStore::new();
        store.put("stale-a", json!(1), 0).await.unwrap();
        store.put("stale-b", json!(2), 0).await.unwrap();
        store.put("live", json!(3), 24).await.unwrap();

        assert_eq!(store.len().await, 1);
        assert_eq!(store.get("live").await.unwrap(), Some(json!(3)));
    }

    #[tokio::test]
    async fn test_put_replaces() {
        let store = MemoryStore::new();
        store.put("k", json!(1), 24).await.unwrap();
        store.put("k", json!(2), 24).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(json!(2)));
    }
}
