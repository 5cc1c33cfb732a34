// ============================
// passport-lib/src/cache.rs
// ============================
//! TTL key-value store abstraction with an in-memory implementation.
//!
//! The passport service keeps all of its ephemeral state (SMS codes,
//! failed-login counters) behind this trait; deployments back it with their
//! key-value store of choice.
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;
use tokio::time::Instant;

/// Errors surfaced by a TTL store backend
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("value at {0} is not an integer")]
    NotAnInteger(String),
}

/// Trait for TTL key-value store backends
#[async_trait]
pub trait TtlStore: Send + Sync {
    /// Read the value at `key`, if present and not expired
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write `value` at `key` with the given time to live
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Delete the value at `key`
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Atomically increment the integer at `key`, creating it at 1 when
    /// absent; the remaining TTL is left untouched
    async fn incr(&self, key: &str) -> Result<i64, StoreError>;

    /// Reset the TTL of `key`; returns whether the key existed
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, StoreError>;
}

struct CacheEntry {
    value: String,
    deadline: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| deadline <= now)
    }
}

/// In-memory implementation of the `TtlStore` trait
///
/// Expiry runs on the tokio clock, so tests drive it with a paused runtime.
/// Expired entries are evicted lazily on access.
#[derive(Default)]
pub struct MemoryTtlStore {
    entries: DashMap<String, CacheEntry>,
}

impl MemoryTtlStore {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    fn evict_if_expired(&self, key: &str) {
        let now = Instant::now();
        self.entries.remove_if(key, |_, entry| entry.is_expired(now));
    }
}

#[async_trait]
impl TtlStore for MemoryTtlStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.evict_if_expired(key);
        Ok(self.entries.get(key).map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                deadline: Some(Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }

    async fn incr(&self, key: &str) -> Result<i64, StoreError> {
        self.evict_if_expired(key);
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| CacheEntry {
                value: "0".to_string(),
                deadline: None,
            });

        let count: i64 = entry
            .value
            .parse()
            .map_err(|_| StoreError::NotAnInteger(key.to_string()))?;
        let count = count + 1;
        entry.value = count.to_string();
        Ok(count)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, StoreError> {
        self.evict_if_expired(key);
        match self.entries.get_mut(key) {
            Some(mut entry) => {
                entry.deadline = Some(Instant::now() + ttl);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn values_expire_after_their_ttl() {
        let store = MemoryTtlStore::new();
        store
            .set("sms_codes_13800138000", "1234", Duration::from_secs(300))
            .await
            .unwrap();

        assert_eq!(
            store.get("sms_codes_13800138000").await.unwrap().as_deref(),
            Some("1234")
        );

        tokio::time::advance(Duration::from_secs(301)).await;
        assert_eq!(store.get("sms_codes_13800138000").await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_consumes_the_value() {
        let store = MemoryTtlStore::new();
        store
            .set("sms_codes_13800138000", "1234", Duration::from_secs(300))
            .await
            .unwrap();
        store.delete("sms_codes_13800138000").await.unwrap();
        assert_eq!(store.get("sms_codes_13800138000").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn incr_creates_at_one_and_counts_up() {
        let store = MemoryTtlStore::new();
        assert_eq!(store.incr("access_num_1.2.3.4").await.unwrap(), 1);
        assert_eq!(store.incr("access_num_1.2.3.4").await.unwrap(), 2);
        assert_eq!(store.incr("access_num_1.2.3.4").await.unwrap(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn incr_preserves_the_remaining_ttl() {
        let store = MemoryTtlStore::new();
        store
            .set("access_num_1.2.3.4", "1", Duration::from_secs(600))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(500)).await;
        assert_eq!(store.incr("access_num_1.2.3.4").await.unwrap(), 2);

        // Original deadline still applies
        tokio::time::advance(Duration::from_secs(101)).await;
        assert_eq!(store.get("access_num_1.2.3.4").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn expire_resets_the_window() {
        let store = MemoryTtlStore::new();
        store
            .set("access_num_1.2.3.4", "3", Duration::from_secs(10))
            .await
            .unwrap();

        assert!(store
            .expire("access_num_1.2.3.4", Duration::from_secs(600))
            .await
            .unwrap());

        tokio::time::advance(Duration::from_secs(11)).await;
        assert_eq!(
            store.get("access_num_1.2.3.4").await.unwrap().as_deref(),
            Some("3")
        );

        // Missing keys report false
        assert!(!store
            .expire("access_num_9.9.9.9", Duration::from_secs(600))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn incr_rejects_non_integer_values() {
        let store = MemoryTtlStore::new();
        store
            .set("access_num_1.2.3.4", "not-a-number", Duration::from_secs(60))
            .await
            .unwrap();
        assert!(matches!(
            store.incr("access_num_1.2.3.4").await,
            Err(StoreError::NotAnInteger(_))
        ));
    }
}
