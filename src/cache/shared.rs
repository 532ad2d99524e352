//! Shared Store Module
//!
//! Thread-safe handle around a [`CacheStore`] guarded by one exclusive lock.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::backend::CacheBackend;
use crate::cache::{CacheEntry, CacheStats, CacheStore};
use crate::error::Result;

// == Shared Store ==
/// Cloneable handle to one store.
///
/// Every operation holds the store's lock for its full duration, so each
/// call is atomic with respect to requests, the sweeper and the rebalancer.
#[derive(Debug, Clone)]
pub struct SharedStore {
    inner: Arc<Mutex<CacheStore>>,
}

impl SharedStore {
    /// Creates a store with a byte capacity and default TTL.
    pub fn new(capacity_bytes: usize, default_ttl: Duration) -> Self {
        Self::from_store(CacheStore::new(capacity_bytes, default_ttl))
    }

    pub fn from_store(store: CacheStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Snapshot of live entries, most recently used first.
    pub async fn get_all(&self) -> Vec<CacheEntry> {
        self.inner.lock().await.get_all()
    }

    /// Purges expired entries, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        self.inner.lock().await.purge_expired()
    }

    /// Raises the capacity if `capacity_bytes` is larger; never lowers it.
    pub async fn grow_capacity(&self, capacity_bytes: usize) -> bool {
        self.inner.lock().await.grow_capacity(capacity_bytes)
    }

    pub async fn capacity_bytes(&self) -> usize {
        self.inner.lock().await.capacity_bytes()
    }

    pub async fn used_bytes(&self) -> usize {
        self.inner.lock().await.used_bytes()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }

    pub async fn stats(&self) -> CacheStats {
        self.inner.lock().await.stats()
    }
}

#[async_trait]
impl CacheBackend for SharedStore {
    fn name(&self) -> &'static str {
        "inmemory"
    }

    async fn get(&self, key: &str) -> Result<Value> {
        self.inner.lock().await.get(key)
    }

    async fn set(&self, key: String, value: Value, ttl: Duration) -> Result<()> {
        self.inner.lock().await.set(key, value, ttl);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.inner.lock().await.delete(key)
    }

    async fn clear(&self) -> Result<()> {
        self.inner.lock().await.clear();
        Ok(())
    }
}
