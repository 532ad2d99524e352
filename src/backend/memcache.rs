//! Memcache Backend
//!
//! Cache contract adapter over a memcached server. The `memcache` client is
//! blocking, so every call runs on tokio's blocking pool.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use memcache::{Client, MemcacheError};
use serde_json::Value;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::backend::CacheBackend;
use crate::error::{CacheError, Result};

const KEY_PREFIX: &str = "cache";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Longest relative expiry; memcached reads larger values as unix timestamps
const MAX_RELATIVE_EXPIRY: u64 = 30 * 24 * 60 * 60;

/// Memcached-backed implementation of [`CacheBackend`].
pub struct MemcacheBackend {
    client: Arc<Client>,
    default_ttl: Duration,
}

impl MemcacheBackend {
    /// Connects to `url` (e.g. `memcache://127.0.0.1:11211`) and checks the
    /// server answers `version`.
    pub async fn connect(url: &str, default_ttl: Duration) -> Result<Self> {
        info!("Connecting to memcache at {}", url);

        let target = url.to_string();
        let handshake = tokio::task::spawn_blocking(move || -> std::result::Result<Client, String> {
            let client = Client::connect(target.as_str()).map_err(|e| e.to_string())?;
            client.version().map_err(|e| e.to_string())?;
            Ok(client)
        });

        let client = timeout(CONNECT_TIMEOUT, handshake)
            .await
            .map_err(|_| CacheError::Backend("timed out connecting to memcache".to_string()))?
            .map_err(|e| CacheError::Backend(format!("memcache connect task failed: {e}")))?
            .map_err(|e| CacheError::Backend(format!("failed to connect to memcache: {e}")))?;

        info!("Memcache connection established");
        Ok(Self {
            client: Arc::new(client),
            default_ttl,
        })
    }

    /// Runs a blocking client call off the async workers.
    async fn run<T, F>(&self, operation: &'static str, call: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Client) -> std::result::Result<T, MemcacheError> + Send + 'static,
    {
        let client = Arc::clone(&self.client);
        tokio::task::spawn_blocking(move || call(client.as_ref()).map_err(|e| e.to_string()))
            .await
            .map_err(|e| CacheError::Backend(format!("memcache {operation} task failed: {e}")))?
            .map_err(|e| {
                warn!("Memcache {} failed: {}", operation, e);
                CacheError::Backend(format!("memcache {operation} failed: {e}"))
            })
    }
}

fn full_key(key: &str) -> String {
    format!("{KEY_PREFIX}:{key}")
}

/// Relative expiry in seconds, at least one and at most thirty days.
fn expiration_secs(ttl: Duration, default_ttl: Duration) -> u32 {
    let ttl = if ttl.is_zero() { default_ttl } else { ttl };
    ttl.as_secs().clamp(1, MAX_RELATIVE_EXPIRY) as u32
}

#[async_trait]
impl CacheBackend for MemcacheBackend {
    fn name(&self) -> &'static str {
        "memcache"
    }

    async fn get(&self, key: &str) -> Result<Value> {
        let full = full_key(key);
        let raw: Option<String> = self.run("get", move |client| client.get(&full)).await?;

        let raw = raw.ok_or_else(|| CacheError::NotFound(key.to_string()))?;
        serde_json::from_str(&raw)
            .map_err(|e| CacheError::Backend(format!("corrupt value for {key}: {e}")))
    }

    async fn set(&self, key: String, value: Value, ttl: Duration) -> Result<()> {
        let payload = serde_json::to_string(&value)
            .map_err(|e| CacheError::InvalidRequest(format!("unserializable value: {e}")))?;
        let full = full_key(&key);
        let expiration = expiration_secs(ttl, self.default_ttl);

        self.run("set", move |client| {
            client.set(&full, payload.as_str(), expiration)
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let full = full_key(key);
        let removed = self.run("delete", move |client| client.delete(&full)).await?;

        if !removed {
            return Err(CacheError::NotFound(key.to_string()));
        }
        Ok(())
    }

    /// Flushes the whole server; memcached cannot enumerate keys by prefix.
    async fn clear(&self) -> Result<()> {
        self.run("flush", |client| client.flush()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Live tests run only when `MEMCACHE_URL` points at a server.
    async fn live_backend() -> Option<MemcacheBackend> {
        let url = std::env::var("MEMCACHE_URL").ok()?;
        Some(MemcacheBackend::connect(&url, Duration::from_secs(10)).await.unwrap())
    }

    #[test]
    fn test_full_key_is_namespaced() {
        assert_eq!(full_key("session"), "cache:session");
    }

    #[test]
    fn test_expiration_secs() {
        let default_ttl = Duration::from_secs(10);

        assert_eq!(expiration_secs(Duration::ZERO, default_ttl), 10);
        assert_eq!(expiration_secs(Duration::from_secs(300), default_ttl), 300);
        assert_eq!(expiration_secs(Duration::from_millis(200), default_ttl), 1);
        assert_eq!(
            expiration_secs(Duration::from_secs(90 * 24 * 60 * 60), default_ttl),
            MAX_RELATIVE_EXPIRY as u32
        );
    }

    #[tokio::test]
    async fn test_connect_rejects_invalid_url() {
        let result = MemcacheBackend::connect("not a url", Duration::from_secs(10)).await;
        assert!(matches!(result, Err(CacheError::Backend(_))));
    }

    #[tokio::test]
    async fn test_contract_against_server() {
        let Some(backend) = live_backend().await else {
            return;
        };

        backend.set("k".to_string(), json!({"a": 1}), Duration::ZERO).await.unwrap();
        assert_eq!(backend.get("k").await.unwrap(), json!({"a": 1}));

        backend.delete("k").await.unwrap();
        assert!(matches!(backend.get("k").await, Err(CacheError::NotFound(_))));
        assert!(matches!(backend.delete("k").await, Err(CacheError::NotFound(_))));
    }
}
