//! Redis Backend
//!
//! Cache contract adapter over a remote Redis server. Values are stored as
//! JSON strings under a namespaced key and expire through Redis `EX`.

use std::time::Duration;

use async_trait::async_trait;
use redis::{aio::ConnectionManager, Client};
use serde_json::Value;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::backend::CacheBackend;
use crate::error::{CacheError, Result};

const KEY_PREFIX: &str = "cache";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// `COUNT` hint per `SCAN` page during clear
const SCAN_BATCH: usize = 500;

/// Redis-backed implementation of [`CacheBackend`].
///
/// Holds one reconnecting [`ConnectionManager`]; every operation works on a
/// cheap clone of it.
pub struct RedisBackend {
    conn: ConnectionManager,
    default_ttl: Duration,
}

impl RedisBackend {
    /// Connects to `url` and verifies the server answers `PING`.
    pub async fn connect(url: &str, default_ttl: Duration) -> Result<Self> {
        info!("Connecting to redis at {}", url);

        let client = Client::open(url)
            .map_err(|e| CacheError::Backend(format!("invalid redis url {url}: {e}")))?;
        let mut conn = timeout(CONNECT_TIMEOUT, ConnectionManager::new(client))
            .await
            .map_err(|_| CacheError::Backend("timed out connecting to redis".to_string()))?
            .map_err(|e| CacheError::Backend(format!("failed to connect to redis: {e}")))?;

        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::Backend(format!("redis ping failed: {e}")))?;
        if pong != "PONG" {
            return Err(CacheError::Backend(format!("unexpected ping reply: {pong}")));
        }

        info!("Redis connection established");
        Ok(Self { conn, default_ttl })
    }
}

fn full_key(key: &str) -> String {
    format!("{KEY_PREFIX}:{key}")
}

/// Seconds to pass to `EX`; Redis rejects zero.
fn expiry_secs(ttl: Duration, default_ttl: Duration) -> u64 {
    let ttl = if ttl.is_zero() { default_ttl } else { ttl };
    ttl.as_secs().max(1)
}

#[async_trait]
impl CacheBackend for RedisBackend {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> Result<Value> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = redis::cmd("GET")
            .arg(full_key(key))
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                warn!("Redis GET failed for {}: {}", key, e);
                CacheError::Backend(format!("redis get failed: {e}"))
            })?;

        let raw = raw.ok_or_else(|| CacheError::NotFound(key.to_string()))?;
        serde_json::from_str(&raw)
            .map_err(|e| CacheError::Backend(format!("corrupt value for {key}: {e}")))
    }

    async fn set(&self, key: String, value: Value, ttl: Duration) -> Result<()> {
        let payload = serde_json::to_string(&value)
            .map_err(|e| CacheError::InvalidRequest(format!("unserializable value: {e}")))?;
        let mut conn = self.conn.clone();

        let _: () = redis::cmd("SET")
            .arg(full_key(&key))
            .arg(payload)
            .arg("EX")
            .arg(expiry_secs(ttl, self.default_ttl))
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                warn!("Redis SET failed for {}: {}", key, e);
                CacheError::Backend(format!("redis set failed: {e}"))
            })?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let removed: u64 = redis::cmd("DEL")
            .arg(full_key(key))
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                warn!("Redis DEL failed for {}: {}", key, e);
                CacheError::Backend(format!("redis delete failed: {e}"))
            })?;

        if removed == 0 {
            return Err(CacheError::NotFound(key.to_string()));
        }
        Ok(())
    }

    /// Deletes every namespaced key, one `SCAN` page at a time.
    async fn clear(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let pattern = format!("{KEY_PREFIX}:*");
        let mut cursor: u64 = 0;
        let mut removed: u64 = 0;

        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await
                .map_err(|e| CacheError::Backend(format!("redis scan failed: {e}")))?;

            if !keys.is_empty() {
                let deleted: u64 = redis::cmd("DEL")
                    .arg(keys)
                    .query_async(&mut conn)
                    .await
                    .map_err(|e| CacheError::Backend(format!("redis clear failed: {e}")))?;
                removed += deleted;
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        debug!("Redis clear removed {} keys", removed);
        Ok(())
    }
}
