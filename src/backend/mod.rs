//! Backend Module
//!
//! The cache contract shared by every backend, and the selector used by the
//! HTTP layer to pick one per request.

mod memcache;
mod redis;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{CacheError, Result};

pub use self::memcache::MemcacheBackend;
pub use self::redis::RedisBackend;

// == Cache Contract ==
/// Operations every cache backend supports.
///
/// `get` and `delete` fail with [`CacheError::NotFound`] when the key is
/// absent or has lapsed. A zero `ttl` on `set` means the backend default.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Selector name of the backend, for logs
    fn name(&self) -> &'static str;

    async fn get(&self, key: &str) -> Result<Value>;

    async fn set(&self, key: String, value: Value, ttl: Duration) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;

    async fn clear(&self) -> Result<()>;
}

// == Cache System ==
/// Request-supplied backend selector (`?system=`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheSystem {
    /// Partitioned in-process stores
    InMemory,
    /// Remote key/value store
    Redis,
    /// Remote memcached server
    Memcache,
}

impl CacheSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheSystem::InMemory => "inmemory",
            CacheSystem::Redis => "redis",
            CacheSystem::Memcache => "memcache",
        }
    }
}

impl fmt::Display for CacheSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CacheSystem {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "inmemory" => Ok(CacheSystem::InMemory),
            "redis" => Ok(CacheSystem::Redis),
            "memcache" => Ok(CacheSystem::Memcache),
            other => Err(CacheError::InvalidSystem(other.to_string())),
        }
    }
}
