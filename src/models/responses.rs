//! Response DTOs for the cache server API
//!
//! Defines the structure of outgoing HTTP response bodies.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::cache::{CacheEntry, CacheStats};

/// Response body for the GET operation (GET /cache/:key)
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The stored value
    pub value: Value,
}

impl GetResponse {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Response body for the SET operation (POST /cache)
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Success message
    pub message: String,
    /// The key that was set
    pub key: String,
}

impl SetResponse {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' set successfully", key),
            key,
        }
    }
}

/// Response body for the DELETE operation (DELETE /cache/:key)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The key that was deleted
    pub key: String,
}

impl DeleteResponse {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' deleted successfully", key),
            key,
        }
    }
}

/// Response body for the CLEAR operation (PUT /cache/clear)
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    /// Success message
    pub message: String,
}

impl ClearResponse {
    pub fn new(system: &str) -> Self {
        Self {
            message: format!("Cache '{}' cleared successfully", system),
        }
    }
}

/// One live entry in the GET /cache snapshot
#[derive(Debug, Clone, Serialize)]
pub struct EntryResponse {
    pub key: String,
    pub value: Value,
    /// TTL of the last write, in seconds
    pub ttl: u64,
    /// Wall-clock expiry in ISO 8601 format
    pub expires_at: DateTime<Utc>,
}

impl From<CacheEntry> for EntryResponse {
    fn from(entry: CacheEntry) -> Self {
        let remaining = chrono::Duration::from_std(entry.ttl_remaining())
            .unwrap_or_else(|_| chrono::Duration::zero());
        Self {
            expires_at: Utc::now() + remaining,
            ttl: entry.ttl.as_secs(),
            key: entry.key,
            value: entry.value,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of evictions
    pub evictions: u64,
    /// Number of entries purged after expiring
    pub expirations: u64,
    /// Current number of entries in the store
    pub total_entries: usize,
    /// Bytes charged by current entries
    pub used_bytes: usize,
    /// Store capacity in bytes
    pub capacity_bytes: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expirations: stats.expirations,
            total_entries: stats.total_entries,
            used_bytes: stats.used_bytes,
            capacity_bytes: stats.capacity_bytes,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
