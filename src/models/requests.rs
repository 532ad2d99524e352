//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::cache::MAX_KEY_LENGTH;

/// Query string shared by every cache route (`?system=...&tenantID=...`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheQuery {
    /// Backend selector, e.g. `inmemory` or `redis`
    pub system: Option<String>,
    /// Tenant identity, required for `inmemory` when tenancy is enabled
    #[serde(rename = "tenantID")]
    pub tenant_id: Option<String>,
}

/// Request body for the SET operation (POST /cache)
///
/// # Fields
/// - `key`: The cache key to store the value under
/// - `value`: Any JSON value
/// - `ttl`: Optional TTL in seconds; absent, zero or negative uses the default
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// The value to store
    pub value: Value,
    /// Optional TTL in seconds
    #[serde(default)]
    pub ttl: Option<i64>,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        if self.key.len() > MAX_KEY_LENGTH {
            return Some(format!(
                "Key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            ));
        }
        None
    }

    /// TTL to hand to the backend; zero selects the backend default.
    pub fn ttl(&self) -> Duration {
        match self.ttl {
            Some(secs) if secs > 0 => Duration::from_secs(secs as u64),
            _ => Duration::ZERO,
        }
    }
}
