//! Cache Entry Module
//!
//! Defines a single cached record with its TTL and derived expiry instant.

use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;

/// Upper bound applied to any TTL so that `now + ttl` cannot overflow.
const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

// == Cache Entry ==
/// Represents a single cache entry with value and expiry metadata.
///
/// The expiry instant is always derived from the TTL at creation or
/// refresh time and cannot be set directly.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The key this entry is stored under
    pub key: String,
    /// The stored JSON payload
    pub value: Value,
    /// TTL applied on the last write
    pub ttl: Duration,
    /// Absolute expiry, `last write + ttl`
    expires_at: Instant,
}

impl CacheEntry {
    /// Fixed structural size charged against a store's capacity for every
    /// entry, independent of the payload.
    pub const SIZE_ESTIMATE: usize = std::mem::size_of::<CacheEntry>();

    // == Constructor ==
    /// Creates a new cache entry expiring `ttl` from now.
    ///
    /// # Arguments
    /// * `key` - The key the entry is stored under
    /// * `value` - The value to store
    /// * `ttl` - Time to live, already normalized by the store
    pub fn new(key: String, value: Value, ttl: Duration) -> Self {
        let ttl = ttl.min(MAX_TTL);
        Self {
            key,
            value,
            ttl,
            expires_at: Instant::now() + ttl,
        }
    }

    // == Refresh ==
    /// Replaces the value and TTL in place and recomputes the expiry.
    pub fn refresh(&mut self, value: Value, ttl: Duration) {
        let ttl = ttl.min(MAX_TTL);
        self.value = value;
        self.ttl = ttl;
        self.expires_at = Instant::now() + ttl;
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time is greater than or equal
    /// to its expiry instant, so a TTL of `T` is never served at `T`.
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    /// Returns the remaining time to live, zero once expired.
    pub fn ttl_remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }

    /// Returns the size charged against the owning store's capacity.
    pub fn size_estimate(&self) -> usize {
        Self::SIZE_ESTIMATE
    }
}
