//! Cache Statistics Module
//!
//! Tracks per-store counters and capacity usage.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance metrics for one store.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key not found or expired)
    pub misses: u64,
    /// Number of entries evicted to make room for a write
    pub evictions: u64,
    /// Number of entries purged because their TTL elapsed
    pub expirations: u64,
    /// Current number of entries in the store
    pub total_entries: usize,
    /// Sum of the size estimates of the current entries
    pub used_bytes: usize,
    /// Configured capacity of the store
    pub capacity_bytes: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    /// Adds `count` purged entries to the expiration counter.
    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }

    // == Update Usage ==
    /// Updates the entry count and byte usage snapshot.
    pub fn set_usage(&mut self, total_entries: usize, used_bytes: usize, capacity_bytes: usize) {
        self.total_entries = total_entries;
        self.used_bytes = used_bytes;
        self.capacity_bytes = capacity_bytes;
    }
}
