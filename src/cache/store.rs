//! Cache Store Module
//!
//! Bounded LRU store: a recency list of entries plus a key lookup, charged
//! against a byte capacity and expired lazily on access.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::{CacheEntry, CacheStats, LruList};
use crate::error::{CacheError, Result};

// == Cache Store ==
/// Capacity-bounded, expiry-aware cache for a single tenant.
///
/// Not synchronized on its own; see [`crate::cache::SharedStore`].
#[derive(Debug)]
pub struct CacheStore {
    /// Entries ordered from most to least recently used
    entries: LruList<CacheEntry>,
    /// Key to slot in `entries`
    index: HashMap<String, usize>,
    /// Sum of the size estimates of all entries
    used_bytes: usize,
    /// Configured maximum of `used_bytes`
    capacity_bytes: usize,
    /// TTL applied to writes without a positive TTL
    default_ttl: Duration,
    /// Performance statistics
    stats: CacheStats,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore with a byte capacity and default TTL.
    pub fn new(capacity_bytes: usize, default_ttl: Duration) -> Self {
        Self {
            entries: LruList::new(),
            index: HashMap::new(),
            used_bytes: 0,
            capacity_bytes,
            default_ttl,
            stats: CacheStats::new(),
        }
    }

    // == Set ==
    /// Stores a value under `key`.
    ///
    /// A zero `ttl` is replaced by the store's default TTL. An existing key
    /// is updated in place and promoted. A new key evicts least recently
    /// used entries until it fits; an entry larger than the whole capacity
    /// empties the store and is still inserted, leaving the store over
    /// capacity until a later write evicts it.
    pub fn set(&mut self, key: String, value: Value, ttl: Duration) {
        let ttl = if ttl.is_zero() { self.default_ttl } else { ttl };

        if let Some(&slot) = self.index.get(&key) {
            debug!(key = %key, ttl_secs = ttl.as_secs(), "Updating existing entry");
            let entry = self.entry_at_mut(slot);
            let old_size = entry.size_estimate();
            entry.refresh(value, ttl);
            let new_size = entry.size_estimate();
            self.used_bytes = self.used_bytes - old_size + new_size;
            self.entries.move_to_front(slot);
            return;
        }

        let candidate = CacheEntry::new(key, value, ttl);
        let size = candidate.size_estimate();
        if size > self.capacity_bytes {
            warn!(
                key = %candidate.key,
                size,
                capacity = self.capacity_bytes,
                "Entry exceeds store capacity, inserting over capacity"
            );
        }

        while self.used_bytes + size > self.capacity_bytes && !self.entries.is_empty() {
            if let Some(evicted) = self.evict_lru() {
                debug!(key = %evicted, "Capacity exceeded, evicted least recently used entry");
            }
        }

        debug!(key = %candidate.key, ttl_secs = ttl.as_secs(), "Inserting new entry");
        let key = candidate.key.clone();
        let slot = self.entries.push_front(candidate);
        self.index.insert(key, slot);
        self.used_bytes += size;
    }

    // == Get ==
    /// Retrieves a value by key and promotes it to most recently used.
    ///
    /// An expired entry is purged and reported as not found.
    pub fn get(&mut self, key: &str) -> Result<Value> {
        let Some(&slot) = self.index.get(key) else {
            self.stats.record_miss();
            return Err(CacheError::NotFound(key.to_string()));
        };

        if self.entry_at(slot).is_expired() {
            self.remove_slot(slot);
            self.stats.record_expirations(1);
            self.stats.record_miss();
            return Err(CacheError::NotFound(key.to_string()));
        }

        self.entries.move_to_front(slot);
        self.stats.record_hit();
        Ok(self.entry_at(slot).value.clone())
    }

    // == Delete ==
    /// Removes an entry by key.
    pub fn delete(&mut self, key: &str) -> Result<()> {
        match self.index.get(key).copied() {
            Some(slot) => {
                self.remove_slot(slot);
                Ok(())
            }
            None => Err(CacheError::NotFound(key.to_string())),
        }
    }

    // == Clear ==
    /// Removes every entry and resets the byte usage.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
        self.used_bytes = 0;
    }

    // == Get All ==
    /// Returns a snapshot of all live entries, most recently used first.
    ///
    /// Expired entries met during the scan are purged.
    pub fn get_all(&mut self) -> Vec<CacheEntry> {
        let mut live = Vec::with_capacity(self.entries.len());
        let mut expired = Vec::new();
        for (slot, entry) in self.entries.iter() {
            if entry.is_expired() {
                expired.push(slot);
            } else {
                live.push(entry.clone());
            }
        }

        self.stats.record_expirations(expired.len());
        for slot in expired {
            self.remove_slot(slot);
        }
        live
    }

    // == Purge Expired ==
    /// Removes all expired entries from the store.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&mut self) -> usize {
        let expired: Vec<usize> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(slot, _)| slot)
            .collect();

        let count = expired.len();
        for slot in expired {
            self.remove_slot(slot);
        }
        self.stats.record_expirations(count);
        count
    }

    // == Grow Capacity ==
    /// Raises the capacity to `capacity_bytes` if that is larger.
    ///
    /// Never lowers the capacity. Returns true if the capacity changed.
    pub fn grow_capacity(&mut self, capacity_bytes: usize) -> bool {
        if capacity_bytes > self.capacity_bytes {
            self.capacity_bytes = capacity_bytes;
            true
        } else {
            false
        }
    }

    pub fn capacity_bytes(&self) -> usize {
        self.capacity_bytes
    }

    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    /// Returns true if `key` is present, expired or not, without touching
    /// recency.
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_usage(self.entries.len(), self.used_bytes, self.capacity_bytes);
        stats
    }

    // == Length ==
    /// Returns the current number of entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn evict_lru(&mut self) -> Option<String> {
        let entry = self.entries.pop_back()?;
        self.index.remove(&entry.key);
        self.used_bytes -= entry.size_estimate();
        self.stats.record_eviction();
        Some(entry.key)
    }

    fn remove_slot(&mut self, slot: usize) -> Option<CacheEntry> {
        let entry = self.entries.remove(slot)?;
        self.index.remove(&entry.key);
        self.used_bytes -= entry.size_estimate();
        Some(entry)
    }

    fn entry_at(&self, slot: usize) -> &CacheEntry {
        match self.entries.get(slot) {
            Some(entry) => entry,
            None => unreachable!("lookup points at vacant slot {slot}"),
        }
    }

    fn entry_at_mut(&mut self, slot: usize) -> &mut CacheEntry {
        match self.entries.get_mut(slot) {
            Some(entry) => entry,
            None => unreachable!("lookup points at vacant slot {slot}"),
        }
    }

    /// Asserts that the lookup, the recency list and `used_bytes` agree.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        assert_eq!(self.index.len(), self.entries.len(), "lookup/list length mismatch");
        for (key, &slot) in &self.index {
            let entry = self.entries.get(slot).expect("lookup points at vacant slot");
            assert_eq!(&entry.key, key, "lookup points at the wrong entry");
        }
        let used: usize = self.entries.iter().map(|(_, e)| e.size_estimate()).sum();
        assert_eq!(used, self.used_bytes, "used_bytes out of sync");
    }
}
