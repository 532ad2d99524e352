//! Cache Module
//!
//! Provides the bounded in-memory store with TTL expiration and LRU eviction.

mod entry;
mod lru;
mod shared;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use lru::LruList;
pub use shared::SharedStore;
pub use stats::CacheStats;
pub use store::CacheStore;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;
