//! Cache Module
//!
//! Bounded in-memory caching with per-entry TTL and LRU eviction.

mod entry;
mod lru;
mod manager;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::CacheEntry;
pub use lru::LruTracker;
pub use manager::CacheManager;
pub use stats::CacheStats;
pub use store::{CacheResult, CacheStore};

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;
