//! Cache Manager Module
//!
//! Shared, infallible facade over [`CacheStore`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::cache::{CacheStats, CacheStore};
use crate::error::CacheError;

// == Cache Manager ==
/// Thread-safe handle to one cache. Cloning shares the underlying store.
///
/// No operation returns an error: storage failures are logged and reported
/// as `None` or `false`.
#[derive(Debug)]
pub struct CacheManager<V> {
    store: Arc<RwLock<CacheStore<V>>>,
}

impl<V> Clone for CacheManager<V> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<V: Clone> CacheManager<V> {
    pub fn new(max_entries: usize, default_ttl: Duration) -> Self {
        info!(
            max_entries,
            ttl_secs = default_ttl.as_secs(),
            "cache manager initialized"
        );
        Self::from_store(CacheStore::new(max_entries, default_ttl))
    }

    pub fn from_store(store: CacheStore<V>) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
        }
    }

    /// Live value for `key`; records a hit or a miss.
    pub async fn get(&self, key: &str) -> Option<V> {
        // write lock: a read updates recency and counters
        let mut store = self.store.write().await;
        match store.get(key) {
            Ok(value) => {
                debug!(key, "cache hit");
                Some(value)
            }
            Err(CacheError::NotFound(_)) | Err(CacheError::Expired(_)) => {
                debug!(key, "cache miss");
                None
            }
            Err(err) => {
                error!(key, error = %err, "cache get error");
                None
            }
        }
    }

    /// Stores `value`; `ttl` of `None` uses the default TTL.
    pub async fn set(&self, key: &str, value: V, ttl: Option<Duration>) -> bool {
        let mut store = self.store.write().await;
        match store.set(key.to_string(), value, ttl) {
            Ok(()) => {
                debug!(key, "cache set");
                true
            }
            Err(err) => {
                error!(key, error = %err, "cache set error");
                false
            }
        }
    }

    /// True if the key was present.
    pub async fn delete(&self, key: &str) -> bool {
        let mut store = self.store.write().await;
        match store.delete(key) {
            Ok(()) => {
                debug!(key, "cache delete");
                true
            }
            Err(_) => false,
        }
    }

    pub async fn clear(&self) {
        self.store.write().await.clear();
        info!("cache cleared");
    }

    pub async fn stats(&self) -> CacheStats {
        self.store.read().await.stats()
    }

    pub async fn keys(&self) -> Vec<String> {
        self.store.read().await.keys()
    }

    /// Drops expired entries; returns how many were removed.
    pub async fn cleanup_expired(&self) -> usize {
        self.store.write().await.cleanup_expired()
    }
}
