//! Cache Statistics Module
//!
//! Snapshot of cache size and lookup counters.

use serde::Serialize;

// == Cache Stats ==
/// Point-in-time cache statistics. Counters only ever grow for the life of
/// the cache; `clear` empties the entries but keeps them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Current number of entries
    pub size: usize,
    /// Capacity
    pub max_size: usize,
    /// Lookups that returned a live value
    pub hits: u64,
    /// Lookups for absent or expired keys
    pub misses: u64,
    /// Entries dropped to make room
    pub evictions: u64,
}

impl CacheStats {
    /// hits / (hits + misses), or 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate_no_requests() {
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let stats = CacheStats {
            hits: 3,
            misses: 2,
            ..CacheStats::default()
        };
        assert!((stats.hit_rate() - 0.6).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_rate_all_misses() {
        let stats = CacheStats {
            misses: 4,
            ..CacheStats::default()
        };
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_serializes_camel_case() {
        let stats = CacheStats {
            size: 1,
            max_size: 10,
            ..CacheStats::default()
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["maxSize"], 10);
        assert_eq!(json["size"], 1);
    }
}
