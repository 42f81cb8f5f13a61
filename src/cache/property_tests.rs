//! Property-Based Tests for Cache Module

use proptest::prelude::*;
use std::collections::HashMap;
use std::time::Duration;

use crate::cache::CacheStore;

const TEST_MAX_ENTRIES: usize = 16;
const TEST_TTL: Duration = Duration::from_secs(300);

// == Strategies ==
/// Small key space so sequences revisit keys often.
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-e][0-9]".prop_map(|s| s)
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: u32 },
    Get { key: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (key_strategy(), any::<u32>()).prop_map(|(key, value)| CacheOp::Set { key, value }),
        key_strategy().prop_map(|key| CacheOp::Get { key }),
        key_strategy().prop_map(|key| CacheOp::Delete { key }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Hit and miss counters match the outcome of every lookup.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..80)) {
        let mut store = CacheStore::new(TEST_MAX_ENTRIES, TEST_TTL);
        let mut hits = 0u64;
        let mut misses = 0u64;

        for op in ops {
            match op {
                CacheOp::Set { key, value } => { store.set(key, value, None).unwrap(); }
                CacheOp::Get { key } => match store.get(&key) {
                    Ok(_) => hits += 1,
                    Err(_) => misses += 1,
                },
                CacheOp::Delete { key } => { let _ = store.delete(&key); }
            }
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits, hits);
        prop_assert_eq!(stats.misses, misses);
        prop_assert_eq!(stats.size, store.len());
    }

    // With room for every key, the store behaves like a plain map.
    #[test]
    fn prop_matches_model_map(ops in prop::collection::vec(cache_op_strategy(), 1..80)) {
        let mut store = CacheStore::new(64, TEST_TTL);
        let mut model: HashMap<String, u32> = HashMap::new();

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    store.set(key.clone(), value, None).unwrap();
                    model.insert(key, value);
                }
                CacheOp::Get { key } => {
                    prop_assert_eq!(store.get(&key).ok(), model.get(&key).copied());
                }
                CacheOp::Delete { key } => {
                    prop_assert_eq!(store.delete(&key).is_ok(), model.remove(&key).is_some());
                }
            }
        }

        let mut expected: Vec<String> = model.keys().cloned().collect();
        expected.sort();
        prop_assert_eq!(store.keys(), expected);
    }

    // Size never exceeds capacity, and every eviction is counted.
    #[test]
    fn prop_capacity_bound(
        capacity in 1usize..8,
        keys in prop::collection::vec(key_strategy(), 1..60),
    ) {
        let mut store = CacheStore::new(capacity, TEST_TTL);
        let mut inserted_new = 0u64;

        for key in keys {
            if store.get(&key).is_err() {
                inserted_new += 1;
            }
            store.set(key, 0u32, None).unwrap();
            prop_assert!(store.len() <= capacity);
        }

        let stats = store.stats();
        prop_assert_eq!(stats.evictions, inserted_new - store.len() as u64);
    }

    // The most recently written key always survives the next insertion.
    #[test]
    fn prop_recent_key_survives(keys in prop::collection::vec(key_strategy(), 2..40)) {
        let mut store = CacheStore::new(2, TEST_TTL);
        let mut previous: Option<String> = None;

        for key in keys {
            store.set(key.clone(), 1u32, None).unwrap();
            if let Some(prev) = &previous {
                prop_assert!(store.keys().contains(prev));
            }
            previous = Some(key);
        }
    }
}
