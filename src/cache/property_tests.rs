//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check expiry, overwrite, sweep and get_or_set behavior
//! against a manually driven clock.

use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::cache::{generate_cache_key, ManualClock, TtlCache};

// == Test Configuration ==
const START_MS: u64 = 1_700_000_000_000;

fn cache_with_clock() -> (TtlCache<String>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(START_MS));
    (TtlCache::with_clock(30_000, clock.clone()), clock)
}

// == Strategies ==
/// Generates cache keys
fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_]{1,64}"
}

/// Generates cache values
fn valid_value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,256}"
}

/// Generates a key parameter with no delimiter in it, sometimes absent
fn key_param_strategy() -> impl Strategy<Value = Option<String>> {
    prop::option::of("[a-z0-9]{1,12}")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // A read within ttl of the set returns the value; a read after returns nothing.
    #[test]
    fn prop_expiry_correctness(
        key in valid_key_strategy(),
        value in valid_value_strategy(),
        ttl_ms in 0u64..100_000,
        elapsed in 0u64..200_000,
    ) {
        let (cache, clock) = cache_with_clock();
        cache.set(key.clone(), value.clone(), Some(ttl_ms));

        clock.advance(elapsed);
        let read = cache.get(&key);

        if elapsed <= ttl_ms {
            prop_assert_eq!(read, Some(value));
        } else {
            prop_assert_eq!(read, None);
            prop_assert_eq!(cache.len(), 0, "Expired read should evict");
        }
    }

    // A second set restarts the window: v2 is readable just before it closes.
    #[test]
    fn prop_overwrite_resets_clock(
        key in valid_key_strategy(),
        value1 in valid_value_strategy(),
        value2 in valid_value_strategy(),
        ttl_ms in 1u64..100_000,
        gap in 1u64..100_000,
    ) {
        let (cache, clock) = cache_with_clock();

        cache.set(key.clone(), value1, Some(ttl_ms));
        clock.advance(gap);
        cache.set(key.clone(), value2.clone(), Some(ttl_ms));
        clock.advance(ttl_ms - 1);

        prop_assert_eq!(cache.get(&key), Some(value2));
    }

    // cleanup removes exactly the expired entries and leaves the rest intact.
    #[test]
    fn prop_cleanup_removes_only_expired(
        entries in prop::collection::hash_map(
            valid_key_strategy(),
            (valid_value_strategy(), 0u64..10_000),
            1..40,
        ),
        elapsed in 0u64..10_000,
    ) {
        let (cache, clock) = cache_with_clock();
        for (key, (value, ttl)) in &entries {
            cache.set(key.clone(), value.clone(), Some(*ttl));
        }

        clock.advance(elapsed);
        let removed = cache.cleanup();

        let live: HashMap<&String, &String> = entries
            .iter()
            .filter(|(_, (_, ttl))| elapsed <= *ttl)
            .map(|(key, (value, _))| (key, value))
            .collect();

        prop_assert_eq!(removed, entries.len() - live.len());
        prop_assert_eq!(cache.len(), live.len());
        for (key, value) in live {
            prop_assert_eq!(cache.get(key), Some(value.clone()));
        }
    }

    // A live entry short-circuits get_or_set; a miss calls the fetcher once.
    #[test]
    fn prop_get_or_set_fetches_only_on_miss(
        key in valid_key_strategy(),
        value in valid_value_strategy(),
        prefill in any::<bool>(),
    ) {
        let (cache, _) = cache_with_clock();
        if prefill {
            cache.set(key.clone(), value.clone(), None);
        }

        let calls = AtomicUsize::new(0);
        let result = tokio_test::block_on(cache.get_or_set(
            &key,
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, ()>(value.clone())
            },
            None,
        ));

        prop_assert_eq!(result, Ok(value.clone()));
        prop_assert_eq!(calls.load(Ordering::SeqCst), usize::from(!prefill));
        prop_assert_eq!(cache.get(&key), Some(value));
    }

    // Keys ignore absent params and distinguish different present params.
    #[test]
    fn prop_cache_key_skips_absent_params(
        prefix in "[a-z]{1,10}",
        params in prop::collection::vec(key_param_strategy(), 0..6),
    ) {
        let with_gaps = generate_cache_key(&prefix, params.clone());
        let present: Vec<Option<String>> = params.iter().flatten().cloned().map(Some).collect();

        prop_assert_eq!(with_gaps, generate_cache_key(&prefix, present));
    }

    #[test]
    fn prop_cache_key_distinguishes_values(
        a in "[a-z0-9]{1,12}",
        b in "[a-z0-9]{1,12}",
    ) {
        prop_assume!(a != b);
        prop_assert_ne!(
            generate_cache_key("bookmarks", [Some(a), Some("true".to_string())]),
            generate_cache_key("bookmarks", [Some(b), Some("true".to_string())])
        );
    }
}
