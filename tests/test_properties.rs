//! Property-based tests using proptest
//!
//! These tests verify counting, ranking and pruning invariants of the
//! aggregation table over arbitrary event sequences.

use mckeys::stats::rank;
use mckeys::types::DiscardThreshold;
use mckeys::{SortMode, SortOrder, StatCollection};
use proptest::prelude::*;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

fn events() -> impl Strategy<Value = Vec<(String, u32)>> {
    prop::collection::vec(("[a-e]{1,3}", any::<u32>()), 0..200)
}

fn sort_mode() -> impl Strategy<Value = SortMode> {
    prop::sample::select(SortMode::ALL.to_vec())
}

proptest! {
    #[test]
    fn prop_counts_and_last_size(events in events()) {
        let collection = StatCollection::new();
        let mut expected: HashMap<&str, (u64, u32)> = HashMap::new();
        for (key, size) in &events {
            collection.increment(key, *size);
            let entry = expected.entry(key.as_str()).or_default();
            entry.0 += 1;
            entry.1 = *size;
        }

        prop_assert_eq!(collection.len(), expected.len());
        for (key, (count, size)) in expected {
            let stat = collection.get(key).unwrap();
            prop_assert_eq!(stat.count(), count);
            prop_assert_eq!(stat.size(), size);
        }
    }

    #[test]
    fn prop_ascending_reverses_descending(events in events(), mode in sort_mode()) {
        let collection = StatCollection::new();
        for (key, size) in &events {
            collection.increment(key, *size);
        }
        let now = Instant::now() + Duration::from_secs(1);

        let mut desc = collection.snapshot_at(now);
        let mut asc = desc.clone();
        rank(&mut desc, mode, SortOrder::Desc);
        rank(&mut asc, mode, SortOrder::Asc);

        let desc_keys: Vec<_> = desc.iter().rev().map(|s| s.key.clone()).collect();
        let asc_keys: Vec<_> = asc.iter().map(|s| s.key.clone()).collect();
        prop_assert_eq!(desc_keys, asc_keys);
    }

    #[test]
    fn prop_zero_threshold_never_evicts(events in events(), secs in 0u64..100_000) {
        let collection = StatCollection::new();
        for (key, size) in &events {
            collection.increment(key, *size);
        }
        let report = collection.prune(
            DiscardThreshold::DISABLED,
            Instant::now() + Duration::from_secs(secs),
        );
        prop_assert_eq!(report.before, report.after);
        prop_assert_eq!(collection.len(), report.before);
    }

    #[test]
    fn prop_survivors_meet_threshold(
        events in events(),
        threshold in 0.01f64..50.0,
        millis in 1u64..60_000,
    ) {
        let start = Instant::now();
        let collection = StatCollection::new();
        for (key, size) in &events {
            collection.increment_at(key, *size, start);
        }
        let now = start + Duration::from_millis(millis);
        let threshold = DiscardThreshold::new(threshold).unwrap();

        let before = collection.snapshot_at(now);
        let report = collection.prune(threshold, now);
        prop_assert!(report.after <= report.before);
        for snapshot in collection.snapshot_at(now) {
            prop_assert!(snapshot.request_rate >= threshold.get());
        }

        // Every entry that disappeared was below the threshold at scan time
        for snapshot in before {
            if collection.get(&snapshot.key).is_none() {
                prop_assert!(
                    snapshot.request_rate < threshold.get(),
                    "{} evicted at {} req/s",
                    snapshot.key,
                    snapshot.request_rate
                );
            }
        }
    }

    #[test]
    fn prop_threshold_parse_never_panics(s in ".*") {
        let _ = s.parse::<DiscardThreshold>();
    }
}
