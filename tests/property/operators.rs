// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Stream Operators
//!
//! Each operator is checked against a plain-iterator model of what it should
//! forward for an arbitrary sequence of writes.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use cim_form_validation::frp::{combine_latest2, SourceCell, Stream, Subscription, VirtualScheduler};
use proptest::prelude::*;

const INTERVAL_MS: u64 = 100;

fn collect<T: Clone + Send + Sync + 'static>(stream: &Stream<T>) -> (Arc<Mutex<Vec<T>>>, Subscription) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let subscription = stream.subscribe(move |value| sink.lock().unwrap().push(value));
    (seen, subscription)
}

proptest! {
    #[test]
    fn prop_distinct_forwards_changes_only(writes in prop::collection::vec(0u8..4, 0..40)) {
        let cell = SourceCell::new("n", 0u8);
        let (seen, _sub) = collect(&cell.stream().distinct_until_changed());
        for value in &writes {
            cell.set(*value);
        }

        let mut expected: Vec<u8> = vec![0];
        for value in writes {
            if expected.last() != Some(&value) {
                expected.push(value);
            }
        }
        prop_assert_eq!(seen.lock().unwrap().clone(), expected);
    }

    #[test]
    fn prop_drop_first_skips_prefix(writes in prop::collection::vec(any::<i32>(), 0..20), n in 0usize..25) {
        let cell = SourceCell::new("n", -1);
        let (seen, _sub) = collect(&cell.stream().drop_first(n));
        for value in &writes {
            cell.set(*value);
        }

        let expected: Vec<i32> = std::iter::once(-1).chain(writes).skip(n).collect();
        prop_assert_eq!(seen.lock().unwrap().clone(), expected);
    }

    #[test]
    fn prop_debounce_keeps_values_followed_by_quiet(
        writes in prop::collection::vec((any::<u16>(), 0u64..(3 * INTERVAL_MS)), 0..20),
    ) {
        let clock = VirtualScheduler::new();
        let interval = Duration::from_millis(INTERVAL_MS);
        let cell = SourceCell::new("n", 0u16);
        let (seen, _sub) = collect(&cell.stream().debounce(interval, Arc::new(clock.clone())));
        clock.advance(interval);

        for (value, gap_ms) in &writes {
            cell.set(*value);
            clock.advance(Duration::from_millis(*gap_ms));
        }
        clock.advance(interval);

        let mut expected = vec![0u16];
        for (index, (value, gap_ms)) in writes.iter().enumerate() {
            let last = index + 1 == writes.len();
            if last || *gap_ms >= INTERVAL_MS {
                expected.push(*value);
            }
        }
        prop_assert_eq!(seen.lock().unwrap().clone(), expected);
        prop_assert_eq!(clock.pending_timers(), 0);
    }

    #[test]
    fn prop_combine_emits_once_per_upstream_write(
        writes in prop::collection::vec((any::<bool>(), any::<u8>()), 0..30),
    ) {
        let left = SourceCell::new("left", 0u8);
        let right = SourceCell::new("right", 0u8);
        let (seen, _sub) = collect(&combine_latest2(&left.stream(), &right.stream()));

        let (mut l, mut r) = (0u8, 0u8);
        let mut expected = vec![(0u8, 0u8)];
        for (to_left, value) in writes {
            if to_left {
                left.set(value);
                l = value;
            } else {
                right.set(value);
                r = value;
            }
            expected.push((l, r));
        }
        prop_assert_eq!(seen.lock().unwrap().clone(), expected);
    }
}
