//! Slot pool accounting under mixed acquire/release traffic.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use tumbletiles::pool::SlotPool;

#[test]
fn test_counts_partition_capacity_under_random_traffic() {
    let mut pool: SlotPool<u32> = SlotPool::new(32);
    let mut live: HashSet<usize> = HashSet::new();
    let mut rng = StdRng::seed_from_u64(2024);

    for step in 0..5_000 {
        if rng.random_bool(0.55) {
            match pool.acquire() {
                Some(i) => assert!(live.insert(i), "step {step}: slot {i} handed out twice"),
                None => assert_eq!(live.len(), 32),
            }
        } else {
            let victim = live.iter().next().copied();
            if let Some(i) = victim {
                assert!(pool.release(i));
                live.remove(&i);
                assert!(!pool.release(i));
            }
        }
        assert_eq!(pool.used_count(), live.len());
        assert_eq!(pool.used_count() + pool.free_count(), pool.capacity());
        assert_eq!(pool.is_dry(), live.len() == 32);
    }

    let walked: HashSet<usize> = pool.iter().map(|(i, _)| i).collect();
    assert_eq!(walked, live);
}

#[test]
fn test_release_during_cursor_walk_after_churn() {
    let mut pool: SlotPool<u8> = SlotPool::new(10);
    let all: Vec<usize> = (0..10).filter_map(|_| pool.acquire()).collect();
    for &i in all.iter().step_by(3) {
        pool.release(i);
    }
    let expected: HashSet<usize> = pool.iter().map(|(i, _)| i).collect();

    let mut visited = Vec::new();
    let mut cursor = pool.cursor();
    while let Some(i) = cursor.advance(&pool) {
        visited.push(i);
        assert!(pool.release(i));
    }

    assert_eq!(visited.len(), expected.len());
    assert_eq!(visited.into_iter().collect::<HashSet<_>>(), expected);
    assert_eq!(pool.used_count(), 0);
    assert_eq!(pool.free_count(), 10);
}

#[test]
fn test_exhaustion_then_recovery() {
    let mut pool: SlotPool<()> = SlotPool::new(3);
    let got: Vec<usize> = (0..3).filter_map(|_| pool.acquire()).collect();
    assert_eq!(got.len(), 3);
    assert!(pool.acquire().is_none());
    assert!(pool.release(got[1]));
    assert_eq!(pool.acquire(), Some(got[1]));
}
