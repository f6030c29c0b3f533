//! Tests for the hidden set: membership, idempotence, concurrency.

use std::sync::Arc;

use crate::error::PolicyError;
use crate::hidden::HiddenSet;
use crate::Pid;

#[test]
fn test_insert_then_contains() {
    let set = HiddenSet::new();
    assert!(!set.contains(42));
    set.insert(42).unwrap();
    assert!(set.contains(42));
    assert_eq!(set.len(), 1);
}

#[test]
fn test_duplicate_insert_rejected_cardinality_unchanged() {
    let set = HiddenSet::new();
    set.insert(7).unwrap();
    assert_eq!(set.insert(7), Err(PolicyError::AlreadyHidden(7)));
    assert_eq!(set.len(), 1);
    assert!(set.contains(7));
}

#[test]
fn test_delete_is_idempotent() {
    let set = HiddenSet::new();
    set.insert(5).unwrap();
    set.remove(5);
    assert!(!set.contains(5));
    // Second remove of the same pid is a silent no-op.
    set.remove(5);
    assert!(set.is_empty());
}

#[test]
fn test_remove_absent_is_noop() {
    let set = HiddenSet::new();
    set.insert(1).unwrap();
    set.remove(999);
    assert_eq!(set.len(), 1);
}

#[test]
fn test_snapshot_is_sorted() {
    let set = HiddenSet::new();
    for pid in [30, 10, 20] {
        set.insert(pid).unwrap();
    }
    assert_eq!(set.snapshot(), vec![10, 20, 30]);
}

#[test]
fn test_for_each_visits_every_member() {
    let set = HiddenSet::new();
    for pid in [3, 1, 2] {
        set.insert(pid).unwrap();
    }
    let mut seen = Vec::new();
    set.for_each(|pid| seen.push(pid));
    seen.sort_unstable();
    assert_eq!(seen, vec![1, 2, 3]);
}

#[test]
fn test_for_each_callback_may_reenter_the_set() {
    let set = HiddenSet::new();
    set.insert(1).unwrap();
    set.insert(2).unwrap();
    // The callback runs off-lock, so mutating during iteration must not
    // deadlock or corrupt anything.
    set.for_each(|pid| set.remove(pid));
    assert!(set.is_empty());
}

#[test]
fn test_clear_releases_everything() {
    let set = HiddenSet::new();
    for pid in 1..=10 {
        set.insert(pid).unwrap();
    }
    set.clear();
    assert!(set.is_empty());
    assert_eq!(set.snapshot(), Vec::<Pid>::new());
}

#[test]
fn test_concurrent_insert_remove_iterate() {
    let set = Arc::new(HiddenSet::new());
    let threads = 8;
    let per_thread: Pid = 200;

    std::thread::scope(|scope| {
        for t in 0..threads {
            let set = Arc::clone(&set);
            scope.spawn(move || {
                let base = t as Pid * per_thread;
                for i in 0..per_thread {
                    let pid = base + i;
                    let _ = set.insert(pid);
                    if i % 3 == 0 {
                        set.remove(pid);
                    }
                }
            });
        }
        // Concurrent readers scanning while writers churn.
        for _ in 0..4 {
            let set = Arc::clone(&set);
            scope.spawn(move || {
                for _ in 0..100 {
                    let mut count = 0usize;
                    set.for_each(|_| count += 1);
                    assert!(count <= (threads as usize) * (per_thread as usize));
                }
            });
        }
    });

    // Exactly the pids not removed by their writer survive.
    for t in 0..threads {
        let base = t as Pid * per_thread;
        for i in 0..per_thread {
            assert_eq!(set.contains(base + i), i % 3 != 0);
        }
    }
}

#[test]
fn test_concurrent_duplicate_inserts_single_winner() {
    let set = Arc::new(HiddenSet::new());
    let winners = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let set = Arc::clone(&set);
                scope.spawn(move || set.insert(1234).is_ok())
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&won| won)
            .count()
    });
    assert_eq!(winners, 1);
    assert_eq!(set.len(), 1);
}
