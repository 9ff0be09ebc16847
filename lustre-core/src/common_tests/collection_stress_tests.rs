//! Common stress tests for the collections.
//!
//! The list synchronizes itself; the tree is shared behind the caller's lock,
//! which is how the metadata layer uses it.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use parking_lot::Mutex;

use crate::common_tests::ref_tracker::{RefCounts, RefTracker};
use crate::data_structures::{LockedList, RbTree};

fn assert_exactly_once(mut seen: Vec<i32>, total: usize) {
    seen.sort_unstable();
    let expected: Vec<i32> = (0..total as i32).collect();
    assert_eq!(seen.len(), total, "lost or duplicated entries");
    assert_eq!(seen, expected);
}

/// Test that concurrent enqueues on both ends lose nothing
pub fn test_concurrent_enqueue(threads: usize, per_thread: usize) {
    let list = Arc::new(LockedList::<i32>::default());
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let list = Arc::clone(&list);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..per_thread {
                    let value = (t * per_thread + i) as i32;
                    if (t + i) % 2 == 0 {
                        list.enqueue_tail(value).unwrap();
                    } else {
                        list.enqueue_head(value).unwrap();
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let total = threads * per_thread;
    assert_eq!(list.len(), total);

    let drained: Vec<_> = std::iter::from_fn(|| list.dequeue_head()).collect();
    assert_exactly_once(drained, total);
    assert!(list.is_empty());
}

/// Test producers and consumers running against one list
pub fn test_producers_consumers(producers: usize, consumers: usize, per_producer: usize) {
    let list = Arc::new(LockedList::<i32>::default());
    let consumed = Arc::new(AtomicUsize::new(0));
    let total = producers * per_producer;

    let producer_handles: Vec<_> = (0..producers)
        .map(|p| {
            let list = Arc::clone(&list);
            thread::spawn(move || {
                for i in 0..per_producer {
                    list.enqueue_tail((p * per_producer + i) as i32).unwrap();
                }
            })
        })
        .collect();

    let consumer_handles: Vec<_> = (0..consumers)
        .map(|c| {
            let list = Arc::clone(&list);
            let consumed = Arc::clone(&consumed);
            thread::spawn(move || {
                let mut local = Vec::new();
                while consumed.load(Ordering::Acquire) < total {
                    let item = if c % 2 == 0 {
                        list.dequeue_head()
                    } else {
                        list.dequeue_tail()
                    };

                    match item {
                        Some(value) => {
                            local.push(value);
                            consumed.fetch_add(1, Ordering::AcqRel);
                        }
                        None => thread::yield_now(),
                    }
                }
                local
            })
        })
        .collect();

    for handle in producer_handles {
        handle.join().unwrap();
    }

    let mut seen = Vec::with_capacity(total);
    for handle in consumer_handles {
        seen.extend(handle.join().unwrap());
    }

    assert_exactly_once(seen, total);
    assert!(list.is_empty());
}

/// Test that every reference is transferred or released exactly once under
/// contention
pub fn test_concurrent_reference_transfer(threads: usize, per_thread: usize) {
    let tracker = RefTracker::new();
    let list = Arc::new(LockedList::new(tracker.clone()));
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let list = Arc::clone(&list);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let mut taken = Vec::new();
                for i in 0..per_thread {
                    list.enqueue_head((t * per_thread + i) as i32).unwrap();
                    if i % 3 == 0
                        && let Some(value) = list.dequeue_tail()
                    {
                        taken.push(value);
                    }
                }
                taken
            })
        })
        .collect();

    let mut taken = Vec::new();
    for handle in handles {
        taken.extend(handle.join().unwrap());
    }

    let total = threads * per_thread;
    assert_eq!(list.len() + taken.len(), total);
    assert_eq!(tracker.total_inc(), total);
    assert_eq!(tracker.total_dec(), 0);

    // Whatever is still queued is released on teardown; dequeued payloads
    // keep the reference they were handed.
    //
    drop(list);

    let taken: HashSet<_> = taken.into_iter().collect();
    for value in 0..total as i32 {
        let expected = if taken.contains(&value) {
            RefCounts { inc: 1, dec: 0 }
        } else {
            RefCounts { inc: 1, dec: 1 }
        };
        assert_eq!(tracker.counts(value), expected, "value {value}");
    }
}

/// Test a tree shared behind an external lock
pub fn test_locked_tree(threads: usize, per_thread: usize) {
    let tracker = RefTracker::new();
    let tree = Arc::new(Mutex::new(RbTree::new(tracker.clone())));
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let tree = Arc::clone(&tree);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let base = (t * per_thread) as i32;

                for i in 0..per_thread as i32 {
                    tree.lock().insert(base + i).unwrap();
                }
                for i in (0..per_thread as i32).step_by(2) {
                    tree.lock().remove(&(base + i)).unwrap();
                }
                for i in 0..per_thread as i32 {
                    assert_eq!(tree.lock().contains(&(base + i)), i % 2 == 1);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let tree = tree.lock();
    tree.black_height();

    let remaining: Vec<_> = tree.iter().copied().collect();
    let expected: Vec<_> = (0..(threads * per_thread) as i32)
        .filter(|value| value % (per_thread as i32) % 2 == 1)
        .collect();
    assert_eq!(remaining, expected);
    assert_eq!(tracker.held(), tree.len());
}
