//! Benchmarks for RbTree and LockedList against std/crossbeam baselines.
//!
//! Run with: cargo bench --package lustre-core --bench collection_benchmark

use criterion::Criterion;
use criterion::black_box;
use criterion::criterion_group;
use criterion::criterion_main;
use crossbeam::queue::SegQueue;
use mimalloc::MiMalloc;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

use lustre_core::{LockedList, RbTree};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn scrambled(count: usize) -> impl Iterator<Item = usize> {
    (0..count).map(move |i| (i * 7919) % count)
}

// ============================================================================
// Ordered set: insert, lookup, remove
// ============================================================================

fn rb_tree_insert_find_remove(count: usize) {
    let mut tree = RbTree::<usize>::default();

    for key in scrambled(count) {
        tree.insert(key).unwrap();
    }
    for key in 0..count {
        assert!(tree.contains(&key));
    }
    for key in scrambled(count) {
        tree.remove(&key).unwrap();
    }

    assert!(tree.is_empty());
}

fn btree_set_insert_find_remove(count: usize) {
    let mut set = BTreeSet::new();

    for key in scrambled(count) {
        set.insert(key);
    }
    for key in 0..count {
        assert!(set.contains(&key));
    }
    for key in scrambled(count) {
        set.remove(&key);
    }

    assert!(set.is_empty());
}

fn rb_tree_iterate(tree: &RbTree<usize>) -> usize {
    tree.iter().copied().sum()
}

// ============================================================================
// Concurrent queue: producers on the tail, consumers on the head
// ============================================================================

fn locked_list_enqueue_dequeue(thread_count: usize, iteration_count: usize) {
    let list: Arc<LockedList<usize>> = Arc::new(LockedList::default());
    let mut handles = vec![];

    for t in 0..thread_count {
        let list_clone = Arc::clone(&list);
        let handle = thread::spawn(move || {
            for i in 0..iteration_count {
                list_clone.enqueue_tail(t * iteration_count + i).unwrap();
                if i % 2 == 1 {
                    black_box(list_clone.dequeue_head());
                }
            }
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }

    list.empty();
}

fn seg_queue_push_pop(thread_count: usize, iteration_count: usize) {
    let queue: Arc<SegQueue<usize>> = Arc::new(SegQueue::new());
    let mut handles = vec![];

    for t in 0..thread_count {
        let queue_clone = Arc::clone(&queue);
        let handle = thread::spawn(move || {
            for i in 0..iteration_count {
                queue_clone.push(t * iteration_count + i);
                if i % 2 == 1 {
                    black_box(queue_clone.pop());
                }
            }
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }
}

// ============================================================================
// Criterion benchmark groups
// ============================================================================

fn ordered_set_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("ordered_set_insert_find_remove");

    for count in [1_000, 10_000, 100_000] {
        group.bench_function(format!("rb_tree_{count}"), |b| {
            b.iter(|| rb_tree_insert_find_remove(black_box(count)))
        });
        group.bench_function(format!("btree_set_{count}"), |b| {
            b.iter(|| btree_set_insert_find_remove(black_box(count)))
        });
    }

    group.finish();
}

fn iteration_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("ordered_set_iterate");

    let mut tree = RbTree::<usize>::default();
    let set: BTreeSet<usize> = scrambled(100_000).collect();
    for key in scrambled(100_000) {
        tree.insert(key).unwrap();
    }

    group.bench_function("rb_tree_100000", |b| b.iter(|| rb_tree_iterate(black_box(&tree))));
    group.bench_function("btree_set_100000", |b| {
        b.iter(|| black_box(&set).iter().copied().sum::<usize>())
    });

    group.finish();
}

fn queue_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue_enqueue_dequeue");

    for thread_count in [1, 2, 4, 8] {
        group.bench_function(format!("locked_list_{:0>2}_10000", thread_count), |b| {
            b.iter(|| locked_list_enqueue_dequeue(black_box(thread_count), black_box(10_000)))
        });
        group.bench_function(format!("seg_queue_{:0>2}_10000", thread_count), |b| {
            b.iter(|| seg_queue_push_pop(black_box(thread_count), black_box(10_000)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    ordered_set_benchmark,
    iteration_benchmark,
    queue_benchmark
);
criterion_main!(benches);
