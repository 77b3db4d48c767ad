use cmap::{ConcurrentMap, ConcurrentMapBuilder};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

#[test]
fn test_concurrent_sets_distinct_keys() {
    let map = Arc::new(ConcurrentMapBuilder::new().shard_count(4).build::<i32>());
    let mut handles = vec![];

    // Spawn 16 threads, each inserting 500 distinct keys
    for thread_id in 0..16 {
        let map = Arc::clone(&map);
        let handle = thread::spawn(move || {
            for i in 0..500 {
                let key = format!("thread_{}_key_{}", thread_id, i);
                map.set(key, i);
            }
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }

    // No lost updates
    assert_eq!(map.count(), 8000);
}

#[test]
fn test_concurrent_reads() {
    let map = Arc::new(ConcurrentMap::new());

    for i in 0..100 {
        map.set(format!("key_{}", i), i);
    }

    let mut handles = vec![];

    // Spawn 20 threads, each reading all items
    for _ in 0..20 {
        let map = Arc::clone(&map);
        let handle = thread::spawn(move || {
            for i in 0..100 {
                let key = format!("key_{}", i);
                assert_eq!(map.get(&key), Some(i));
            }
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_concurrent_upserts() {
    let map = Arc::new(ConcurrentMap::new());
    let mut handles = vec![];

    // Spawn 10 threads, each incrementing the counter 100 times
    for _ in 0..10 {
        let map = Arc::clone(&map);
        let handle = thread::spawn(move || {
            for _ in 0..100 {
                map.upsert("counter".to_string(), 1_i32, |old, new| old.map_or(new, |o| o + new));
            }
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(map.get(&"counter".to_string()), Some(1000));
}

#[test]
fn test_concurrent_set_if_absent_single_winner() {
    let map = Arc::new(ConcurrentMap::new());
    let mut handles = vec![];

    for thread_id in 0..8 {
        let map = Arc::clone(&map);
        handles.push(thread::spawn(move || map.set_if_absent("slot", thread_id)));
    }

    let winners: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(winners.iter().filter(|won| **won).count(), 1);
    assert!(map.has(&"slot"));
}

#[test]
fn test_concurrent_pops_claim_each_key_once() {
    let map = Arc::new(ConcurrentMap::new());
    map.set_many((0..1000).map(|i| (i, i)));

    let mut handles = vec![];
    for _ in 0..4 {
        let map = Arc::clone(&map);
        handles.push(thread::spawn(move || {
            (0..1000).filter(|i| map.pop(i).is_some()).count()
        }));
    }

    let claimed: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(claimed, 1000);
    assert!(map.is_empty());
}

#[test]
fn test_snapshot_while_writing() {
    let map = Arc::new(ConcurrentMap::new());
    map.set_many((0..1000).map(|i| (i, 0)));

    let writer = {
        let map = Arc::clone(&map);
        thread::spawn(move || {
            for round in 1..=20 {
                for i in 0..1000 {
                    map.set(i, round);
                }
            }
        })
    };

    // Keys are only overwritten, so every snapshot sees each key exactly once.
    for _ in 0..20 {
        let mut keys: Vec<_> = map.snapshot().into_iter().map(|(k, _)| k).collect();
        keys.sort();
        assert_eq!(keys, (0..1000).collect::<Vec<_>>());
    }

    writer.join().unwrap();
}

#[test]
fn test_iter_async_while_writing_other_keys() {
    let map = Arc::new(ConcurrentMap::new());
    map.set_many((0..500).map(|i| (i, i)));

    let writer = {
        let map = Arc::clone(&map);
        thread::spawn(move || {
            for i in 500..5000 {
                map.set(i, i);
            }
        })
    };

    // The original keys are never touched, so all of them must come through.
    let seen: std::collections::HashSet<i32> = map.iter_async().map(|t| t.key).collect();
    assert!((0..500).all(|i| seen.contains(&i)));

    writer.join().unwrap();
}

#[test]
fn test_panicking_callback_does_not_poison_shard() {
    let map = Arc::new(ConcurrentMap::new());
    map.set("key".to_string(), 1);

    let result = {
        let map = Arc::clone(&map);
        thread::spawn(move || {
            map.upsert("key".to_string(), 2, |_, _| panic!("callback failure"));
        })
        .join()
    };
    assert!(result.is_err());

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        map.remove_if(&"key".to_string(), |_, _| panic!("predicate failure"))
    }));
    assert!(result.is_err());

    // The shard is unlocked and the original value is intact.
    assert_eq!(map.get(&"key".to_string()), Some(1));
    map.set("key".to_string(), 3);
    assert_eq!(map.get(&"key".to_string()), Some(3));
}

#[test]
fn test_concurrent_mixed_operations() {
    let map = Arc::new(ConcurrentMap::new());
    let mut handles = vec![];

    // Spawn writers
    for thread_id in 0..5 {
        let map = Arc::clone(&map);
        let handle = thread::spawn(move || {
            for i in 0..100 {
                let key = format!("key_{}_{}", thread_id, i);
                map.set(key, i);
            }
        });
        handles.push(handle);
    }

    // Spawn readers and counters
    for _ in 0..5 {
        let map = Arc::clone(&map);
        let handle = thread::spawn(move || {
            for _ in 0..100 {
                for i in 0..10 {
                    let key = format!("key_{}_{}", i % 5, i);
                    map.get(&key); // May or may not exist, that's ok
                }
                assert!(map.count() <= 500);
            }
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(map.count(), 500);
}
