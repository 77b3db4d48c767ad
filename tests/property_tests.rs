use cmap::{callback, ConcurrentMap, ConcurrentMapBuilder, HashFunction};
use proptest::prelude::*;
use std::collections::HashMap;

#[derive(Debug, Clone)]
enum Op {
    Set(u8, i32),
    Remove(u8),
    Pop(u8),
    SetIfAbsent(u8, i32),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (any::<u8>(), any::<i32>()).prop_map(|(k, v)| Op::Set(k, v)),
        any::<u8>().prop_map(Op::Remove),
        any::<u8>().prop_map(Op::Pop),
        (any::<u8>(), any::<i32>()).prop_map(|(k, v)| Op::SetIfAbsent(k, v)),
    ]
}

proptest! {
    #[test]
    fn prop_single_caller_matches_hashmap(
        shard_count in 1usize..20,
        ops in prop::collection::vec(op_strategy(), 0..200),
    ) {
        let map = ConcurrentMapBuilder::new().shard_count(shard_count).build::<i32>();
        let mut model = HashMap::new();

        for op in ops {
            match op {
                Op::Set(k, v) => {
                    map.set(k, v);
                    model.insert(k, v);
                }
                Op::Remove(k) => {
                    map.remove(&k);
                    model.remove(&k);
                }
                Op::Pop(k) => {
                    prop_assert_eq!(map.pop(&k), model.remove(&k));
                }
                Op::SetIfAbsent(k, v) => {
                    let inserted = map.set_if_absent(k, v);
                    prop_assert_eq!(inserted, !model.contains_key(&k));
                    model.entry(k).or_insert(v);
                }
            }
        }

        for k in 0..=u8::MAX {
            prop_assert_eq!(map.get(&k), model.get(&k).copied());
        }
        prop_assert_eq!(map.count(), model.len());
        prop_assert_eq!(map.items(), model);
    }

    #[test]
    fn prop_shard_index_is_stable(key in ".*", shard_count in 1usize..64) {
        for hash_fn in [HashFunction::Fnv1a, HashFunction::AHash] {
            let map = ConcurrentMapBuilder::new()
                .shard_count(shard_count)
                .hash_function(hash_fn)
                .build::<()>();
            let index = map.shard_index(&key);
            prop_assert!(index < shard_count);
            prop_assert_eq!(map.shard_index(&key), index);
        }
    }

    #[test]
    fn prop_upsert_keep_existing_is_set_if_absent_then_get(
        pairs in prop::collection::vec((0u8..16, any::<i64>()), 0..50),
    ) {
        let upserted = ConcurrentMap::new();
        let guarded = ConcurrentMap::new();

        for (k, v) in pairs {
            let stored = upserted.upsert(k, v, callback::keep_existing);
            guarded.set_if_absent(k, v);
            prop_assert_eq!(Some(stored), guarded.get(&k));
        }
    }

    #[test]
    fn prop_clear_empties_map(keys in prop::collection::hash_set(any::<u32>(), 0..300)) {
        let map = ConcurrentMap::new();
        map.set_many(keys.iter().map(|k| (*k, ())));
        prop_assert_eq!(map.count(), keys.len());

        map.clear();
        prop_assert_eq!(map.count(), 0);
        prop_assert!(map.is_empty());
    }
}
