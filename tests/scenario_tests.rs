//! End-to-end walk through the basic map lifecycle on a 16-shard map.

use cmap::ConcurrentMapBuilder;
use std::collections::HashMap;

#[test]
fn test_sixteen_shard_lifecycle() {
    let map = ConcurrentMapBuilder::new().shard_count(16).build::<i32>();
    let key = |s: &str| s.to_string();

    assert_eq!(map.count(), 0);
    assert_eq!(map.shard_count(), 16);
    assert!(map.is_empty());

    map.set(key("key1"), 1);
    assert_eq!(map.count(), 1);

    assert!(!map.set_if_absent(key("key1"), 2));
    assert_eq!(map.get(&key("key1")), Some(1));
    assert!(!map.is_empty());

    map.set_many([(key("key2"), 2), (key("key3"), 3)]);
    assert_eq!(map.count(), 3);
    assert_eq!(map.get(&key("key2")), Some(2));

    assert_eq!(map.pop(&key("key3")), Some(3));
    assert_eq!(map.count(), 2);

    assert!(map.has(&key("key1")));
    map.remove(&key("key1"));
    assert!(!map.has(&key("key1")));

    let items = map.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items, HashMap::from([(key("key2"), 2)]));
    assert_eq!(map.keys(), vec![key("key2")]);

    for tuple in map.iter_async() {
        assert_eq!(tuple.key, "key2");
        assert_eq!(tuple.value, 2);
    }

    map.clear();
    assert!(map.is_empty());
}
