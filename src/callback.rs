//! Stock callbacks for [`upsert`](crate::ConcurrentMap::upsert) and
//! [`remove_if`](crate::ConcurrentMap::remove_if).

/// Upsert combiner that keeps an existing value and stores `new` only when
/// the key is absent. Equivalent to `set_if_absent` followed by `get`.
pub fn keep_existing<V: Clone>(existing: Option<&V>, new: V) -> V {
    match existing {
        Some(value) => value.clone(),
        None => new,
    }
}

/// Upsert combiner that always stores `new`. Equivalent to `set`.
pub fn replace_existing<V>(_existing: Option<&V>, new: V) -> V {
    new
}

/// Removal predicate that approves whenever the key exists.
pub fn if_exists<K, V>(_key: &K, value: Option<&V>) -> bool {
    value.is_some()
}
