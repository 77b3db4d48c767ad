use crate::stats::ShardStats;
use hashbrown::HashMap;
use parking_lot::RwLock;
use std::hash::Hash;

/// A single shard: a HashMap and the read-write lock guarding it.
///
/// Every method takes the lock for exactly its own duration. parking_lot
/// guards release on unwind, so a panicking callback never leaves the shard
/// locked and never poisons it.
pub(crate) struct Shard<K, V> {
    map: RwLock<HashMap<K, V>>,
    stats: ShardStats,
}

impl<K, V> Shard<K, V>
where
    K: Hash + Eq,
{
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: RwLock::new(HashMap::with_capacity(capacity)),
            stats: ShardStats::new(),
        }
    }

    /// Get a copy of the value stored under `key`.
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        let map = self.map.read();
        let result = map.get(key).cloned();
        if result.is_some() {
            self.stats.record_read();
        }
        result
    }

    /// Insert or overwrite.
    pub fn set(&self, key: K, value: V) {
        let mut map = self.map.write();
        map.insert(key, value);
        self.stats.record_write();
    }

    /// Insert only if `key` is absent. Returns whether the value was stored.
    pub fn set_if_absent(&self, key: K, value: V) -> bool {
        let mut map = self.map.write();
        if map.contains_key(&key) {
            return false;
        }
        map.insert(key, value);
        self.stats.record_write();
        true
    }

    /// Store `combine(existing, value)` under `key` and return it.
    ///
    /// `combine` runs with the exclusive lock held. If it panics the shard is
    /// left exactly as it was before the call.
    pub fn upsert<F>(&self, key: K, value: V, combine: F) -> V
    where
        F: FnOnce(Option<&V>, V) -> V,
        V: Clone,
    {
        let mut map = self.map.write();
        let combined = combine(map.get(&key), value);
        map.insert(key, combined.clone());
        self.stats.record_write();
        combined
    }

    /// Delete `key` if present.
    pub fn remove(&self, key: &K) {
        let mut map = self.map.write();
        if map.remove(key).is_some() {
            self.stats.record_remove();
        }
    }

    /// Evaluate `predicate` on the current entry and remove it when the
    /// verdict is true and the key exists.
    ///
    /// Returns the predicate's verdict, which is `true` even when the key was
    /// absent and nothing was removed.
    pub fn remove_if<F>(&self, key: &K, predicate: F) -> bool
    where
        F: FnOnce(&K, Option<&V>) -> bool,
    {
        let mut map = self.map.write();
        let existing = map.get(key);
        let existed = existing.is_some();
        let verdict = predicate(key, existing);
        if verdict && existed {
            map.remove(key);
            self.stats.record_remove();
        }
        verdict
    }

    /// Remove `key` and return its value.
    pub fn pop(&self, key: &K) -> Option<V> {
        let mut map = self.map.write();
        let result = map.remove(key);
        if result.is_some() {
            self.stats.record_remove();
        }
        result
    }

    /// Check if a key exists without cloning the value.
    pub fn contains_key(&self, key: &K) -> bool {
        self.map.read().contains_key(key)
    }

    /// Get the number of entries in this shard.
    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    /// Copy every entry out under the shared lock.
    pub fn export_all(&self) -> Vec<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        let map = self.map.read();
        map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    /// Copy every key out under the shared lock.
    pub fn export_keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.map.read().keys().cloned().collect()
    }

    /// Visit every entry while holding the shared lock.
    pub fn for_each<F>(&self, f: &mut F)
    where
        F: FnMut(&K, &V),
    {
        let map = self.map.read();
        for (k, v) in map.iter() {
            f(k, v);
        }
    }

    /// Get a snapshot of statistics for this shard.
    pub fn stats(&self) -> crate::stats::ShardOps {
        self.stats.snapshot()
    }
}

impl<K, V> Default for Shard<K, V>
where
    K: Hash + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}
