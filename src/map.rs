use crate::config::Config;
use crate::hash::ShardHasher;
use crate::iter::{ChannelIter, SnapshotIter, Tuple};
use crate::key::ShardKey;
use crate::shard::Shard;
use crate::stats::{ShardOps, Stats};
use rayon::prelude::*;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Concurrent map partitioned into independently locked shards.
///
/// Every key lives in exactly one shard, chosen by the partition function.
/// Single-key operations lock only that shard, so callers working on keys in
/// different shards never block each other. No operation ever holds two shard
/// locks at once, which keeps the map deadlock-free without any lock ordering.
///
/// # Consistency
///
/// Whole-map operations (`count`, `snapshot`, `keys`, `tuples`, `items`,
/// `clear`) visit each shard under that shard's own lock, one after another
/// or in parallel. The result is a union of per-shard point-in-time views:
/// each shard is internally consistent, but different shards may be captured
/// at different moments relative to concurrent writers. There is no global
/// lock and no global instant.
///
/// # Example
///
/// ```rust
/// use cmap::ConcurrentMap;
///
/// let map = ConcurrentMap::new();
/// map.set("key1", 1);
///
/// assert_eq!(map.get(&"key1"), Some(1));
/// assert!(!map.set_if_absent("key1", 2));
/// assert_eq!(map.count(), 1);
/// ```
pub struct ConcurrentMap<K, V> {
    shards: Arc<[Shard<K, V>]>,
    hasher: ShardHasher<K>,
}

impl<K, V> ConcurrentMap<K, V>
where
    K: ShardKey + Send + Sync,
    V: Send + Sync,
{
    /// Create a new map with defaults (32 shards, FNV-1a).
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a new map with custom config.
    pub fn with_config(config: Config<K>) -> Self {
        let capacity = config.capacity_per_shard.unwrap_or(0);
        let shards: Arc<[Shard<K, V>]> = (0..config.shard_count)
            .map(|_| Shard::with_capacity(capacity))
            .collect();

        tracing::debug!(
            shard_count = shards.len(),
            partitioner = ?config.hasher,
            "created concurrent map"
        );

        Self {
            shards,
            hasher: config.hasher,
        }
    }

    /// Number of shards. Fixed for the lifetime of the map.
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Index of the shard `key` belongs to.
    ///
    /// Depends only on the key, the partition function and the shard count.
    #[inline]
    pub fn shard_index(&self, key: &K) -> usize {
        self.hasher.hash_key(key) as usize % self.shards.len()
    }

    #[inline]
    fn shard(&self, key: &K) -> &Shard<K, V> {
        &self.shards[self.shard_index(key)]
    }

    /// Insert or overwrite the value for `key`.
    pub fn set(&self, key: K, value: V) {
        self.shard(&key).set(key, value);
    }

    /// Insert `value` only if `key` is absent. Returns whether it was stored;
    /// an existing value is left untouched.
    pub fn set_if_absent(&self, key: K, value: V) -> bool {
        self.shard(&key).set_if_absent(key, value)
    }

    /// Insert or update through a combining function and return the stored value.
    ///
    /// `combine` receives the current value (`None` when absent) and `value`,
    /// and its result is stored. It runs while the shard's exclusive lock is
    /// held: it must not call back into this map (the lock is not reentrant and
    /// the call will deadlock) and it should not block. If it panics, the
    /// shard is unlocked and left unchanged.
    ///
    /// # Example
    ///
    /// ```rust
    /// use cmap::ConcurrentMap;
    ///
    /// let map = ConcurrentMap::new();
    /// let add = |old: Option<&i32>, new: i32| old.map_or(new, |o| o + new);
    /// assert_eq!(map.upsert("hits", 1, add), 1);
    /// assert_eq!(map.upsert("hits", 1, add), 2);
    /// ```
    pub fn upsert<F>(&self, key: K, value: V, combine: F) -> V
    where
        F: FnOnce(Option<&V>, V) -> V,
        V: Clone,
    {
        self.shard(&key).upsert(key, value, combine)
    }

    /// Get a copy of the value for `key`.
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.shard(key).get(key)
    }

    /// Remove `key` and return the value it held.
    pub fn pop(&self, key: &K) -> Option<V> {
        self.shard(key).pop(key)
    }

    /// Check whether `key` is present.
    pub fn has(&self, key: &K) -> bool {
        self.shard(key).contains_key(key)
    }

    /// Remove `key`. Absent keys are ignored.
    pub fn remove(&self, key: &K) {
        self.shard(key).remove(key)
    }

    /// Remove `key` if `predicate` approves, returning the predicate's verdict.
    ///
    /// The predicate sees the key and its current value (`None` when absent)
    /// under the shard's exclusive lock, with the same restrictions as
    /// [`upsert`](Self::upsert). The entry is removed only when the verdict is
    /// `true` and the key exists. The verdict is returned as-is, so `true` does
    /// not by itself mean something was removed.
    ///
    /// ```rust
    /// use cmap::ConcurrentMap;
    ///
    /// let map: ConcurrentMap<&str, i32> = ConcurrentMap::new();
    /// // Nothing to remove, but the predicate said yes.
    /// assert!(map.remove_if(&"missing", |_, _| true));
    /// ```
    pub fn remove_if<F>(&self, key: &K, predicate: F) -> bool
    where
        F: FnOnce(&K, Option<&V>) -> bool,
    {
        self.shard(key).remove_if(key, predicate)
    }

    /// Set every pair. Not atomic: concurrent readers may observe a prefix.
    pub fn set_many<I>(&self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in pairs {
            self.set(key, value);
        }
    }

    /// Total number of entries.
    ///
    /// Each shard is locked briefly and independently, so under concurrent
    /// writers this is an approximation rather than a linearizable total.
    pub fn count(&self) -> usize {
        self.shards.par_iter().map(|shard| shard.len()).sum()
    }

    /// `count() == 0`.
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Copy every entry out of the map.
    ///
    /// One task per shard exports that shard under its shared lock into its
    /// own buffer. The buffers are concatenated once every task has finished.
    pub fn snapshot(&self) -> Vec<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        let buffers: Vec<Vec<(K, V)>> = self
            .shards
            .par_iter()
            .map(|shard| shard.export_all())
            .collect();

        let total = buffers.iter().map(Vec::len).sum();
        let mut entries = Vec::with_capacity(total);
        for buffer in buffers {
            entries.extend(buffer);
        }
        entries
    }

    /// Iterate over a snapshot taken now.
    ///
    /// # Example
    ///
    /// ```rust
    /// use cmap::ConcurrentMap;
    ///
    /// let map = ConcurrentMap::new();
    /// map.set("key1", "value1");
    /// map.set("key2", "value2");
    ///
    /// assert_eq!(map.iter_snapshot().count(), 2);
    /// ```
    pub fn iter_snapshot(&self) -> SnapshotIter<K, V>
    where
        K: Clone,
        V: Clone,
    {
        SnapshotIter::new(self.snapshot())
    }

    /// Iterate incrementally through a bounded queue fed by one producer
    /// thread per shard.
    ///
    /// Entries arrive as producers push them; the iterator ends when all
    /// shards are drained. If the iterator is kept alive but not drained,
    /// producers stay blocked on the full queue until it is dropped.
    ///
    /// ```rust
    /// use cmap::ConcurrentMap;
    ///
    /// let map = ConcurrentMap::new();
    /// map.set("key2".to_string(), 2);
    ///
    /// for tuple in map.iter_async() {
    ///     assert_eq!(tuple.key, "key2");
    ///     assert_eq!(tuple.value, 2);
    /// }
    /// ```
    pub fn iter_async(&self) -> ChannelIter<K, V>
    where
        K: Clone + 'static,
        V: Clone + 'static,
    {
        ChannelIter::spawn(&self.shards, self.shards.len())
    }

    /// Visit every entry, shard by shard, while that shard's shared lock is
    /// held. `f` must not write to this map.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&K, &V),
    {
        for shard in self.shards.iter() {
            shard.for_each(&mut f);
        }
    }

    /// Materialize a snapshot as a `HashMap`.
    pub fn items(&self) -> HashMap<K, V>
    where
        K: Clone,
        V: Clone,
    {
        self.snapshot().into_iter().collect()
    }

    /// All keys currently stored.
    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        // Capacity hint only; the map may change before collection finishes.
        let mut keys = Vec::with_capacity(self.count());
        let buffers: Vec<Vec<K>> = self
            .shards
            .par_iter()
            .map(|shard| shard.export_keys())
            .collect();
        for buffer in buffers {
            keys.extend(buffer);
        }
        keys
    }

    /// All entries as [`Tuple`]s.
    pub fn tuples(&self) -> Vec<Tuple<K, V>>
    where
        K: Clone,
        V: Clone,
    {
        let mut tuples = Vec::with_capacity(self.count());
        let buffers: Vec<Vec<(K, V)>> = self
            .shards
            .par_iter()
            .map(|shard| shard.export_all())
            .collect();
        for buffer in buffers {
            tuples.extend(buffer.into_iter().map(Tuple::from));
        }
        tuples
    }

    /// Remove every key present in a snapshot taken now.
    ///
    /// Not atomic: keys written concurrently may survive, so the map is only
    /// guaranteed empty afterwards when no writer ran during the call.
    pub fn clear(&self)
    where
        K: Clone,
    {
        let keys = self.keys();
        for key in &keys {
            self.remove(key);
        }
        tracing::debug!(removed = keys.len(), "cleared concurrent map");
    }

    /// Bulk-insert a mapping. Same semantics as [`set_many`](Self::set_many).
    pub fn import_from_mapping<I>(&self, mapping: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        self.set_many(mapping);
    }

    /// Export the contents as a `HashMap`. Same semantics as [`items`](Self::items).
    pub fn export_to_mapping(&self) -> HashMap<K, V>
    where
        K: Clone,
        V: Clone,
    {
        self.items()
    }

    /// Number of entries in each shard.
    pub fn shard_sizes(&self) -> Vec<usize> {
        self.shards.iter().map(|shard| shard.len()).collect()
    }

    /// Get detailed statistics about the map and its shards.
    pub fn stats(&self) -> Stats {
        let shard_sizes = self.shard_sizes();
        let operations: Vec<ShardOps> = self.shards.iter().map(|s| s.stats()).collect();
        let size: usize = shard_sizes.iter().sum();

        Stats {
            size,
            shard_sizes,
            operations,
        }
    }
}

impl<K, V> Default for ConcurrentMap<K, V>
where
    K: ShardKey + Send + Sync,
    V: Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for ConcurrentMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcurrentMap")
            .field("shard_count", &self.shards.len())
            .field("partitioner", &self.hasher)
            .finish()
    }
}

impl<K, V> FromIterator<(K, V)> for ConcurrentMap<K, V>
where
    K: ShardKey + Send + Sync,
    V: Send + Sync,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let map = Self::new();
        map.set_many(iter);
        map
    }
}
