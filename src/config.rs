use crate::hash::{PartitionFn, ShardHasher};
use crate::key::ShardKey;
use std::sync::Arc;

/// Number of shards used when none (or zero) is requested.
pub const DEFAULT_SHARD_COUNT: usize = 32;

/// Which built-in hash function to use for shard assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashFunction {
    /// FNV-1a over the key's string rendering (default).
    #[default]
    Fnv1a,
    /// ahash over the key's `Hash` impl.
    AHash,
    /// fxhash over the key's `Hash` impl.
    #[cfg(feature = "fxhash")]
    FxHash,
}

/// Configuration for a ConcurrentMap instance.
///
/// Options are applied in the order they are set: a later `hash_function`
/// or `partition_fn` call replaces whatever partitioning an earlier call chose.
#[derive(Debug)]
pub struct Config<K> {
    pub(crate) shard_count: usize,
    pub(crate) hasher: ShardHasher<K>,
    pub(crate) capacity_per_shard: Option<usize>,
}

impl<K> Config<K> {
    /// Create a new config with defaults (32 shards, FNV-1a).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of shards. Zero is ignored and keeps the current value.
    pub fn shard_count(mut self, count: usize) -> Self {
        if count > 0 {
            self.shard_count = count;
        }
        self
    }

    /// Use one of the built-in hash functions.
    pub fn hash_function(mut self, hash_fn: HashFunction) -> Self {
        self.hasher = create_hasher(hash_fn);
        self
    }

    /// Use a caller-supplied partition function. The returned hash is reduced
    /// modulo the shard count.
    ///
    /// The function must be pure: it is fixed for the lifetime of the map and
    /// placement of existing entries depends on it.
    pub fn partition_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&K) -> u32 + Send + Sync + 'static,
    {
        self.hasher = ShardHasher::Custom(Arc::new(f) as PartitionFn<K>);
        self
    }

    /// Set initial capacity per shard. Omitted by default (HashMap default).
    pub fn capacity_per_shard(mut self, capacity: usize) -> Self {
        self.capacity_per_shard = Some(capacity);
        self
    }
}

impl<K> Default for Config<K> {
    fn default() -> Self {
        Self {
            shard_count: DEFAULT_SHARD_COUNT,
            hasher: ShardHasher::Fnv1a,
            capacity_per_shard: None,
        }
    }
}

/// Builder for creating a ConcurrentMap with custom configuration.
///
/// ```rust
/// use cmap::{ConcurrentMapBuilder, HashFunction};
///
/// let map = ConcurrentMapBuilder::new()
///     .shard_count(16)
///     .hash_function(HashFunction::AHash)
///     .build::<i32>();
///
/// map.set("answer".to_string(), 42);
/// assert_eq!(map.shard_count(), 16);
/// ```
pub struct ConcurrentMapBuilder<K> {
    config: Config<K>,
}

impl<K> ConcurrentMapBuilder<K> {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Set the number of shards. Zero is ignored.
    pub fn shard_count(mut self, count: usize) -> Self {
        self.config = self.config.shard_count(count);
        self
    }

    /// Set the hash function to use.
    pub fn hash_function(mut self, hash_fn: HashFunction) -> Self {
        self.config = self.config.hash_function(hash_fn);
        self
    }

    /// Use a custom partition function.
    pub fn partition_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&K) -> u32 + Send + Sync + 'static,
    {
        self.config = self.config.partition_fn(f);
        self
    }

    /// Set initial capacity per shard.
    pub fn capacity_per_shard(mut self, capacity: usize) -> Self {
        self.config = self.config.capacity_per_shard(capacity);
        self
    }

    /// Build a ConcurrentMap with the configured settings.
    pub fn build<V>(self) -> crate::ConcurrentMap<K, V>
    where
        K: ShardKey + Send + Sync,
        V: Send + Sync,
    {
        crate::ConcurrentMap::with_config(self.config)
    }
}

impl<K> Default for ConcurrentMapBuilder<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a hasher instance for a built-in hash function.
pub(crate) fn create_hasher<K>(hash_fn: HashFunction) -> ShardHasher<K> {
    match hash_fn {
        HashFunction::Fnv1a => ShardHasher::Fnv1a,
        HashFunction::AHash => ShardHasher::AHash,
        #[cfg(feature = "fxhash")]
        HashFunction::FxHash => ShardHasher::FxHash,
    }
}
