use crate::key::ShardKey;
use std::fmt::{self, Write};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

/// User-supplied partition function: maps a key to a 32-bit hash that the
/// map reduces modulo its shard count.
pub type PartitionFn<K> = Arc<dyn Fn(&K) -> u32 + Send + Sync>;

/// 32-bit FNV-1a over a byte slice.
///
/// ```rust
/// assert_eq!(cmap::hash::fnv1a_32(b""), 0x811c9dc5);
/// assert_eq!(cmap::hash::fnv1a_32(b"a"), 0xe40c292c);
/// ```
pub fn fnv1a_32(bytes: &[u8]) -> u32 {
    let mut hasher = Fnv1a::new();
    hasher.update(bytes);
    hasher.0
}

/// Streaming FNV-1a state. Implements `fmt::Write` so a key's `Display`
/// output is hashed without building an intermediate `String`.
struct Fnv1a(u32);

impl Fnv1a {
    fn new() -> Self {
        Fnv1a(FNV_OFFSET_BASIS)
    }

    #[inline]
    fn update(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.0 ^= u32::from(byte);
            self.0 = self.0.wrapping_mul(FNV_PRIME);
        }
    }
}

impl fmt::Write for Fnv1a {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.update(s.as_bytes());
        Ok(())
    }
}

/// Partition function used for shard assignment.
/// An enum keeps the built-in hashers free of dynamic dispatch.
pub enum ShardHasher<K> {
    /// FNV-1a over the key's string rendering (default).
    Fnv1a,
    /// ahash over the key's `Hash` impl, truncated to 32 bits.
    AHash,
    /// fxhash over the key's `Hash` impl, truncated to 32 bits.
    #[cfg(feature = "fxhash")]
    FxHash,
    /// Caller-supplied function.
    Custom(PartitionFn<K>),
}

impl<K: ShardKey> ShardHasher<K> {
    /// Hash a key to determine which shard it belongs to.
    pub fn hash_key(&self, key: &K) -> u32 {
        match self {
            ShardHasher::Fnv1a => {
                let mut hasher = Fnv1a::new();
                // A Display impl that errors leaves a partial, still deterministic, hash.
                let _ = write!(hasher, "{}", key);
                hasher.0
            }
            ShardHasher::AHash => {
                let mut hasher = ahash::AHasher::default();
                key.hash(&mut hasher);
                hasher.finish() as u32
            }
            #[cfg(feature = "fxhash")]
            ShardHasher::FxHash => {
                let mut hasher = fxhash::FxHasher32::default();
                key.hash(&mut hasher);
                hasher.finish() as u32
            }
            ShardHasher::Custom(f) => f(key),
        }
    }
}

impl<K> Default for ShardHasher<K> {
    fn default() -> Self {
        ShardHasher::Fnv1a
    }
}

impl<K> Clone for ShardHasher<K> {
    fn clone(&self) -> Self {
        match self {
            ShardHasher::Fnv1a => ShardHasher::Fnv1a,
            ShardHasher::AHash => ShardHasher::AHash,
            #[cfg(feature = "fxhash")]
            ShardHasher::FxHash => ShardHasher::FxHash,
            ShardHasher::Custom(f) => ShardHasher::Custom(Arc::clone(f)),
        }
    }
}

impl<K> fmt::Debug for ShardHasher<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShardHasher::Fnv1a => write!(f, "Fnv1a"),
            ShardHasher::AHash => write!(f, "AHash"),
            #[cfg(feature = "fxhash")]
            ShardHasher::FxHash => write!(f, "FxHash"),
            ShardHasher::Custom(_) => write!(f, "Custom(...)"),
        }
    }
}
