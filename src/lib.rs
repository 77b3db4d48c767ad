//! # cmap
//!
//! A concurrent map that splits its key space across a fixed number of
//! shards, each guarded by its own reader/writer lock.
//!
//! Every key is routed to exactly one shard by a partition function (32-bit
//! FNV-1a over the key's `Display` rendering unless you supply another), so
//! callers touching unrelated keys rarely contend for the same lock. No
//! operation ever holds more than one shard lock, which makes the map
//! deadlock-free by construction.
//!
//! ## Features
//!
//! - **Sharded locking**: single-key operations lock one shard only
//! - **Fan-out snapshots**: whole-map reads run one task per shard and merge afterwards
//! - **Incremental iteration**: a bounded queue fed by one producer per shard
//! - **Pluggable partitioning**: FNV-1a, ahash, fxhash, or any `Fn(&K) -> u32`
//! - **Serialization**: JSON out of the box, any [`Codec`] you bring
//!
//! ## Example
//!
//! ```rust
//! use cmap::ConcurrentMap;
//!
//! let map = ConcurrentMap::new();
//!
//! map.set("key1", 1);
//! assert!(!map.set_if_absent("key1", 2));
//! assert_eq!(map.get(&"key1"), Some(1));
//!
//! map.set_many([("key2", 2), ("key3", 3)]);
//! assert_eq!(map.count(), 3);
//!
//! assert_eq!(map.pop(&"key3"), Some(3));
//! map.remove(&"key1");
//! assert!(!map.has(&"key1"));
//!
//! for (key, value) in map.iter_snapshot() {
//!     println!("{}: {}", key, value);
//! }
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use cmap::ConcurrentMapBuilder;
//!
//! let map = ConcurrentMapBuilder::new()
//!     .shard_count(16)
//!     .partition_fn(|key: &u64| (*key % 1024) as u32)
//!     .build::<String>();
//!
//! map.set(7, "seven".to_string());
//! assert_eq!(map.shard_index(&7), 7);
//! ```
//!
//! ## Consistency
//!
//! Operations on a single key are linearizable. Whole-map operations
//! (`count`, `snapshot`, `items`, `keys`, `tuples`, `clear`) lock each shard
//! independently and are therefore only per-shard consistent; see
//! [`ConcurrentMap`] for details.

#![deny(missing_docs)]
#![warn(clippy::all)]

/// Stock upsert and removal callbacks.
pub mod callback;
/// Serialization boundary.
pub mod codec;
/// Configuration and builder types.
pub mod config;
/// Error types.
pub mod error;
/// Partition function implementations.
pub mod hash;
/// Iterator implementations.
pub mod iter;
/// Key contract.
pub mod key;
/// Main ConcurrentMap implementation.
pub mod map;
/// Internal shard implementation.
mod shard;
/// Statistics collection.
pub mod stats;

// Re-export main types
pub use codec::{Codec, JsonCodec};
pub use config::{Config, ConcurrentMapBuilder, HashFunction, DEFAULT_SHARD_COUNT};
pub use error::{BoxError, Error, Result};
pub use iter::{ChannelIter, SnapshotIter, Tuple};
pub use key::ShardKey;
pub use map::ConcurrentMap;
pub use stats::{ShardOps, Stats};
