//! Fill a 16-shard map with 100000 integer keys routed by a hand-written
//! FNV hash, then clear it.

use cmap::ConcurrentMapBuilder;

fn fnv32(key: &i64) -> u32 {
    let mut hash: u32 = 2_166_136_261;
    for byte in key.to_string().bytes() {
        hash = hash.wrapping_mul(16_777_619);
        hash ^= u32::from(byte);
    }
    hash
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let map = ConcurrentMapBuilder::new()
        .shard_count(16)
        .partition_fn(fnv32)
        .build::<i64>();

    for i in 0..100_000 {
        map.set(i, i);
    }
    println!("concurrent map count: {}", map.count());

    map.clear();
    println!("after clear concurrent map count: {}", map.count());
}
