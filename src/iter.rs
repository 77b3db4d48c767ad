use crate::shard::Shard;
use serde::{Deserialize, Serialize};
use std::hash::Hash;
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::Arc;
use std::thread;

/// A key-value pair produced by iteration or export. Never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tuple<K, V> {
    /// The entry's key.
    pub key: K,
    /// The entry's value.
    pub value: V,
}

impl<K, V> From<(K, V)> for Tuple<K, V> {
    fn from((key, value): (K, V)) -> Self {
        Tuple { key, value }
    }
}

impl<K, V> From<Tuple<K, V>> for (K, V) {
    fn from(tuple: Tuple<K, V>) -> Self {
        (tuple.key, tuple.value)
    }
}

/// Snapshot-based iterator over entries captured up front.
///
/// Each shard was captured at its own instant, so the iterator reflects N
/// per-shard point-in-time views rather than one global instant.
pub struct SnapshotIter<K, V> {
    entries: std::vec::IntoIter<(K, V)>,
}

impl<K, V> SnapshotIter<K, V> {
    pub(crate) fn new(entries: Vec<(K, V)>) -> Self {
        Self {
            entries: entries.into_iter(),
        }
    }
}

impl<K, V> Iterator for SnapshotIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<K, V> ExactSizeIterator for SnapshotIter<K, V> {}

/// Incremental iterator fed by one producer thread per shard through a
/// bounded queue.
///
/// Each producer copies its shard out under the shared lock, releases it, then
/// pushes entries one at a time. The iterator ends once every producer has
/// finished. It cannot be restarted.
///
/// Producers block while the queue is full. Holding this iterator without
/// draining it keeps those threads parked for as long as it lives; dropping it
/// disconnects the queue and lets them exit.
pub struct ChannelIter<K, V> {
    rx: Receiver<Tuple<K, V>>,
}

impl<K, V> ChannelIter<K, V>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub(crate) fn spawn(shards: &Arc<[Shard<K, V>]>, capacity: usize) -> Self {
        let (tx, rx) = mpsc::sync_channel(capacity);
        for index in 0..shards.len() {
            let shards = Arc::clone(shards);
            let tx = tx.clone();
            thread::spawn(move || produce(&shards[index], index, tx));
        }
        // The last sender lives in the producers; the channel closes when they finish.
        drop(tx);
        Self { rx }
    }
}

fn produce<K, V>(shard: &Shard<K, V>, index: usize, tx: SyncSender<Tuple<K, V>>)
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    for entry in shard.export_all() {
        if tx.send(entry.into()).is_err() {
            tracing::trace!(shard = index, "iterator dropped, producer stopping");
            return;
        }
    }
}

impl<K, V> Iterator for ChannelIter<K, V> {
    type Item = Tuple<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rx.recv().ok()
    }
}
