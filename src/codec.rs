//! Serialization boundary.
//!
//! A [`Codec`] turns an exported key/value mapping into bytes and back. The
//! map never decodes incrementally: a payload is decoded in full before any
//! entry is inserted, so a malformed payload leaves the map untouched.

use crate::error::{Error, Result};
use crate::key::ShardKey;
use crate::map::ConcurrentMap;
use serde::de::{DeserializeOwned, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

/// Encodes and decodes a key/value mapping.
pub trait Codec<K, V> {
    /// Encode a mapping into bytes.
    fn encode(&self, mapping: &HashMap<K, V>) -> Result<Vec<u8>>;

    /// Decode bytes into a mapping. Malformed input yields [`Error::Decode`].
    fn decode(&self, bytes: &[u8]) -> Result<HashMap<K, V>>;
}

/// JSON object codec backed by serde_json.
///
/// Keys become JSON object keys, so they must serialize as strings or
/// integers.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl<K, V> Codec<K, V> for JsonCodec
where
    K: Serialize + DeserializeOwned + Hash + Eq,
    V: Serialize + DeserializeOwned,
{
    fn encode(&self, mapping: &HashMap<K, V>) -> Result<Vec<u8>> {
        serde_json::to_vec(mapping).map_err(Error::encode)
    }

    fn decode(&self, bytes: &[u8]) -> Result<HashMap<K, V>> {
        serde_json::from_slice(bytes).map_err(Error::decode)
    }
}

impl<K, V> ConcurrentMap<K, V>
where
    K: ShardKey + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    /// Export the map and encode it with `codec`.
    pub fn encode_with<C>(&self, codec: &C) -> Result<Vec<u8>>
    where
        C: Codec<K, V>,
    {
        codec.encode(&self.export_to_mapping())
    }

    /// Decode `bytes` with `codec` and bulk-insert the result.
    ///
    /// Decode errors are returned unchanged and nothing is inserted.
    pub fn decode_from<C>(&self, codec: &C, bytes: &[u8]) -> Result<()>
    where
        C: Codec<K, V>,
    {
        let mapping = match codec.decode(bytes) {
            Ok(mapping) => mapping,
            Err(err) => {
                tracing::warn!(error = %err, len = bytes.len(), "failed to decode map payload");
                return Err(err);
            }
        };
        let entries = mapping.len();
        self.import_from_mapping(mapping);
        tracing::debug!(entries, "imported decoded entries");
        Ok(())
    }

    /// Encode the map as a JSON object.
    ///
    /// ```rust
    /// use cmap::ConcurrentMap;
    ///
    /// let map = ConcurrentMap::new();
    /// map.set("key2".to_string(), 2);
    /// assert_eq!(map.to_json().unwrap(), br#"{"key2":2}"#);
    /// ```
    pub fn to_json(&self) -> Result<Vec<u8>>
    where
        K: Serialize + DeserializeOwned,
        V: Serialize + DeserializeOwned,
    {
        self.encode_with(&JsonCodec)
    }

    /// Decode a JSON object and insert its entries.
    pub fn extend_from_json(&self, bytes: &[u8]) -> Result<()>
    where
        K: Serialize + DeserializeOwned,
        V: Serialize + DeserializeOwned,
    {
        self.decode_from(&JsonCodec, bytes)
    }
}

impl<K, V> Serialize for ConcurrentMap<K, V>
where
    K: ShardKey + Clone + Send + Sync + Serialize,
    V: Clone + Send + Sync + Serialize,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let entries = self.snapshot();
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (k, v) in &entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct ConcurrentMapVisitor<K, V> {
    marker: PhantomData<fn() -> ConcurrentMap<K, V>>,
}

impl<'de, K, V> Visitor<'de> for ConcurrentMapVisitor<K, V>
where
    K: ShardKey + Send + Sync + Deserialize<'de>,
    V: Send + Sync + Deserialize<'de>,
{
    type Value = ConcurrentMap<K, V>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A>(self, mut access: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        // Buffer first so a failure halfway through does not hand back a partial map.
        let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, value)) = access.next_entry()? {
            entries.push((key, value));
        }
        Ok(entries.into_iter().collect())
    }
}

/// Deserializes into a map with the default configuration.
impl<'de, K, V> Deserialize<'de> for ConcurrentMap<K, V>
where
    K: ShardKey + Send + Sync + Deserialize<'de>,
    V: Send + Sync + Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(ConcurrentMapVisitor {
            marker: PhantomData,
        })
    }
}
