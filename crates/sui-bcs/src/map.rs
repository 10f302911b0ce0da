//! Canonical map encoding.
//!
//! Two maps holding the same entries must encode to the same bytes no matter
//! the order they were filled in. Entries are sorted by their encoded key
//! bytes (ties broken by encoded value bytes) before they are written.

use crate::error::DecodeResult;
use crate::serializer::{to_bytes, Deserializable, Deserializer, Serializable, Serializer};

/// Insertion-ordered map whose encoding is order independent.
///
/// Keys only need `PartialEq`; canonical order comes from the encoded bytes,
/// not from an `Ord` impl on the key type.
#[derive(Debug, Clone)]
pub struct BcsMap<K, V> {
    entries: Vec<(K, V)>,
}

impl<K, V> Default for BcsMap<K, V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<K: PartialEq, V> BcsMap<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace, returning the previous value for `key`.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }
}

impl<K: PartialEq, V> FromIterator<(K, V)> for BcsMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = BcsMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// Maps compare as sets of entries, ignoring insertion order.
impl<K: PartialEq, V: PartialEq> PartialEq for BcsMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|ov| ov == v))
    }
}

impl<K: Serializable, V: Serializable> BcsMap<K, V> {
    /// Encoded `(key, value)` pairs in canonical order.
    pub fn sorted_entry_bytes(&self) -> Vec<(Vec<u8>, Vec<u8>)> {
        let mut encoded: Vec<(Vec<u8>, Vec<u8>)> = self
            .entries
            .iter()
            .map(|(k, v)| (to_bytes(k), to_bytes(v)))
            .collect();
        encoded.sort();
        encoded
    }
}

impl<K, V> BcsMap<K, V>
where
    K: Serializable + Deserializable + PartialEq,
    V: Serializable + Deserializable,
{
    /// Decoding trusts entry order. Callers that need to know the bytes
    /// were canonical re-encode and compare.
    pub fn is_canonical_encoding(bytes: &[u8]) -> DecodeResult<bool> {
        let map: Self = crate::serializer::from_bytes(bytes)?;
        Ok(to_bytes(&map) == bytes)
    }
}

impl<K: Serializable, V: Serializable> Serializable for BcsMap<K, V> {
    fn serialize(&self, ser: &mut Serializer) {
        let entries = self.sorted_entry_bytes();
        ser.write_uleb128(entries.len() as u64);
        for (key, value) in entries {
            ser.write_fixed_bytes(&key);
            ser.write_fixed_bytes(&value);
        }
    }
}

impl<K, V> Deserializable for BcsMap<K, V>
where
    K: Deserializable + PartialEq,
    V: Deserializable,
{
    fn deserialize(de: &mut Deserializer<'_>) -> DecodeResult<Self> {
        let count = de.read_length()?;
        de.check_count(count, 1)?;
        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            let key = K::deserialize(de)?;
            let value = V::deserialize(de)?;
            entries.push((key, value));
        }
        Ok(Self { entries })
    }
}
