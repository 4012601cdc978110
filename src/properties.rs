//! The dynamic per-node property store.
//!
//! Every node instance owns one [`PropertyBag`] holding the current value of
//! each declared input and output parameter, plus whatever extra entries a
//! host editor chooses to stash alongside them. The bag is schema-less: keys
//! are plain strings and values are [`Value`]s, with no validation against
//! the owning operation's parameter list.

use crate::codec::wire::{ByteReader, ByteWriter};
use crate::error::CodecError;
use crate::value::Value;
use ahash::AHashMap;

/// An insertion-ordered string-to-value map with unique keys.
#[derive(Debug, Clone, Default)]
pub struct PropertyBag {
    entries: Vec<(String, Value)>,
    index: AHashMap<String, usize>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the current value under `key`. Absent keys are not an error;
    /// callers treat a missing entry as null.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    /// Inserts or overwrites `key`. Overwriting keeps the key's original
    /// position in insertion order.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match self.index.get(&key) {
            Some(&i) => self.entries[i].1 = value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// All keys, in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// All entries, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    /// Serializes the bag as a sequence of `(key, i32 length, value bytes)`
    /// records. Entries whose value is not serializable (execution markers)
    /// are skipped without an error.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        for (key, value) in &self.entries {
            if !value.is_serializable() {
                continue;
            }
            let mut vw = ByteWriter::new();
            value.encode(&mut vw);
            w.string(key);
            w.block(&vw.into_bytes());
        }
        w.into_bytes()
    }

    /// Clears the bag, then reads records until the buffer is exhausted,
    /// inserting entries in stream order. A record that truncates mid-way
    /// fails with `CodecError::Corrupt`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut bag = Self::new();
        let mut r = ByteReader::new(bytes);
        while !r.is_empty() {
            let key = r.string()?;
            let payload = r.block()?;
            // Bytes past the decoded value within a record belong to a newer
            // writer; they are skipped by slicing the record up front.
            let value = Value::decode(&mut ByteReader::new(payload))?;
            bag.set(key, value);
        }
        Ok(bag)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for PropertyBag {
    fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
        let mut bag = Self::new();
        for (key, value) in iter {
            bag.set(key, value);
        }
        bag
    }
}
