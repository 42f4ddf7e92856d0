//! Response definitions
//!
//! Typed results built from the server's replies.

use std::collections::HashMap;

use bytes::Bytes;

/// An item returned by `get` / `gets`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Value bytes, trailing CRLF removed
    pub value: Bytes,

    /// Opaque application flags, round-tripped by the server
    pub flags: u32,

    /// CAS token, present when the server sent one (`gets`)
    pub cas: Option<u64>,
}

/// Parsed `VALUE <key> <flags> <bytes> [<cas unique>]` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueHeader {
    pub key: String,
    pub flags: u32,
    pub len: usize,
    pub cas: Option<u64>,
}

/// Key/value pairs from a `stats` response, in the order the server sent them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    entries: Vec<(String, String)>,

    /// Position of each name in `entries`
    index: HashMap<String, usize>,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pair. A repeated key keeps its first position and takes the new value.
    pub fn insert(&mut self, key: String, value: String) {
        match self.index.get(&key) {
            Some(&pos) => self.entries[pos].1 = value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.index.get(key).map(|&pos| self.entries[pos].1.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl IntoIterator for Stats {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
