//! Ordered dictionary type for VBS values.
//!
//! This module provides [`Dict`], a wrapper around [`IndexMap`] that keeps
//! entries in insertion order, and [`Key`], the scalar key type.
//!
//! ## Why IndexMap?
//!
//! A VBS dictionary is written entry by entry, in the order the caller
//! produces them. Replaying a `Dict` must therefore reproduce insertion
//! order exactly; `IndexMap` gives that with hash lookups.
//!
//! ## Examples
//!
//! ```rust
//! use vbs_writer::{Dict, Key, Value};
//!
//! let mut dict = Dict::new();
//! dict.insert("name", Value::from("Alice"));
//! dict.insert(7, Value::from(true));
//!
//! assert_eq!(dict.len(), 2);
//! assert_eq!(dict.get("name").and_then(|v| v.as_str()), Some("Alice"));
//! assert_eq!(dict.get(&7i64).and_then(|v| v.as_bool()), Some(true));
//! assert_eq!(dict.keys().next(), Some(&Key::from("name")));
//! ```

use crate::pack::VBS_DICT;
use crate::value::{check_brackets, encode_to_vec, Encoding};
use crate::{Pack, Result, Sink, Value};
use indexmap::{Equivalent, IndexMap};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A dictionary key: VBS keys are integers or strings.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Key {
    Integer(i64),
    String(String),
}

impl Hash for Key {
    // Hashes like the bare payload so `str` and `i64` lookups agree.
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Key::Integer(i) => i.hash(state),
            Key::String(s) => s.hash(state),
        }
    }
}

impl Equivalent<Key> for str {
    fn equivalent(&self, key: &Key) -> bool {
        matches!(key, Key::String(s) if s == self)
    }
}

impl Equivalent<Key> for i64 {
    fn equivalent(&self, key: &Key) -> bool {
        matches!(key, Key::Integer(i) if i == self)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Integer(i) => write!(f, "{i}"),
            Key::String(s) => write!(f, "{s:?}"),
        }
    }
}

impl Pack for Key {
    fn pack<S: Sink + ?Sized>(&self, sink: &mut S) {
        match self {
            Key::Integer(i) => sink.emit_integer(*i),
            Key::String(s) => sink.emit_string(s.as_bytes()),
        }
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::String(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::String(value)
    }
}

macro_rules! key_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Key {
                fn from(value: $ty) -> Self {
                    Key::Integer(i64::from(value))
                }
            }
        )*
    };
}

key_from_integer!(i8, i16, i32, i64, u8, u16, u32);

/// An insertion-ordered dictionary of VBS values, optionally carrying its
/// own encoding.
///
/// Like [`List`](crate::List), an attached encoding is written verbatim and
/// is dropped by any mutation.
#[derive(Debug, Clone, Default)]
pub struct Dict {
    entries: IndexMap<Key, Value>,
    encoded: Option<Encoding>,
}

impl Dict {
    #[must_use]
    pub fn new() -> Self {
        Dict::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Dict {
            entries: IndexMap::with_capacity(capacity),
            encoded: None,
        }
    }

    /// Adopts an encoded dict alongside the entries it decodes to.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRaw`](crate::Error::InvalidRaw) unless
    /// `encoded` starts with DICT and ends with TAIL.
    pub fn from_encoded(entries: IndexMap<Key, Value>, encoded: Vec<u8>) -> Result<Self> {
        check_brackets("dict", VBS_DICT, &encoded)?;
        Ok(Dict {
            entries,
            encoded: Some(Encoding::new(encoded)),
        })
    }

    /// Encodes the entries once and keeps the result for later splices.
    #[must_use]
    pub fn with_encoding(mut self) -> Self {
        self.encoded = None;
        self.encoded = Some(Encoding::new(encode_to_vec(&self)));
        self
    }

    /// Inserts an entry. An existing key keeps its position and gets the new value.
    pub fn insert(&mut self, key: impl Into<Key>, value: impl Into<Value>) -> Option<Value> {
        self.encoded = None;
        self.entries.insert(key.into(), value.into())
    }

    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&Value>
    where
        Q: ?Sized + Hash + Equivalent<Key>,
    {
        self.entries.get(key)
    }

    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        Q: ?Sized + Hash + Equivalent<Key>,
    {
        self.entries.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, Key, Value> {
        self.entries.keys()
    }

    pub fn values(&self) -> indexmap::map::Values<'_, Key, Value> {
        self.entries.values()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, Key, Value> {
        self.entries.iter()
    }

    pub fn encoded(&self) -> Option<&[u8]> {
        self.encoded.as_ref().map(Encoding::bytes)
    }

    /// The encoded form without its DICT and TAIL bytes.
    pub fn encoded_body(&self) -> Option<&[u8]> {
        self.encoded.as_ref().map(Encoding::body)
    }

    pub(crate) fn encoding(&self) -> Option<&Encoding> {
        self.encoded.as_ref()
    }
}

impl PartialEq for Dict {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self.entries.iter().eq(other.entries.iter())
    }
}

impl Pack for Dict {
    fn pack<S: Sink + ?Sized>(&self, sink: &mut S) {
        if let Some(encoded) = &self.encoded {
            sink.emit_spliced(encoded.bytes(), encoded.nesting());
            return;
        }
        sink.begin_dict();
        for (key, value) in &self.entries {
            key.pack(sink);
            value.pack(sink);
        }
        sink.end_container();
    }
}

impl<'a> IntoIterator for &'a Dict {
    type Item = (&'a Key, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, Key, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for Dict {
    type Item = (Key, Value);
    type IntoIter = indexmap::map::IntoIter<Key, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<Key>, V: Into<Value>> FromIterator<(K, V)> for Dict {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Dict {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            encoded: None,
        }
    }
}

impl From<IndexMap<Key, Value>> for Dict {
    fn from(entries: IndexMap<Key, Value>) -> Self {
        Dict {
            entries,
            encoded: None,
        }
    }
}

impl From<HashMap<String, Value>> for Dict {
    fn from(map: HashMap<String, Value>) -> Self {
        map.into_iter().collect()
    }
}

impl From<BTreeMap<String, Value>> for Dict {
    fn from(map: BTreeMap<String, Value>) -> Self {
        map.into_iter().collect()
    }
}
