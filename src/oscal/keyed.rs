//! Ordered collections with a set-backed key index
//!
//! OSCAL keeps most keyed children (statements by `statement-id`,
//! set-parameters by `param-id`, components by `uuid`) as JSON arrays. A
//! [`KeyedList`] serializes exactly like a `Vec<T>`, but carries an index from
//! key to first position that is built once when the list is loaded.
//!
//! Loading tolerates duplicate keys (lookups resolve to the first occurrence);
//! [`KeyedList::try_push`] rejects them.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// An element identified by a key within its parent collection
pub trait Keyed {
    /// Key type
    type Key: Clone + Eq + Hash + fmt::Display;

    /// The element's key
    fn key(&self) -> &Self::Key;
}

/// Insertion-ordered list indexed by key
#[derive(Clone)]
pub struct KeyedList<T: Keyed> {
    items: Vec<T>,
    index: HashMap<T::Key, usize>,
}

impl<T: Keyed> KeyedList<T> {
    /// Create an empty list
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Build from existing items, keeping duplicates
    pub fn from_vec(items: Vec<T>) -> Self {
        let mut index = HashMap::with_capacity(items.len());
        for (pos, item) in items.iter().enumerate() {
            index.entry(item.key().clone()).or_insert(pos);
        }
        Self { items, index }
    }

    /// Append an item whose key is not yet present
    ///
    /// `owner` names the parent in the `DuplicateKey` error. The list is left
    /// unchanged on failure.
    pub fn try_push(&mut self, item: T, owner: impl fmt::Display) -> Result<&mut T> {
        if self.index.contains_key(item.key()) {
            return Err(Error::DuplicateKey {
                key: item.key().to_string(),
                owner: owner.to_string(),
            });
        }
        let pos = self.items.len();
        self.index.insert(item.key().clone(), pos);
        self.items.push(item);
        Ok(&mut self.items[pos])
    }

    /// First item with the key
    pub fn get<Q>(&self, key: &Q) -> Option<&T>
    where
        T::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.get(key).map(|&pos| &self.items[pos])
    }

    /// Mutable access to the first item with the key
    ///
    /// The key itself must not be changed through this reference.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut T>
    where
        T::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.index.get(key) {
            Some(&pos) => self.items.get_mut(pos),
            None => None,
        }
    }

    /// Whether any item has the key
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        T::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    /// Whether the loaded data repeats a key
    pub fn has_duplicates(&self) -> bool {
        self.index.len() != self.items.len()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }

    /// Serialize as a JSON object from key to item, in list order
    ///
    /// For `#[serde(serialize_with = "KeyedList::serialize_as_map")]`. The
    /// list must not repeat a key.
    pub fn serialize_as_map<S>(list: &Self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
        T::Key: Serialize,
    {
        serializer.collect_map(list.items.iter().map(|item| (item.key(), item)))
    }
}

impl<T: Keyed> Default for KeyedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Keyed + fmt::Debug> fmt::Debug for KeyedList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

impl<T: Keyed + PartialEq> PartialEq for KeyedList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<T: Keyed + Eq> Eq for KeyedList<T> {}

impl<T: Keyed> From<Vec<T>> for KeyedList<T> {
    fn from(items: Vec<T>) -> Self {
        Self::from_vec(items)
    }
}

impl<T: Keyed> FromIterator<T> for KeyedList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<'a, T: Keyed> IntoIterator for &'a KeyedList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: Keyed + Serialize> Serialize for KeyedList<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

impl<'de, T: Keyed + Deserialize<'de>> Deserialize<'de> for KeyedList<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Vec::<T>::deserialize(deserializer).map(Self::from_vec)
    }
}
