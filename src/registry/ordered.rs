//! Priority-ordered sets and multimaps
//!
//! Insertion order is priority (earlier is better). Re-inserting an equal
//! value keeps its first position.

use std::borrow::Borrow;
use std::hash::Hash;

use indexmap::{IndexMap, IndexSet};

/// Insertion-ordered set with O(1) membership
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedSet<T: Hash + Eq> {
    items: IndexSet<T>,
}

impl<T: Hash + Eq> Default for OrderedSet<T> {
    fn default() -> Self {
        Self { items: IndexSet::new() }
    }
}

impl<T: Hash + Eq> OrderedSet<T> {
    /// Empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Append unless an equal value is present; true if appended
    pub fn insert(&mut self, value: T) -> bool {
        self.items.insert(value)
    }

    /// Append every value not already present
    pub fn extend<I: IntoIterator<Item = T>>(&mut self, values: I) {
        for value in values {
            self.items.insert(value);
        }
    }

    /// Membership test
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.items.contains(value)
    }

    /// Highest priority entry
    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// No entries
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Entries in priority order
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

impl<T: Hash + Eq + Clone> OrderedSet<T> {
    /// Entries in priority order, copied out
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

impl<T: Hash + Eq> FromIterator<T> for OrderedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<T: Hash + Eq> IntoIterator for OrderedSet<T> {
    type Item = T;
    type IntoIter = indexmap::set::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Key to ordered set of values, keys kept in first-seen order
#[derive(Debug, Clone)]
pub struct OrderedMultiMap<K: Hash + Eq, V: Hash + Eq> {
    entries: IndexMap<K, OrderedSet<V>>,
}

impl<K: Hash + Eq, V: Hash + Eq> Default for OrderedMultiMap<K, V> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<K: Hash + Eq, V: Hash + Eq> OrderedMultiMap<K, V> {
    /// Empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `value` to the set under `key`; true if appended
    pub fn insert(&mut self, key: K, value: V) -> bool {
        self.entries.entry(key).or_default().insert(value)
    }

    /// Values under `key`
    pub fn get<Q>(&self, key: &Q) -> Option<&OrderedSet<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key)
    }

    /// Replace the whole set under `key`
    pub fn replace(&mut self, key: K, values: OrderedSet<V>) {
        self.entries.insert(key, values);
    }

    /// Keys in first-seen order
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }

    /// Every value under every key, in key order then priority order
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.values().flat_map(OrderedSet::iter)
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// No keys
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Hash + Eq, V: Hash + Eq + Clone> OrderedMultiMap<K, V> {
    /// Values under `key` copied out; empty if the key is unknown
    pub fn get_vec<Q>(&self, key: &Q) -> Vec<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key).map(OrderedSet::to_vec).unwrap_or_default()
    }
}
