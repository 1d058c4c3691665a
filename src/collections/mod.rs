//! Insertion-ordered, de-duplicating containers
//!
//! The workpackage contract promises element order: models appear in the
//! order they were first collected, and duplicate inserts leave that order
//! untouched. A plain `HashSet` loses order and a plain `Vec` loses
//! uniqueness, so both properties live behind one abstraction here.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Set with insertion-order iteration and caller-defined equality.
///
/// `insert` of an element equal to an existing one is a no-op: the element
/// keeps its first-insertion position.
#[derive(Debug, Clone)]
pub struct OrderedSet<T> {
    entries: Vec<T>,
    seen: HashSet<T>,
}

impl<T> OrderedSet<T>
where
    T: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Insert an element, returning `true` if it was not present before.
    pub fn insert(&mut self, value: T) -> bool {
        if !self.seen.insert(value.clone()) {
            return false;
        }
        self.entries.push(value);
        true
    }

    pub fn contains(&self, value: &T) -> bool {
        self.seen.contains(value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }

    /// Snapshot of the elements in insertion order.
    pub fn to_vec(&self) -> Vec<T> {
        self.entries.clone()
    }
}

impl<T: Eq + Hash + Clone> Default for OrderedSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Eq + Hash + Clone> Extend<T> for OrderedSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<T: Eq + Hash + Clone> FromIterator<T> for OrderedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<'a, T> IntoIterator for &'a OrderedSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Map with insertion-order iteration and last-write-wins values.
///
/// Re-inserting a key replaces the value but keeps the key's
/// first-insertion position, so iteration order is deterministic across
/// overwrites.
#[derive(Debug, Clone)]
pub struct OrderedMap<K, V> {
    order: Vec<K>,
    values: HashMap<K, V>,
}

impl<K, V> OrderedMap<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            order: Vec::new(),
            values: HashMap::new(),
        }
    }

    /// Insert a key/value pair, returning the previous value for the key.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let previous = self.values.insert(key.clone(), value);
        if previous.is_none() {
            self.order.push(key);
        }
        previous
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: std::borrow::Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.values.get(key)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: std::borrow::Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterate over entries in key-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.order.iter().map(|k| {
            let v = self
                .values
                .get(k)
                .expect("order vec and value map out of sync");
            (k, v)
        })
    }

    /// Iterate over keys in insertion order.
    pub fn keys(&self) -> std::slice::Iter<'_, K> {
        self.order.iter()
    }
}

impl<K: Eq + Hash + Clone, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + Clone, V> FromIterator<(K, V)> for OrderedMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}
