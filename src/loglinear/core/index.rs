//! Index — insertion-ordered bijection between keys and dense ids.
//!
//! Contexts, decisions and features each get their own registry. Ids are
//! handed out monotonically in first-seen order, so two runs that see keys in
//! the same order agree on every id; that is what makes feature ids (and
//! therefore weight vectors) reproducible.
use std::collections::HashMap;
use std::hash::Hash;

/// Bijection `key ↔ id` with ids `0..len()` in insertion order.
///
/// Keys are stored once in `keys` (the arena); the map only points into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index<K: Hash + Eq> {
    keys: Vec<K>,
    ids: HashMap<K, usize>,
}

impl<K: Hash + Eq + Clone> Index<K> {
    pub fn new() -> Self {
        Self { keys: Vec::new(), ids: HashMap::new() }
    }

    /// Id of `key`, registering it with the next free id on first sight.
    pub fn index(&mut self, key: K) -> usize {
        if let Some(&id) = self.ids.get(&key) {
            return id;
        }
        let id = self.keys.len();
        self.ids.insert(key.clone(), id);
        self.keys.push(key);
        id
    }

    /// Id of `key` without registering it.
    pub fn find(&self, key: &K) -> Option<usize> {
        self.ids.get(key).copied()
    }

    /// Key registered under `id`.
    pub fn get(&self, id: usize) -> Option<&K> {
        self.keys.get(id)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// `(id, key)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &K)> + '_ {
        self.keys.iter().enumerate()
    }
}

impl<K: Hash + Eq + Clone> Default for Index<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq + Clone> FromIterator<K> for Index<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut index = Index::new();
        for key in iter {
            index.index(key);
        }
        index
    }
}
