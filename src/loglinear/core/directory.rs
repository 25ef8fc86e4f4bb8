//! SmallIntMap — a map keyed by small dense integers with two storage backends.
//!
//! Purpose
//! -------
//! Feature-grid rows and expected-count rows are keyed by decision ids in
//! `0..capacity`. Some rows use most ids (dense), most rows use few (sparse).
//! `SmallIntMap` hides that choice behind a single interface: callers use
//! `get`, `contains_key` and `iter`, and never see which backend was picked.
//!
//! Key behaviors
//! -------------
//! - The backend is chosen once, at construction, by fill ratio:
//!   `len / capacity ≥ DENSE_FILL_RATIO` selects a `Vec<Option<V>>`,
//!   otherwise a sorted `Vec<(usize, V)>` searched by binary search.
//! - Iteration is in ascending key order for both backends, so any
//!   computation driven by `iter` is backend-independent, bit for bit.
//!
//! Invariants
//! ----------
//! - Every key is `< capacity`; construction rejects larger keys.
//! - Duplicate keys are merged with the caller's combine function.
//! - The map is immutable after construction.

/// Fill ratio at or above which the dense backend is used.
pub const DENSE_FILL_RATIO: f64 = 0.25;

#[derive(Debug, Clone, PartialEq)]
enum Backend<V> {
    Dense { slots: Vec<Option<V>>, len: usize },
    Sparse { entries: Vec<(usize, V)> },
}

/// Immutable integer-keyed map with a dense or sparse backend.
#[derive(Debug, Clone, PartialEq)]
pub struct SmallIntMap<V> {
    capacity: usize,
    backend: Backend<V>,
}

impl<V> SmallIntMap<V> {
    /// Empty map over keys `0..capacity`.
    pub fn empty(capacity: usize) -> Self {
        Self { capacity, backend: Backend::Sparse { entries: Vec::new() } }
    }

    /// Build from `(key, value)` pairs, merging duplicate keys with `combine`
    /// (applied in input order).
    ///
    /// # Errors
    /// Returns the first key that is not `< capacity`.
    pub fn from_pairs_with<I, C>(capacity: usize, pairs: I, mut combine: C) -> Result<Self, usize>
    where
        I: IntoIterator<Item = (usize, V)>,
        C: FnMut(&mut V, V),
    {
        let mut entries: Vec<(usize, V)> = Vec::new();
        for (key, value) in pairs {
            if key >= capacity {
                return Err(key);
            }
            entries.push((key, value));
        }
        // Stable sort keeps duplicates in input order for `combine`.
        entries.sort_by_key(|(key, _)| *key);
        let mut merged: Vec<(usize, V)> = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            match merged.last_mut() {
                Some((last, acc)) if *last == key => combine(acc, value),
                _ => merged.push((key, value)),
            }
        }
        Ok(Self::from_sorted_unique(capacity, merged))
    }

    fn from_sorted_unique(capacity: usize, entries: Vec<(usize, V)>) -> Self {
        let fill = if capacity == 0 { 0.0 } else { entries.len() as f64 / capacity as f64 };
        let backend = if fill >= DENSE_FILL_RATIO && !entries.is_empty() {
            let len = entries.len();
            let mut slots: Vec<Option<V>> = (0..capacity).map(|_| None).collect();
            for (key, value) in entries {
                slots[key] = Some(value);
            }
            Backend::Dense { slots, len }
        } else {
            Backend::Sparse { entries }
        };
        Self { capacity, backend }
    }

    /// Value stored under `key`, if any.
    pub fn get(&self, key: usize) -> Option<&V> {
        match &self.backend {
            Backend::Dense { slots, .. } => slots.get(key).and_then(Option::as_ref),
            Backend::Sparse { entries } => entries
                .binary_search_by_key(&key, |(k, _)| *k)
                .ok()
                .map(|pos| &entries[pos].1),
        }
    }

    pub fn contains_key(&self, key: usize) -> bool {
        self.get(key).is_some()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        match &self.backend {
            Backend::Dense { len, .. } => *len,
            Backend::Sparse { entries } => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Exclusive upper bound on keys.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// `(key, &value)` in ascending key order.
    pub fn iter(&self) -> Box<dyn Iterator<Item = (usize, &V)> + '_> {
        match &self.backend {
            Backend::Dense { slots, .. } => Box::new(
                slots.iter().enumerate().filter_map(|(k, slot)| slot.as_ref().map(|v| (k, v))),
            ),
            Backend::Sparse { entries } => Box::new(entries.iter().map(|(k, v)| (*k, v))),
        }
    }

    /// Keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = usize> + '_ {
        self.iter().map(|(k, _)| k)
    }

    /// `true` when the dense backend was chosen. Diagnostics only.
    pub fn is_dense(&self) -> bool {
        matches!(self.backend, Backend::Dense { .. })
    }
}

impl SmallIntMap<f64> {
    /// Build a numeric row, summing duplicate keys.
    ///
    /// # Errors
    /// Returns the first key that is not `< capacity`.
    pub fn from_pairs_summed<I>(capacity: usize, pairs: I) -> Result<Self, usize>
    where
        I: IntoIterator<Item = (usize, f64)>,
    {
        Self::from_pairs_with(capacity, pairs, |acc, v| *acc += v)
    }

    /// Sum of the stored values, in key order.
    pub fn sum(&self) -> f64 {
        self.iter().map(|(_, v)| *v).sum()
    }
}
