//! Insertion-ordered set with append-if-absent semantics.
//!
//! Group membership lists and tag value lists both need "append unless already
//! present, keep first-seen order". [`OrderedSet`] is that pattern as a type,
//! backed by [`IndexSet`] so membership checks stay O(1).

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::hash::Hash;

/// An insertion-ordered collection without duplicates.
///
/// Serializes as a plain JSON array. Deserializing an array that contains
/// duplicates keeps the first occurrence of each element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
#[serde(bound(
    serialize = "T: Serialize + Hash + Eq",
    deserialize = "T: Deserialize<'de> + Hash + Eq"
))]
pub struct OrderedSet<T: Hash + Eq> {
    items: IndexSet<T>,
}

impl<T: Hash + Eq> Default for OrderedSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Hash + Eq> OrderedSet<T> {
    /// Create an empty set
    pub fn new() -> Self {
        Self {
            items: IndexSet::new(),
        }
    }

    /// Append `item` unless it is already present.
    ///
    /// Returns `true` when the item was appended.
    pub fn push(&mut self, item: T) -> bool {
        self.items.insert(item)
    }

    /// Check whether the set contains `item`
    pub fn contains<Q>(&self, item: &Q) -> bool
    where
        T: std::borrow::Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.items.contains(item)
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Element at `index` in insertion order
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get_index(index)
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> indexmap::set::Iter<'_, T> {
        self.items.iter()
    }

    /// Elements whose insertion index falls in `range`, clipped to the set
    pub fn range(&self, range: std::ops::Range<usize>) -> indexmap::set::Iter<'_, T> {
        let end = range.end.min(self.items.len());
        let start = range.start.min(end);
        self.items.as_slice()[start..end].iter()
    }
}

impl<T: Hash + Eq> FromIterator<T> for OrderedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<T: Hash + Eq> Extend<T> for OrderedSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push(item);
        }
    }
}

impl<'a, T: Hash + Eq> IntoIterator for &'a OrderedSet<T> {
    type Item = &'a T;
    type IntoIter = indexmap::set::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: Hash + Eq> IntoIterator for OrderedSet<T> {
    type Item = T;
    type IntoIter = indexmap::set::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
