//! Insertion-ordered, case-insensitive name maps

use crate::name::CimName;
use indexmap::IndexMap;
use std::fmt;

/// An insertion-ordered map keyed by [`CimName`].
///
/// Lookup is case-insensitive; iteration yields entries in insertion
/// order (CIM property and method declaration order is significant on
/// output). Inserting a name that folds to an existing key replaces the
/// value in place, keeping both the position and the first-inserted
/// spelling of the key.
#[derive(Clone)]
pub struct NameMap<V> {
    inner: IndexMap<CimName, V>,
}

impl<V> Default for NameMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> NameMap<V> {
    pub fn new() -> Self {
        Self {
            inner: IndexMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Insert an entry, returning the previous value for the folded name
    pub fn insert<N: Into<CimName>>(&mut self, name: N, value: V) -> Option<V> {
        self.inner.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<&V> {
        self.inner.get(&CimName::new(name))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut V> {
        self.inner.get_mut(&CimName::new(name))
    }

    /// Entry lookup returning the stored key spelling alongside the value
    pub fn get_entry(&self, name: &str) -> Option<(&CimName, &V)> {
        self.inner.get_key_value(&CimName::new(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(&CimName::new(name))
    }

    /// Remove an entry, preserving the order of the remaining entries
    pub fn remove(&mut self, name: &str) -> Option<V> {
        self.inner.shift_remove(&CimName::new(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CimName, &V)> {
        self.inner.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&CimName, &mut V)> {
        self.inner.iter_mut()
    }

    pub fn keys(&self) -> impl Iterator<Item = &CimName> {
        self.inner.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.inner.values()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.inner.values_mut()
    }

    pub fn clear(&mut self) {
        self.inner.clear()
    }
}

impl<V: PartialEq> PartialEq for NameMap<V> {
    /// Order-insensitive equality: same folded key set, equal values
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.inner.get(k).is_some_and(|ov| ov == v))
    }
}

impl<V: fmt::Debug> fmt::Debug for NameMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.inner.iter()).finish()
    }
}

impl<N: Into<CimName>, V> FromIterator<(N, V)> for NameMap<V> {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (name, value) in iter {
            map.insert(name, value);
        }
        map
    }
}

impl<N: Into<CimName>, V> Extend<(N, V)> for NameMap<V> {
    fn extend<I: IntoIterator<Item = (N, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.insert(name, value);
        }
    }
}

impl<V> IntoIterator for NameMap<V> {
    type Item = (CimName, V);
    type IntoIter = indexmap::map::IntoIter<CimName, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

impl<'a, V> IntoIterator for &'a NameMap<V> {
    type Item = (&'a CimName, &'a V);
    type IntoIter = indexmap::map::Iter<'a, CimName, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let mut map = NameMap::new();
        map.insert("InstanceID", 1u32);
        assert_eq!(map.get("instanceid"), Some(&1));
        assert_eq!(map.get("INSTANCEID"), Some(&1));
        assert!(map.get("other").is_none());
    }

    #[test]
    fn insertion_order_is_preserved() {
        let mut map = NameMap::new();
        map.insert("B", 2u32);
        map.insert("A", 1u32);
        map.insert("C", 3u32);
        let keys: Vec<_> = map.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, ["B", "A", "C"]);
    }

    #[test]
    fn colliding_insert_replaces_in_place() {
        let mut map = NameMap::new();
        map.insert("Alpha", 1u32);
        map.insert("Beta", 2u32);
        map.insert("ALPHA", 10u32);
        let entries: Vec<_> = map.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        assert_eq!(entries, [("Alpha", 10), ("Beta", 2)]);
    }

    #[test]
    fn equality_ignores_order() {
        let mut a = NameMap::new();
        a.insert("X", 1u32);
        a.insert("Y", 2u32);
        let mut b = NameMap::new();
        b.insert("y", 2u32);
        b.insert("x", 1u32);
        assert_eq!(a, b);
    }
}
