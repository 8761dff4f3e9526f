//! Sorted OID storage for implementing subtree handlers.

use crate::oid::Oid;

/// An OID-keyed map kept in lexicographic order.
///
/// This is the natural backing store for a
/// [`SubtreeHandler`](super::SubtreeHandler): `at_or_after` answers a
/// Get-style probe (`next == false`) and `next_after` answers a GetNext
/// probe (`next == true`).
#[derive(Debug, Clone)]
pub struct OidMap<V> {
    /// Entries sorted by OID.
    entries: Vec<(Oid, V)>,
}

impl<V> OidMap<V> {
    /// Create an empty map.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert an OID-value pair, maintaining sorted order.
    ///
    /// If the OID already exists, its value is replaced.
    pub fn insert(&mut self, oid: Oid, value: V) {
        match self.entries.binary_search_by(|(o, _)| o.cmp(&oid)) {
            Ok(idx) => self.entries[idx].1 = value,
            Err(idx) => self.entries.insert(idx, (oid, value)),
        }
    }

    /// Get the value for an exact OID match.
    pub fn get(&self, oid: &Oid) -> Option<&V> {
        match self.entries.binary_search_by(|(o, _)| o.cmp(oid)) {
            Ok(idx) => Some(&self.entries[idx].1),
            Err(_) => None,
        }
    }

    /// The entry at `oid`, or failing that the first one after it.
    pub fn at_or_after(&self, oid: &Oid) -> Option<(&Oid, &V)> {
        let idx = match self.entries.binary_search_by(|(o, _)| o.cmp(oid)) {
            Ok(idx) => idx,
            Err(idx) => idx,
        };
        self.entries.get(idx).map(|(o, v)| (o, v))
    }

    /// The first entry strictly after `oid`.
    pub fn next_after(&self, oid: &Oid) -> Option<(&Oid, &V)> {
        let idx = match self.entries.binary_search_by(|(o, _)| o.cmp(oid)) {
            Ok(idx) => idx + 1,
            Err(idx) => idx,
        };
        self.entries.get(idx).map(|(o, v)| (o, v))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all entries in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = (&Oid, &V)> {
        self.entries.iter().map(|(o, v)| (o, v))
    }
}

impl<V> Default for OidMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> FromIterator<(Oid, V)> for OidMap<V> {
    fn from_iter<I: IntoIterator<Item = (Oid, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (oid, value) in iter {
            map.insert(oid, value);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;

    fn sample() -> OidMap<i32> {
        let mut map = OidMap::new();
        map.insert(oid!(1, 3, 6, 1, 2), 100);
        map.insert(oid!(1, 3, 6, 1, 1), 50);
        map.insert(oid!(1, 3, 6, 1, 3), 150);
        map
    }

    #[test]
    fn test_insert_and_get() {
        let map = sample();
        assert_eq!(map.get(&oid!(1, 3, 6, 1, 1)), Some(&50));
        assert_eq!(map.get(&oid!(1, 3, 6, 1, 2)), Some(&100));
        assert_eq!(map.get(&oid!(1, 3, 6, 1, 4)), None);
    }

    #[test]
    fn test_insert_replaces_existing() {
        let mut map = sample();
        map.insert(oid!(1, 3, 6, 1, 1), 51);
        assert_eq!(map.get(&oid!(1, 3, 6, 1, 1)), Some(&51));
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_next_after() {
        let map = sample();

        // Before first
        assert_eq!(map.next_after(&oid!(1, 3, 6, 1, 0)).unwrap().0, &oid!(1, 3, 6, 1, 1));
        // Exact match returns the following entry
        assert_eq!(map.next_after(&oid!(1, 3, 6, 1, 1)).unwrap().0, &oid!(1, 3, 6, 1, 2));
        // Between entries
        assert_eq!(map.next_after(&oid!(1, 3, 6, 1, 1, 5)).unwrap().0, &oid!(1, 3, 6, 1, 2));
        // At and past the last
        assert!(map.next_after(&oid!(1, 3, 6, 1, 3)).is_none());
        assert!(map.next_after(&oid!(1, 3, 6, 1, 4)).is_none());
    }

    #[test]
    fn test_at_or_after() {
        let map = sample();

        // Exact match returns the entry itself
        assert_eq!(map.at_or_after(&oid!(1, 3, 6, 1, 2)).unwrap().0, &oid!(1, 3, 6, 1, 2));
        // Otherwise behaves like next_after
        assert_eq!(map.at_or_after(&oid!(1, 3, 6, 1, 1, 5)).unwrap().0, &oid!(1, 3, 6, 1, 2));
        assert!(map.at_or_after(&oid!(1, 3, 6, 1, 4)).is_none());
    }

    #[test]
    fn test_iter_is_sorted() {
        let map = sample();
        let keys: Vec<_> = map.iter().map(|(o, _)| o.clone()).collect();
        assert_eq!(
            keys,
            vec![oid!(1, 3, 6, 1, 1), oid!(1, 3, 6, 1, 2), oid!(1, 3, 6, 1, 3)]
        );
    }

    #[test]
    fn test_empty() {
        let map: OidMap<i32> = OidMap::new();
        assert!(map.is_empty());
        assert!(map.next_after(&oid!(1, 3)).is_none());
        assert!(map.at_or_after(&oid!(1, 3)).is_none());
    }
}
