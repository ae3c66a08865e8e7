//! Populate-once metadata cache keyed by type.

use std::any::TypeId;

use dashmap::DashMap;

/// Lazily populated `TypeId -> V` table.
///
/// Values are computed on first request and never evicted. Two threads racing
/// on the same key may both run the loader; the first value stored wins and
/// both callers observe it.
pub(crate) struct TypeCache<V> {
    entries: DashMap<TypeId, V>,
}

impl<V: Clone> TypeCache<V> {
    pub(crate) fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Return the cached value for `key`, computing it with `load` on a miss.
    ///
    /// `load` runs without any shard lock held.
    pub(crate) fn get_or_load(&self, key: TypeId, load: impl FnOnce() -> V) -> V {
        if let Some(hit) = self.entries.get(&key) {
            return hit.value().clone();
        }

        let loaded = load();
        self.entries.entry(key).or_insert(loaded).value().clone()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
