use crate::Result;
use dashmap::DashMap;
use std::hash::Hash;

/// Process wide additive cache.
///
/// The only way to populate it is [`Cache::get_or_insert_with`]: the value is computed without
/// holding any lock and then inserted only if no other thread got there first, in which case the
/// freshly computed value is dropped and the stored one is returned.
pub struct Cache<K: Eq + Hash, V: Clone> {
    map: DashMap<K, V>,
}

impl<K: Eq + Hash, V: Clone> Cache<K, V> {
    pub fn new() -> Self {
        Self {
            map: DashMap::new(),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.map.get(key).map(|v| v.value().clone())
    }

    pub fn get_or_insert_with<F>(&self, key: K, compute: F) -> Result<V>
    where
        F: FnOnce() -> Result<V>,
    {
        if let Some(v) = self.map.get(&key) {
            return Ok(v.value().clone());
        }
        let candidate = compute()?;
        Ok(self.map.entry(key).or_insert(candidate).value().clone())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl<K: Eq + Hash, V: Clone> Default for Cache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
