use std::marker::PhantomData;

use dashmap::DashMap;

use super::{Store, StoreKey, StoreValue};

/// [`Store`] backed by a sharded concurrent map.
#[derive(Debug)]
pub struct MapStore<K: StoreKey, V> {
    entries: DashMap<K, V>,
}

impl<K: StoreKey, V> MapStore<K, V> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl<K: StoreKey, V> Default for MapStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: StoreKey, V: StoreValue> Store<K, V> for MapStore<K, V> {
    fn get(&self, key: &K) -> Option<V> {
        self.entries.get(key).map(|v| v.value().clone())
    }

    fn put(&self, key: K, value: V) {
        self.entries.insert(key, value);
    }

    fn remove(&self, key: &K) -> Option<V> {
        self.entries.remove(key).map(|(_, v)| v)
    }

    fn update(&self, key: &K, f: &mut dyn FnMut(&mut V)) -> Option<V> {
        let mut entry = self.entries.get_mut(key)?;
        let old = entry.value().clone();
        f(entry.value_mut());
        Some(old)
    }

    fn remove_if(&self, predicate: &dyn Fn(&K, &V) -> bool) {
        self.entries.retain(|k, v| !predicate(k, v));
    }

    fn for_each(&self, visit: &mut dyn FnMut(&K, &V)) {
        let snapshot: Vec<(K, V)> = self
            .entries
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        for (k, v) in &snapshot {
            visit(k, v);
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Backs a category whose retention flag is off: reads miss, writes vanish.
pub struct DisabledStore<K, V> {
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V> DisabledStore<K, V> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<K, V> Default for DisabledStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Store<K, V> for DisabledStore<K, V> {
    fn get(&self, _key: &K) -> Option<V> {
        None
    }

    fn put(&self, _key: K, _value: V) {}

    fn remove(&self, _key: &K) -> Option<V> {
        None
    }

    fn update(&self, _key: &K, _f: &mut dyn FnMut(&mut V)) -> Option<V> {
        None
    }

    fn remove_if(&self, _predicate: &dyn Fn(&K, &V) -> bool) {}

    fn for_each(&self, _visit: &mut dyn FnMut(&K, &V)) {}

    fn len(&self) -> usize {
        0
    }
}
