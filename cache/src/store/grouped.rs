use std::collections::HashMap;
use std::marker::PhantomData;

use dashmap::DashMap;

use super::{GroupedStore, StoreKey, StoreValue};

/// [`GroupedStore`] keeping one inner map per group.
///
/// Each group lives under a single shard entry, so dropping a group is one
/// map removal and cannot interleave with an insert into the same group.
/// Empty groups are pruned as their last entity goes.
#[derive(Debug)]
pub struct GroupedMapStore<G: StoreKey, K, V> {
    groups: DashMap<G, HashMap<K, V>>,
}

impl<G: StoreKey, K, V> GroupedMapStore<G, K, V> {
    pub fn new() -> Self {
        Self {
            groups: DashMap::new(),
        }
    }

    /// Number of non-empty groups.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}

impl<G: StoreKey, K, V> Default for GroupedMapStore<G, K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: StoreKey, K: StoreKey, V: StoreValue> GroupedStore<G, K, V> for GroupedMapStore<G, K, V> {
    fn get(&self, group: &G, key: &K) -> Option<V> {
        self.groups.get(group)?.get(key).cloned()
    }

    fn put(&self, group: G, key: K, value: V) {
        self.groups.entry(group).or_default().insert(key, value);
    }

    fn remove(&self, group: &G, key: &K) -> Option<V> {
        let mut removed = None;
        self.groups.remove_if_mut(group, |_, entities| {
            removed = entities.remove(key);
            entities.is_empty()
        });
        removed
    }

    fn update(&self, group: &G, key: &K, f: &mut dyn FnMut(&mut V)) -> Option<V> {
        let mut entities = self.groups.get_mut(group)?;
        let value = entities.get_mut(key)?;
        let old = value.clone();
        f(value);
        Some(old)
    }

    fn remove_if(&self, predicate: &dyn Fn(&G, &K, &V) -> bool) {
        self.groups.retain(|g, entities| {
            entities.retain(|k, v| !predicate(g, k, v));
            !entities.is_empty()
        });
    }

    fn for_each(&self, visit: &mut dyn FnMut(&G, &K, &V)) {
        let mut snapshot = Vec::new();
        for group in self.groups.iter() {
            for (k, v) in group.value() {
                snapshot.push((group.key().clone(), k.clone(), v.clone()));
            }
        }
        for (g, k, v) in &snapshot {
            visit(g, k, v);
        }
    }

    fn len(&self) -> usize {
        self.groups.iter().map(|g| g.value().len()).sum()
    }

    fn group_for_each(&self, group: &G, visit: &mut dyn FnMut(&K, &V)) {
        let snapshot: Vec<(K, V)> = match self.groups.get(group) {
            Some(entities) => entities
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            None => return,
        };
        for (k, v) in &snapshot {
            visit(k, v);
        }
    }

    fn group_len(&self, group: &G) -> usize {
        self.groups.get(group).map_or(0, |entities| entities.len())
    }

    fn group_remove(&self, group: &G) -> usize {
        self.groups
            .remove(group)
            .map_or(0, |(_, entities)| entities.len())
    }
}

/// Grouped counterpart of [`super::DisabledStore`].
pub struct DisabledGroupedStore<G, K, V> {
    _marker: PhantomData<fn() -> (G, K, V)>,
}

impl<G, K, V> DisabledGroupedStore<G, K, V> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<G, K, V> Default for DisabledGroupedStore<G, K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G, K, V> GroupedStore<G, K, V> for DisabledGroupedStore<G, K, V> {
    fn get(&self, _group: &G, _key: &K) -> Option<V> {
        None
    }

    fn put(&self, _group: G, _key: K, _value: V) {}

    fn remove(&self, _group: &G, _key: &K) -> Option<V> {
        None
    }

    fn update(&self, _group: &G, _key: &K, _f: &mut dyn FnMut(&mut V)) -> Option<V> {
        None
    }

    fn remove_if(&self, _predicate: &dyn Fn(&G, &K, &V) -> bool) {}

    fn for_each(&self, _visit: &mut dyn FnMut(&G, &K, &V)) {}

    fn len(&self) -> usize {
        0
    }

    fn group_for_each(&self, _group: &G, _visit: &mut dyn FnMut(&K, &V)) {}

    fn group_len(&self, _group: &G) -> usize {
        0
    }

    fn group_remove(&self, _group: &G) -> usize {
        0
    }
}
