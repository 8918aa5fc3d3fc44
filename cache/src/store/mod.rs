//! Concurrent storage primitives behind every cache facade.
//!
//! Stores never hand out references into their maps: reads return clones and
//! iteration walks a cloned snapshot, so a visitor may call back into the
//! same store (or any other) without holding a shard lock.

mod grouped;
mod keyed;
mod set;

use std::hash::Hash;

pub use grouped::{DisabledGroupedStore, GroupedMapStore};
pub use keyed::{DisabledStore, MapStore};
pub use set::IdSet;

/// Single-level id -> value storage.
pub trait Store<K, V>: Send + Sync {
    fn get(&self, key: &K) -> Option<V>;

    /// Insert or overwrite.
    fn put(&self, key: K, value: V);

    fn remove(&self, key: &K) -> Option<V>;

    /// Mutate a stored value in place. Returns the value as it was before
    /// `f` ran, or `None` (without calling `f`) when the key is absent.
    fn update(&self, key: &K, f: &mut dyn FnMut(&mut V)) -> Option<V>;

    /// Remove every entry matching `predicate`.
    fn remove_if(&self, predicate: &dyn Fn(&K, &V) -> bool);

    fn for_each(&self, visit: &mut dyn FnMut(&K, &V));

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Two-level (group id, entity id) -> value storage.
pub trait GroupedStore<G, K, V>: Send + Sync {
    fn get(&self, group: &G, key: &K) -> Option<V>;

    fn put(&self, group: G, key: K, value: V);

    fn remove(&self, group: &G, key: &K) -> Option<V>;

    /// Same contract as [`Store::update`].
    fn update(&self, group: &G, key: &K, f: &mut dyn FnMut(&mut V)) -> Option<V>;

    fn remove_if(&self, predicate: &dyn Fn(&G, &K, &V) -> bool);

    fn for_each(&self, visit: &mut dyn FnMut(&G, &K, &V));

    /// Total entity count across all groups.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn group_for_each(&self, group: &G, visit: &mut dyn FnMut(&K, &V));

    fn group_len(&self, group: &G) -> usize;

    /// Drop a whole group at once. Returns how many entities it held.
    fn group_remove(&self, group: &G) -> usize;
}

/// Key bound shared by every store.
pub trait StoreKey: Eq + Hash + Clone + Send + Sync + 'static {}

impl<T: Eq + Hash + Clone + Send + Sync + 'static> StoreKey for T {}

/// Value bound shared by every store.
pub trait StoreValue: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> StoreValue for T {}
