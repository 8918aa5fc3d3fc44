use dashmap::DashSet;

use super::StoreKey;

/// Concurrent id set for per-entity boolean state.
#[derive(Debug)]
pub struct IdSet<T: StoreKey> {
    ids: DashSet<T>,
}

impl<T: StoreKey> IdSet<T> {
    pub fn new() -> Self {
        Self {
            ids: DashSet::new(),
        }
    }

    /// Returns true if the id was not already present.
    pub fn insert(&self, id: T) -> bool {
        self.ids.insert(id)
    }

    /// Returns true if the id was present.
    pub fn remove(&self, id: &T) -> bool {
        self.ids.remove(id).is_some()
    }

    pub fn contains(&self, id: &T) -> bool {
        self.ids.contains(id)
    }

    /// Set membership to `present`. Returns false when nothing changed.
    pub fn set(&self, id: T, present: bool) -> bool {
        if present {
            self.insert(id)
        } else {
            self.remove(&id)
        }
    }

    pub fn ids(&self) -> Vec<T> {
        self.ids.iter().map(|id| id.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl<T: StoreKey> Default for IdSet<T> {
    fn default() -> Self {
        Self::new()
    }
}
