use tracing::debug;

use crate::model::{Guild, GuildId};
use crate::store::{DisabledStore, IdSet, MapStore, Store};

/// Guild snapshots plus the per-guild transition flags.
///
/// The unready and unavailable sets are kept even when guild retention is
/// off, since the session needs them to know which guilds are still pending.
pub struct GuildCache {
    store: Box<dyn Store<GuildId, Guild>>,
    unready: IdSet<GuildId>,
    unavailable: IdSet<GuildId>,
}

impl GuildCache {
    pub fn new(enabled: bool) -> Self {
        let store: Box<dyn Store<GuildId, Guild>> = if enabled {
            Box::new(MapStore::new())
        } else {
            Box::new(DisabledStore::new())
        };
        Self {
            store,
            unready: IdSet::new(),
            unavailable: IdSet::new(),
        }
    }

    pub fn get(&self, id: GuildId) -> Option<Guild> {
        self.store.get(&id)
    }

    pub fn add(&self, guild: Guild) {
        self.store.put(guild.id, guild);
    }

    pub fn remove(&self, id: GuildId) -> Option<Guild> {
        self.store.remove(&id)
    }

    /// Mutate in place, returning the value as it was before.
    pub fn update(&self, id: GuildId, f: impl FnOnce(&mut Guild)) -> Option<Guild> {
        let mut f = Some(f);
        self.store.update(&id, &mut |g| {
            if let Some(f) = f.take() {
                f(g);
            }
        })
    }

    pub fn for_each(&self, mut f: impl FnMut(&Guild)) {
        self.store.for_each(&mut |_, g| f(g));
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    // ── Transition flags ──

    pub fn is_unready(&self, id: GuildId) -> bool {
        self.unready.contains(&id)
    }

    /// No-op when the flag already has the requested value.
    pub fn set_unready(&self, id: GuildId, unready: bool) {
        if self.unready.set(id, unready) {
            debug!(guild_id = id, unready, "guild readiness changed");
        }
    }

    pub fn unready_ids(&self) -> Vec<GuildId> {
        self.unready.ids()
    }

    pub fn is_unavailable(&self, id: GuildId) -> bool {
        self.unavailable.contains(&id)
    }

    /// No-op when the flag already has the requested value.
    pub fn set_unavailable(&self, id: GuildId, unavailable: bool) {
        if self.unavailable.set(id, unavailable) {
            debug!(guild_id = id, unavailable, "guild availability changed");
        }
    }

    pub fn unavailable_ids(&self) -> Vec<GuildId> {
        self.unavailable.ids()
    }
}
