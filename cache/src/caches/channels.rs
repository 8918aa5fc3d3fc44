use crate::model::{ChannelId, GuildChannel, GuildId, ThreadChannel};
use crate::store::{DisabledStore, MapStore, Store};

/// Guild channels of every kind, threads included, keyed by channel id.
pub struct ChannelCache {
    store: Box<dyn Store<ChannelId, GuildChannel>>,
}

impl ChannelCache {
    pub fn new(enabled: bool) -> Self {
        let store: Box<dyn Store<ChannelId, GuildChannel>> = if enabled {
            Box::new(MapStore::new())
        } else {
            Box::new(DisabledStore::new())
        };
        Self { store }
    }

    pub fn get(&self, id: ChannelId) -> Option<GuildChannel> {
        self.store.get(&id)
    }

    pub fn add(&self, channel: GuildChannel) {
        self.store.put(channel.id(), channel);
    }

    pub fn remove(&self, id: ChannelId) -> Option<GuildChannel> {
        self.store.remove(&id)
    }

    /// Mutate in place, returning the value as it was before.
    pub fn update(&self, id: ChannelId, f: impl FnOnce(&mut GuildChannel)) -> Option<GuildChannel> {
        let mut f = Some(f);
        self.store.update(&id, &mut |c| {
            if let Some(f) = f.take() {
                f(c);
            }
        })
    }

    pub fn for_each(&self, mut f: impl FnMut(&GuildChannel)) {
        self.store.for_each(&mut |_, c| f(c));
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn guild_channels(&self, guild_id: GuildId) -> Vec<GuildChannel> {
        let mut channels = Vec::new();
        self.for_each(|c| {
            if c.guild_id() == guild_id {
                channels.push(c.clone());
            }
        });
        channels
    }

    pub fn guild_len(&self, guild_id: GuildId) -> usize {
        let mut n = 0;
        self.for_each(|c| {
            if c.guild_id() == guild_id {
                n += 1;
            }
        });
        n
    }

    /// Threads whose parent is `parent_id`.
    pub fn threads_in(&self, parent_id: ChannelId) -> Vec<ThreadChannel> {
        let mut threads = Vec::new();
        self.for_each(|c| {
            if let Some(thread) = c.as_thread()
                && thread.parent_id == parent_id
            {
                threads.push(thread.clone());
            }
        });
        threads
    }

    /// Remove every channel of a guild, returning what was removed.
    pub fn remove_guild(&self, guild_id: GuildId) -> Vec<GuildChannel> {
        let removed: Vec<GuildChannel> = self
            .guild_channels(guild_id)
            .into_iter()
            .filter_map(|c| self.remove(c.id()))
            .collect();
        // Anything inserted for this guild since the scan
        self.store.remove_if(&|_, c| c.guild_id() == guild_id);
        removed
    }
}
