//! Per-category facades and the [`Caches`] aggregator that feeds them.

mod channels;
mod entity;
mod guilds;
mod handle;
mod queries;
mod self_user;

use tracing::info;

pub use channels::ChannelCache;
pub use entity::{
    EmojiCache, EntityCache, GroupedEntity, MemberCache, MessageCache, PresenceCache, RoleCache,
    ScheduledEventCache, StageInstanceCache, StickerCache, ThreadMemberCache, VoiceStateCache,
};
pub use guilds::GuildCache;
pub use self_user::SelfUserCache;

use crate::config::CacheConfig;
use crate::flags::CacheFlags;

/// Every category cache, plus the event handler and derived queries.
///
/// Share it behind an `Arc`: all methods take `&self` and each facade does
/// its own locking, so no lock is held between calls.
pub struct Caches {
    flags: CacheFlags,

    self_user: SelfUserCache,
    guilds: GuildCache,
    channels: ChannelCache,
    roles: RoleCache,
    members: MemberCache,
    thread_members: ThreadMemberCache,
    presences: PresenceCache,
    voice_states: VoiceStateCache,
    messages: MessageCache,
    emojis: EmojiCache,
    stickers: StickerCache,
    stage_instances: StageInstanceCache,
    scheduled_events: ScheduledEventCache,
}

impl Caches {
    pub fn new(flags: CacheFlags) -> Self {
        info!(retain = ?flags.names(), "cache initialised");
        Self {
            flags,
            self_user: SelfUserCache::new(),
            guilds: GuildCache::new(flags.contains(CacheFlags::GUILDS)),
            channels: ChannelCache::new(flags.contains(CacheFlags::CHANNELS)),
            roles: RoleCache::new(flags.contains(CacheFlags::ROLES)),
            members: MemberCache::new(flags.contains(CacheFlags::MEMBERS)),
            thread_members: ThreadMemberCache::new(flags.contains(CacheFlags::THREAD_MEMBERS)),
            presences: PresenceCache::new(flags.contains(CacheFlags::PRESENCES)),
            voice_states: VoiceStateCache::new(flags.contains(CacheFlags::VOICE_STATES)),
            messages: MessageCache::new(flags.contains(CacheFlags::MESSAGES)),
            emojis: EmojiCache::new(flags.contains(CacheFlags::EMOJIS)),
            stickers: StickerCache::new(flags.contains(CacheFlags::STICKERS)),
            stage_instances: StageInstanceCache::new(flags.contains(CacheFlags::STAGE_INSTANCES)),
            scheduled_events: ScheduledEventCache::new(
                flags.contains(CacheFlags::SCHEDULED_EVENTS),
            ),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.flags)
    }

    pub fn flags(&self) -> CacheFlags {
        self.flags
    }

    // ── Facades ──

    pub fn self_user(&self) -> &SelfUserCache {
        &self.self_user
    }

    pub fn guilds(&self) -> &GuildCache {
        &self.guilds
    }

    pub fn channels(&self) -> &ChannelCache {
        &self.channels
    }

    pub fn roles(&self) -> &RoleCache {
        &self.roles
    }

    pub fn members(&self) -> &MemberCache {
        &self.members
    }

    pub fn thread_members(&self) -> &ThreadMemberCache {
        &self.thread_members
    }

    pub fn presences(&self) -> &PresenceCache {
        &self.presences
    }

    pub fn voice_states(&self) -> &VoiceStateCache {
        &self.voice_states
    }

    pub fn messages(&self) -> &MessageCache {
        &self.messages
    }

    pub fn emojis(&self) -> &EmojiCache {
        &self.emojis
    }

    pub fn stickers(&self) -> &StickerCache {
        &self.stickers
    }

    pub fn stage_instances(&self) -> &StageInstanceCache {
        &self.stage_instances
    }

    pub fn scheduled_events(&self) -> &ScheduledEventCache {
        &self.scheduled_events
    }
}

impl Default for Caches {
    fn default() -> Self {
        Self::new(CacheFlags::default())
    }
}
