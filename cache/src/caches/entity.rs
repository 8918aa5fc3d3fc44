use tracing::warn;

use crate::model::{
    Emoji, Member, Message, Presence, Role, ScheduledEvent, Snowflake, StageInstance, Sticker,
    ThreadMember, VoiceState,
};
use crate::store::{DisabledGroupedStore, GroupedMapStore, GroupedStore, StoreValue};

/// An entity whose id is only unique within its owning parent.
pub trait GroupedEntity: StoreValue {
    /// Category name used in log fields.
    const KIND: &'static str;

    /// The owning parent's id, or `None` when the payload carried none.
    fn group_id(&self) -> Option<Snowflake>;

    fn entity_id(&self) -> Snowflake;
}

/// Typed facade over a grouped store, deriving keys from the entity itself.
pub struct EntityCache<V> {
    store: Box<dyn GroupedStore<Snowflake, Snowflake, V>>,
}

impl<V: GroupedEntity> EntityCache<V> {
    pub fn new(enabled: bool) -> Self {
        let store: Box<dyn GroupedStore<Snowflake, Snowflake, V>> = if enabled {
            Box::new(GroupedMapStore::new())
        } else {
            Box::new(DisabledGroupedStore::new())
        };
        Self { store }
    }

    pub fn get(&self, group_id: Snowflake, id: Snowflake) -> Option<V> {
        self.store.get(&group_id, &id)
    }

    /// Insert or replace. Returns false if the entity has no owning parent
    /// and was dropped.
    pub fn add(&self, value: V) -> bool {
        let Some(group_id) = value.group_id() else {
            warn!(kind = V::KIND, id = value.entity_id(), "dropping entity without a parent id");
            return false;
        };
        self.store.put(group_id, value.entity_id(), value);
        true
    }

    pub fn remove(&self, group_id: Snowflake, id: Snowflake) -> Option<V> {
        self.store.remove(&group_id, &id)
    }

    /// Mutate in place, returning the value as it was before.
    pub fn update(&self, group_id: Snowflake, id: Snowflake, f: impl FnOnce(&mut V)) -> Option<V> {
        let mut f = Some(f);
        self.store.update(&group_id, &id, &mut |v| {
            if let Some(f) = f.take() {
                f(v);
            }
        })
    }

    pub fn for_each(&self, mut f: impl FnMut(&V)) {
        self.store.for_each(&mut |_, _, v| f(v));
    }

    pub fn group_for_each(&self, group_id: Snowflake, mut f: impl FnMut(&V)) {
        self.store.group_for_each(&group_id, &mut |_, v| f(v));
    }

    pub fn group_values(&self, group_id: Snowflake) -> Vec<V> {
        let mut values = Vec::with_capacity(self.group_len(group_id));
        self.group_for_each(group_id, |v| values.push(v.clone()));
        values
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn group_len(&self, group_id: Snowflake) -> usize {
        self.store.group_len(&group_id)
    }

    /// Drop every entity owned by `group_id`. Returns how many went.
    pub fn remove_group(&self, group_id: Snowflake) -> usize {
        self.store.group_remove(&group_id)
    }

    pub fn remove_if(&self, predicate: impl Fn(&V) -> bool) {
        self.store.remove_if(&|_, _, v| predicate(v));
    }
}

impl GroupedEntity for Role {
    const KIND: &'static str = "role";

    fn group_id(&self) -> Option<Snowflake> {
        Some(self.guild_id)
    }

    fn entity_id(&self) -> Snowflake {
        self.id
    }
}

impl GroupedEntity for Member {
    const KIND: &'static str = "member";

    fn group_id(&self) -> Option<Snowflake> {
        Some(self.guild_id)
    }

    fn entity_id(&self) -> Snowflake {
        self.user.id
    }
}

impl GroupedEntity for ThreadMember {
    const KIND: &'static str = "thread_member";

    fn group_id(&self) -> Option<Snowflake> {
        Some(self.thread_id)
    }

    fn entity_id(&self) -> Snowflake {
        self.user_id
    }
}

impl GroupedEntity for Presence {
    const KIND: &'static str = "presence";

    fn group_id(&self) -> Option<Snowflake> {
        Some(self.guild_id)
    }

    fn entity_id(&self) -> Snowflake {
        self.user_id
    }
}

impl GroupedEntity for VoiceState {
    const KIND: &'static str = "voice_state";

    fn group_id(&self) -> Option<Snowflake> {
        Some(self.guild_id)
    }

    fn entity_id(&self) -> Snowflake {
        self.user_id
    }
}

impl GroupedEntity for Message {
    const KIND: &'static str = "message";

    fn group_id(&self) -> Option<Snowflake> {
        Some(self.channel_id)
    }

    fn entity_id(&self) -> Snowflake {
        self.id
    }
}

impl GroupedEntity for Emoji {
    const KIND: &'static str = "emoji";

    fn group_id(&self) -> Option<Snowflake> {
        Some(self.guild_id)
    }

    fn entity_id(&self) -> Snowflake {
        self.id
    }
}

impl GroupedEntity for Sticker {
    const KIND: &'static str = "sticker";

    fn group_id(&self) -> Option<Snowflake> {
        self.guild_id
    }

    fn entity_id(&self) -> Snowflake {
        self.id
    }
}

impl GroupedEntity for StageInstance {
    const KIND: &'static str = "stage_instance";

    fn group_id(&self) -> Option<Snowflake> {
        Some(self.guild_id)
    }

    fn entity_id(&self) -> Snowflake {
        self.id
    }
}

impl GroupedEntity for ScheduledEvent {
    const KIND: &'static str = "scheduled_event";

    fn group_id(&self) -> Option<Snowflake> {
        Some(self.guild_id)
    }

    fn entity_id(&self) -> Snowflake {
        self.id
    }
}

pub type RoleCache = EntityCache<Role>;
pub type MemberCache = EntityCache<Member>;
pub type ThreadMemberCache = EntityCache<ThreadMember>;
pub type PresenceCache = EntityCache<Presence>;
pub type VoiceStateCache = EntityCache<VoiceState>;
/// Grouped by channel id.
pub type MessageCache = EntityCache<Message>;
pub type EmojiCache = EntityCache<Emoji>;
pub type StickerCache = EntityCache<Sticker>;
pub type StageInstanceCache = EntityCache<StageInstance>;
pub type ScheduledEventCache = EntityCache<ScheduledEvent>;
