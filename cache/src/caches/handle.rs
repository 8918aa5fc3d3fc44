use std::collections::HashSet;

use tracing::{debug, info, trace};

use super::Caches;
use crate::events::{
    ChannelCreate, ChannelDelete, ChannelPinsUpdate, ChannelUpdate, GatewayEvent, GuildCreate,
    GuildDelete, GuildEmojisUpdate, GuildMemberAdd, GuildMemberRemove, GuildMemberUpdate,
    GuildMembersChunk, GuildRoleCreate, GuildRoleDelete, GuildRoleUpdate,
    GuildScheduledEventCreate, GuildScheduledEventDelete, GuildScheduledEventUpdate,
    GuildStickersUpdate, GuildUpdate, MessageCreate, MessageDelete, MessageDeleteBulk,
    MessageUpdate, PresenceUpdate, Ready, StageInstanceCreate, StageInstanceDelete,
    StageInstanceUpdate, ThreadCreate, ThreadDelete, ThreadListSync, ThreadMemberUpdate,
    ThreadMembersUpdate, ThreadUpdate, UserUpdate, VoiceStateUpdate,
};
use crate::model::{ChannelId, GuildChannel, GuildId};
use crate::permissions::Permissions;

impl Caches {
    /// Apply one gateway event and return it with its `old_*` / `removed_*`
    /// fields filled from the values it displaced.
    ///
    /// Never fails: anything not cached simply leaves those fields empty.
    pub fn handle_event(&self, mut event: GatewayEvent) -> GatewayEvent {
        trace!(event = event.name(), "applying event");
        match &mut event {
            GatewayEvent::Ready(e) => self.apply_ready(e),
            GatewayEvent::UserUpdate(e) => self.apply_user_update(e),

            GatewayEvent::MessageCreate(e) => self.apply_message_create(e),
            GatewayEvent::MessageUpdate(e) => self.apply_message_update(e),
            GatewayEvent::MessageDelete(e) => self.apply_message_delete(e),
            GatewayEvent::MessageDeleteBulk(e) => self.apply_message_delete_bulk(e),

            GatewayEvent::GuildCreate(e) => self.apply_guild_create(e),
            GatewayEvent::GuildUpdate(e) => self.apply_guild_update(e),
            GatewayEvent::GuildDelete(e) => self.apply_guild_delete(e),

            GatewayEvent::ChannelCreate(e) => self.apply_channel_create(e),
            GatewayEvent::ChannelUpdate(e) => self.apply_channel_update(e),
            GatewayEvent::ChannelDelete(e) => self.apply_channel_delete(e),
            GatewayEvent::ChannelPinsUpdate(e) => self.apply_channel_pins_update(e),

            GatewayEvent::ThreadCreate(e) => self.apply_thread_create(e),
            GatewayEvent::ThreadUpdate(e) => self.apply_thread_update(e),
            GatewayEvent::ThreadDelete(e) => self.apply_thread_delete(e),
            GatewayEvent::ThreadListSync(e) => self.apply_thread_list_sync(e),
            GatewayEvent::ThreadMemberUpdate(e) => self.apply_thread_member_update(e),
            GatewayEvent::ThreadMembersUpdate(e) => self.apply_thread_members_update(e),

            GatewayEvent::GuildRoleCreate(e) => self.apply_role_create(e),
            GatewayEvent::GuildRoleUpdate(e) => self.apply_role_update(e),
            GatewayEvent::GuildRoleDelete(e) => self.apply_role_delete(e),

            GatewayEvent::GuildScheduledEventCreate(e) => self.apply_scheduled_event_create(e),
            GatewayEvent::GuildScheduledEventUpdate(e) => self.apply_scheduled_event_update(e),
            GatewayEvent::GuildScheduledEventDelete(e) => self.apply_scheduled_event_delete(e),

            GatewayEvent::StageInstanceCreate(e) => self.apply_stage_instance_create(e),
            GatewayEvent::StageInstanceUpdate(e) => self.apply_stage_instance_update(e),
            GatewayEvent::StageInstanceDelete(e) => self.apply_stage_instance_delete(e),

            GatewayEvent::GuildMemberAdd(e) => self.apply_member_add(e),
            GatewayEvent::GuildMemberUpdate(e) => self.apply_member_update(e),
            GatewayEvent::GuildMemberRemove(e) => self.apply_member_remove(e),
            GatewayEvent::GuildMembersChunk(e) => self.apply_members_chunk(e),

            GatewayEvent::GuildEmojisUpdate(e) => self.apply_emojis_update(e),
            GatewayEvent::GuildStickersUpdate(e) => self.apply_stickers_update(e),

            GatewayEvent::PresenceUpdate(e) => self.apply_presence_update(e),
            GatewayEvent::VoiceStateUpdate(e) => self.apply_voice_state_update(e),

            GatewayEvent::TypingStart(_)
            | GatewayEvent::GuildBanAdd(_)
            | GatewayEvent::GuildBanRemove(_)
            | GatewayEvent::VoiceServerUpdate(_)
            | GatewayEvent::WebhooksUpdate(_)
            | GatewayEvent::InviteCreate(_)
            | GatewayEvent::InviteDelete(_) => {}
        }
        event
    }

    // ── Session ──

    fn apply_ready(&self, e: &mut Ready) {
        self.self_user.set(e.user.clone());
        for guild in &e.guilds {
            self.guilds.set_unready(guild.id, true);
        }
        info!(user_id = e.user.id(), guilds = e.guilds.len(), "session ready");
    }

    fn apply_user_update(&self, e: &mut UserUpdate) {
        e.old_user = self.self_user.set(e.user.clone());
    }

    // ── Messages ──

    fn apply_message_create(&self, e: &mut MessageCreate) {
        let message_id = e.message.id;
        let previous = self.channels.update(e.message.channel_id, |channel| {
            channel.set_last_message_id(message_id);
            if let Some(thread) = channel.as_thread_mut() {
                thread.total_message_sent = thread.total_message_sent.saturating_add(1);
                thread.message_count = thread.message_count.saturating_add(1);
            }
        });
        if e.message.guild_id.is_none()
            && let Some(channel) = previous
        {
            e.message.guild_id = Some(channel.guild_id());
        }
        self.messages.add(e.message.clone());
    }

    fn apply_message_update(&self, e: &mut MessageUpdate) {
        e.old_message = self.messages.get(e.message.channel_id, e.message.id);
        self.messages.add(e.message.clone());
    }

    fn apply_message_delete(&self, e: &mut MessageDelete) {
        e.old_message = self.messages.remove(e.channel_id, e.id);
        self.decrement_thread_messages(e.channel_id, 1);
    }

    fn apply_message_delete_bulk(&self, e: &mut MessageDeleteBulk) {
        let channel_id = e.channel_id;
        e.old_messages = e
            .ids
            .iter()
            .filter_map(|id| self.messages.remove(channel_id, *id))
            .collect();
        self.decrement_thread_messages(channel_id, e.ids.len());
    }

    fn decrement_thread_messages(&self, channel_id: ChannelId, n: usize) {
        let n = u32::try_from(n).unwrap_or(u32::MAX);
        self.channels.update(channel_id, |channel| {
            if let Some(thread) = channel.as_thread_mut() {
                thread.message_count = thread.message_count.saturating_sub(n);
            }
        });
    }

    // ── Guilds ──

    fn apply_guild_create(&self, e: &mut GuildCreate) {
        let guild_id = e.guild.id;
        let was_unready = self.guilds.is_unready(guild_id);
        let was_unavailable = self.guilds.is_unavailable(guild_id);

        self.guilds.add(e.guild.clone());

        for channel in &mut e.channels {
            channel.set_guild_id(guild_id);
            self.channels.add(channel.clone());
        }
        for thread in &mut e.threads {
            thread.guild_id = guild_id;
            self.channels.add(GuildChannel::Thread(thread.clone()));
        }
        for role in &mut e.roles {
            role.guild_id = guild_id;
            self.roles.add(role.clone());
        }
        for member in &mut e.members {
            member.guild_id = guild_id;
            self.members.add(member.clone());
        }
        for state in &mut e.voice_states {
            state.guild_id = guild_id;
            self.voice_states.add(state.clone());
        }
        for emoji in &mut e.emojis {
            emoji.guild_id = guild_id;
            self.emojis.add(emoji.clone());
        }
        for sticker in &mut e.stickers {
            sticker.guild_id = Some(guild_id);
            self.stickers.add(sticker.clone());
        }
        for stage in &mut e.stage_instances {
            stage.guild_id = guild_id;
            self.stage_instances.add(stage.clone());
        }
        for event in &mut e.guild_scheduled_events {
            event.guild_id = guild_id;
            self.scheduled_events.add(event.clone());
        }
        for presence in &mut e.presences {
            presence.guild_id = guild_id;
            self.presences.add(presence.clone());
        }

        if was_unready {
            self.guilds.set_unready(guild_id, false);
        }
        if was_unavailable {
            self.guilds.set_unavailable(guild_id, false);
        }

        debug!(
            guild_id,
            channels = e.channels.len() + e.threads.len(),
            roles = e.roles.len(),
            members = e.members.len(),
            was_unready,
            was_unavailable,
            "guild hydrated"
        );
    }

    fn apply_guild_update(&self, e: &mut GuildUpdate) {
        e.old_guild = self.guilds.get(e.guild.id);
        let mut guild = e.guild.clone();
        // Only GUILD_CREATE carries these; keep what hydration recorded
        if let Some(old) = &e.old_guild {
            guild.member_count = old.member_count;
            guild.joined_at = guild.joined_at.or(old.joined_at);
        }
        self.guilds.add(guild);
    }

    fn apply_guild_delete(&self, e: &mut GuildDelete) {
        let guild_id = e.id;
        e.old_guild = self.guilds.remove(guild_id);

        self.roles.remove_group(guild_id);
        self.members.remove_group(guild_id);
        self.voice_states.remove_group(guild_id);
        self.presences.remove_group(guild_id);
        self.emojis.remove_group(guild_id);
        self.stickers.remove_group(guild_id);
        self.stage_instances.remove_group(guild_id);
        self.scheduled_events.remove_group(guild_id);

        let channels = self.channels.remove_guild(guild_id);
        for channel in &channels {
            if channel.is_thread() {
                self.thread_members.remove_group(channel.id());
            }
            self.messages.remove_group(channel.id());
        }
        self.messages.remove_if(|m| m.guild_id == Some(guild_id));

        if e.unavailable {
            self.guilds.set_unavailable(guild_id, true);
        } else {
            self.guilds.set_unready(guild_id, false);
            self.guilds.set_unavailable(guild_id, false);
        }

        info!(
            guild_id,
            unavailable = e.unavailable,
            channels = channels.len(),
            "guild removed"
        );
    }

    // ── Channels ──

    fn apply_channel_create(&self, e: &mut ChannelCreate) {
        self.channels.add(e.channel.clone());
    }

    fn apply_channel_update(&self, e: &mut ChannelUpdate) {
        let channel_id = e.channel.id();
        e.old_channel = self.channels.get(channel_id);
        self.channels.add(e.channel.clone());

        if !matches!(e.channel, GuildChannel::Text(_) | GuildChannel::News(_)) {
            return;
        }
        let Some(me) = self.self_member(e.channel.guild_id()) else {
            return;
        };
        if self
            .member_permissions_in_channel(&e.channel, &me)
            .contains(Permissions::VIEW_CHANNEL)
        {
            return;
        }
        let threads = self.channels.threads_in(channel_id);
        for thread in &threads {
            self.remove_thread(thread.id);
        }
        debug!(
            channel_id,
            threads = threads.len(),
            "channel no longer visible, dropped its threads"
        );
    }

    fn apply_channel_delete(&self, e: &mut ChannelDelete) {
        let channel_id = e.channel.id();
        e.old_channel = self.remove_thread(channel_id);
        for thread in self.channels.threads_in(channel_id) {
            self.remove_thread(thread.id);
        }
    }

    fn apply_channel_pins_update(&self, e: &mut ChannelPinsUpdate) {
        let ts = e.last_pin_timestamp;
        e.old_last_pin_timestamp = self
            .channels
            .update(e.channel_id, |channel| {
                channel.set_last_pin_timestamp(ts);
            })
            .and_then(|old| old.last_pin_timestamp());
    }

    /// Remove a channel together with its messages and thread members.
    fn remove_thread(&self, channel_id: ChannelId) -> Option<GuildChannel> {
        self.thread_members.remove_group(channel_id);
        self.messages.remove_group(channel_id);
        self.channels.remove(channel_id)
    }

    // ── Threads ──

    fn apply_thread_create(&self, e: &mut ThreadCreate) {
        self.channels.add(GuildChannel::Thread(e.thread.clone()));
        if let Some(member) = &mut e.member {
            member.thread_id = e.thread.id;
            if member.user_id == 0
                && let Some(me) = self.self_user.get()
            {
                member.user_id = me.id();
            }
            self.thread_members.add(member.clone());
        }
    }

    fn apply_thread_update(&self, e: &mut ThreadUpdate) {
        e.old_thread = self
            .channels
            .get(e.thread.id)
            .and_then(GuildChannel::into_thread);
        self.channels.add(GuildChannel::Thread(e.thread.clone()));
    }

    fn apply_thread_delete(&self, e: &mut ThreadDelete) {
        e.old_thread = self.remove_thread(e.id).and_then(GuildChannel::into_thread);
    }

    fn apply_thread_list_sync(&self, e: &mut ThreadListSync) {
        for thread in &mut e.threads {
            thread.guild_id = e.guild_id;
            self.channels.add(GuildChannel::Thread(thread.clone()));
        }
        for member in &e.members {
            self.thread_members.add(member.clone());
        }
        debug!(
            guild_id = e.guild_id,
            threads = e.threads.len(),
            members = e.members.len(),
            "thread list synced"
        );
    }

    fn apply_thread_member_update(&self, e: &mut ThreadMemberUpdate) {
        self.thread_members.add(e.member.clone());
    }

    fn apply_thread_members_update(&self, e: &mut ThreadMembersUpdate) {
        let thread_id = e.id;
        let guild_id = e.guild_id;
        let member_count = e.member_count;

        self.channels.update(thread_id, |channel| {
            if let Some(thread) = channel.as_thread_mut() {
                thread.member_count = member_count;
            }
        });

        for added in &mut e.added_members {
            added.thread_member.thread_id = thread_id;
            added.member.guild_id = guild_id;
            self.thread_members.add(added.thread_member.clone());
            self.members.add(added.member.clone());
            if let Some(presence) = &mut added.presence {
                presence.guild_id = guild_id;
                self.presences.add(presence.clone());
            }
        }

        e.removed_members = e
            .removed_member_ids
            .iter()
            .filter_map(|user_id| self.thread_members.remove(thread_id, *user_id))
            .collect();
    }

    // ── Roles ──

    fn apply_role_create(&self, e: &mut GuildRoleCreate) {
        e.role.guild_id = e.guild_id;
        self.roles.add(e.role.clone());
    }

    fn apply_role_update(&self, e: &mut GuildRoleUpdate) {
        e.role.guild_id = e.guild_id;
        e.old_role = self.roles.get(e.guild_id, e.role.id);
        self.roles.add(e.role.clone());
    }

    fn apply_role_delete(&self, e: &mut GuildRoleDelete) {
        e.old_role = self.roles.remove(e.guild_id, e.role_id);
        self.strip_role_from_members(e.guild_id, e.role_id);
    }

    fn strip_role_from_members(&self, guild_id: GuildId, role_id: u64) {
        let mut holders = Vec::new();
        self.members.group_for_each(guild_id, |m| {
            if m.roles.contains(&role_id) {
                holders.push(m.user_id());
            }
        });
        for user_id in holders {
            self.members
                .update(guild_id, user_id, |m| m.roles.retain(|id| *id != role_id));
        }
    }

    // ── Scheduled events ──

    fn apply_scheduled_event_create(&self, e: &mut GuildScheduledEventCreate) {
        self.scheduled_events.add(e.event.clone());
    }

    fn apply_scheduled_event_update(&self, e: &mut GuildScheduledEventUpdate) {
        e.old_event = self.scheduled_events.get(e.event.guild_id, e.event.id);
        self.scheduled_events.add(e.event.clone());
    }

    fn apply_scheduled_event_delete(&self, e: &mut GuildScheduledEventDelete) {
        e.old_event = self.scheduled_events.remove(e.event.guild_id, e.event.id);
    }

    // ── Stage instances ──

    fn apply_stage_instance_create(&self, e: &mut StageInstanceCreate) {
        self.stage_instances.add(e.stage_instance.clone());
    }

    fn apply_stage_instance_update(&self, e: &mut StageInstanceUpdate) {
        let stage = &e.stage_instance;
        e.old_stage_instance = self.stage_instances.get(stage.guild_id, stage.id);
        self.stage_instances.add(stage.clone());
    }

    fn apply_stage_instance_delete(&self, e: &mut StageInstanceDelete) {
        let stage = &e.stage_instance;
        e.old_stage_instance = self.stage_instances.remove(stage.guild_id, stage.id);
    }

    // ── Members ──

    fn apply_member_add(&self, e: &mut GuildMemberAdd) {
        self.guilds.update(e.member.guild_id, |g| {
            g.member_count = g.member_count.saturating_add(1);
        });
        self.members.add(e.member.clone());
    }

    fn apply_member_update(&self, e: &mut GuildMemberUpdate) {
        e.old_member = self.members.get(e.member.guild_id, e.member.user_id());
        self.members.add(e.member.clone());
    }

    fn apply_member_remove(&self, e: &mut GuildMemberRemove) {
        self.guilds.update(e.guild_id, |g| {
            g.member_count = g.member_count.saturating_sub(1);
        });
        e.old_member = self.members.remove(e.guild_id, e.user.id);
    }

    fn apply_members_chunk(&self, e: &mut GuildMembersChunk) {
        for member in &mut e.members {
            member.guild_id = e.guild_id;
            self.members.add(member.clone());
        }
        for presence in &mut e.presences {
            presence.guild_id = e.guild_id;
            self.presences.add(presence.clone());
        }
        debug!(
            guild_id = e.guild_id,
            chunk = e.chunk_index,
            of = e.chunk_count,
            members = e.members.len(),
            "member chunk applied"
        );
    }

    // ── Emoji & stickers ──

    fn apply_emojis_update(&self, e: &mut GuildEmojisUpdate) {
        let guild_id = e.guild_id;
        let keep: HashSet<u64> = e.emojis.iter().map(|emoji| emoji.id).collect();

        let mut stale = Vec::new();
        self.emojis.group_for_each(guild_id, |emoji| {
            if !keep.contains(&emoji.id) {
                stale.push(emoji.id);
            }
        });
        e.removed_emojis = stale
            .into_iter()
            .filter_map(|id| self.emojis.remove(guild_id, id))
            .collect();

        for emoji in &mut e.emojis {
            emoji.guild_id = guild_id;
            self.emojis.add(emoji.clone());
        }
    }

    fn apply_stickers_update(&self, e: &mut GuildStickersUpdate) {
        let guild_id = e.guild_id;
        let keep: HashSet<u64> = e.stickers.iter().map(|sticker| sticker.id).collect();

        let mut stale = Vec::new();
        self.stickers.group_for_each(guild_id, |sticker| {
            if !keep.contains(&sticker.id) {
                stale.push(sticker.id);
            }
        });
        e.removed_stickers = stale
            .into_iter()
            .filter_map(|id| self.stickers.remove(guild_id, id))
            .collect();

        for sticker in &mut e.stickers {
            sticker.guild_id = Some(guild_id);
            self.stickers.add(sticker.clone());
        }
    }

    // ── Presence & voice ──

    fn apply_presence_update(&self, e: &mut PresenceUpdate) {
        let presence = &e.presence;
        e.old_presence = self.presences.get(presence.guild_id, presence.user_id);
        self.presences.add(presence.clone());
    }

    fn apply_voice_state_update(&self, e: &mut VoiceStateUpdate) {
        let guild_id = e.voice_state.guild_id;
        let user_id = e.voice_state.user_id;

        e.old_voice_state = self.voice_states.get(guild_id, user_id);
        if e.voice_state.channel_id.is_none() {
            self.voice_states.remove(guild_id, user_id);
        } else {
            self.voice_states.add(e.voice_state.clone());
        }

        if let Some(member) = &mut e.member {
            member.guild_id = guild_id;
            self.members.add(member.clone());
        }
    }
}
