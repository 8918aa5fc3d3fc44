use super::Caches;
use crate::model::{
    CategoryChannel, ChannelId, ForumChannel, GuildChannel, GuildId, Member, Role, TextChannel,
    ThreadChannel, ThreadKind, VoiceChannel,
};
use crate::permissions::{Permissions, compute_base_permissions, compute_channel_permissions};

// ── Permissions ──

impl Caches {
    /// Guild-level permissions of `member`, from cached roles and ownership.
    pub fn member_permissions(&self, member: &Member) -> Permissions {
        self.base_permissions(member, member.is_timed_out())
    }

    /// Effective permissions of `member` in `channel`. Threads resolve
    /// through their parent's overwrites when the parent is cached.
    pub fn member_permissions_in_channel(&self, channel: &GuildChannel, member: &Member) -> Permissions {
        let timed_out = member.is_timed_out();
        let base = self.base_permissions(member, timed_out);

        let parent = channel
            .as_thread()
            .and_then(|thread| self.channels.get(thread.parent_id));
        let overwrites = parent
            .as_ref()
            .unwrap_or(channel)
            .permission_overwrites()
            .as_slice();

        compute_channel_permissions(
            base,
            channel.guild_id(),
            &member.roles,
            member.user_id(),
            overwrites,
            timed_out,
        )
    }

    fn base_permissions(&self, member: &Member, timed_out: bool) -> Permissions {
        let guild_id = member.guild_id;
        let is_owner = self
            .guilds
            .get(guild_id)
            .is_some_and(|guild| guild.owner_id == member.user_id());
        let everyone = self.roles.get(guild_id, guild_id).map(|role| role.permissions);
        let roles = self
            .member_roles(member)
            .into_iter()
            .map(|role| role.permissions);
        compute_base_permissions(is_owner, everyone, roles, timed_out)
    }
}

// ── Joins ──

impl Caches {
    /// The cached roles in `member`'s role list. Unknown ids are skipped.
    pub fn member_roles(&self, member: &Member) -> Vec<Role> {
        member
            .roles
            .iter()
            .filter_map(|id| self.roles.get(member.guild_id, *id))
            .collect()
    }

    /// Members with a voice state connected to `channel`.
    pub fn audio_channel_members(&self, channel: &GuildChannel) -> Vec<Member> {
        if !channel.is_audio_channel() {
            return Vec::new();
        }
        let guild_id = channel.guild_id();
        let channel_id = channel.id();
        let mut members = Vec::new();
        self.voice_states.group_for_each(guild_id, |state| {
            if state.channel_id == Some(channel_id)
                && let Some(member) = self.members.get(guild_id, state.user_id)
            {
                members.push(member);
            }
        });
        members
    }

    /// The current user's membership in `guild_id`.
    pub fn self_member(&self, guild_id: GuildId) -> Option<Member> {
        let me = self.self_user.get()?;
        self.members.get(guild_id, me.id())
    }

    pub fn threads_in_channel(&self, channel_id: ChannelId) -> Vec<ThreadChannel> {
        self.channels.threads_in(channel_id)
    }
}

// ── Narrowing ──

impl Caches {
    /// A cached channel that can hold messages directly.
    pub fn message_channel(&self, id: ChannelId) -> Option<GuildChannel> {
        self.channels.get(id).filter(GuildChannel::is_message_channel)
    }

    /// A cached voice or stage channel.
    pub fn audio_channel(&self, id: ChannelId) -> Option<GuildChannel> {
        self.channels.get(id).filter(GuildChannel::is_audio_channel)
    }

    pub fn text_channel(&self, id: ChannelId) -> Option<TextChannel> {
        self.channels.get(id)?.into_text()
    }

    pub fn news_channel(&self, id: ChannelId) -> Option<TextChannel> {
        self.channels.get(id)?.into_news()
    }

    pub fn voice_channel(&self, id: ChannelId) -> Option<VoiceChannel> {
        self.channels.get(id)?.into_voice()
    }

    pub fn stage_channel(&self, id: ChannelId) -> Option<VoiceChannel> {
        self.channels.get(id)?.into_stage()
    }

    pub fn category_channel(&self, id: ChannelId) -> Option<CategoryChannel> {
        self.channels.get(id)?.into_category()
    }

    pub fn forum_channel(&self, id: ChannelId) -> Option<ForumChannel> {
        self.channels.get(id)?.into_forum()
    }

    pub fn media_channel(&self, id: ChannelId) -> Option<ForumChannel> {
        self.channels.get(id)?.into_media()
    }

    pub fn thread(&self, id: ChannelId) -> Option<ThreadChannel> {
        self.channels.get(id)?.into_thread()
    }

    pub fn news_thread(&self, id: ChannelId) -> Option<ThreadChannel> {
        self.thread_of_kind(id, ThreadKind::News)
    }

    pub fn public_thread(&self, id: ChannelId) -> Option<ThreadChannel> {
        self.thread_of_kind(id, ThreadKind::Public)
    }

    pub fn private_thread(&self, id: ChannelId) -> Option<ThreadChannel> {
        self.thread_of_kind(id, ThreadKind::Private)
    }

    fn thread_of_kind(&self, id: ChannelId, kind: ThreadKind) -> Option<ThreadChannel> {
        self.thread(id).filter(|thread| thread.kind == kind)
    }
}
