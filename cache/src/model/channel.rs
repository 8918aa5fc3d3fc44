use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ChannelId, GuildId, MessageId, RoleId, UserId};
use crate::permissions::Permissions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverwriteKind {
    Role,
    Member,
}

/// A channel-level permission adjustment for one role or one member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionOverwrite {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: OverwriteKind,
    #[serde(default)]
    pub allow: Permissions,
    #[serde(default)]
    pub deny: Permissions,
}

impl PermissionOverwrite {
    pub fn role(id: RoleId, allow: Permissions, deny: Permissions) -> Self {
        Self {
            id,
            kind: OverwriteKind::Role,
            allow,
            deny,
        }
    }

    pub fn member(id: UserId, allow: Permissions, deny: Permissions) -> Self {
        Self {
            id,
            kind: OverwriteKind::Member,
            allow,
            deny,
        }
    }
}

/// The overwrite list attached to a channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionOverwrites(pub Vec<PermissionOverwrite>);

static NO_OVERWRITES: PermissionOverwrites = PermissionOverwrites(Vec::new());

impl PermissionOverwrites {
    pub fn role(&self, id: RoleId) -> Option<&PermissionOverwrite> {
        self.find(OverwriteKind::Role, id)
    }

    pub fn member(&self, id: UserId) -> Option<&PermissionOverwrite> {
        self.find(OverwriteKind::Member, id)
    }

    pub fn as_slice(&self) -> &[PermissionOverwrite] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Replace the overwrite for the same target, or append a new one.
    pub fn upsert(&mut self, overwrite: PermissionOverwrite) {
        match self
            .0
            .iter_mut()
            .find(|ov| ov.kind == overwrite.kind && ov.id == overwrite.id)
        {
            Some(existing) => *existing = overwrite,
            None => self.0.push(overwrite),
        }
    }

    fn find(&self, kind: OverwriteKind, id: u64) -> Option<&PermissionOverwrite> {
        self.0.iter().find(|ov| ov.kind == kind && ov.id == id)
    }
}

impl From<Vec<PermissionOverwrite>> for PermissionOverwrites {
    fn from(v: Vec<PermissionOverwrite>) -> Self {
        Self(v)
    }
}

/// Text and announcement channels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextChannel {
    pub id: ChannelId,
    #[serde(default)]
    pub guild_id: GuildId,
    pub name: String,
    #[serde(default)]
    pub position: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default)]
    pub nsfw: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ChannelId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message_id: Option<MessageId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_pin_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub rate_limit_per_user: u32,
    #[serde(default)]
    pub permission_overwrites: PermissionOverwrites,
}

/// Voice and stage channels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceChannel {
    pub id: ChannelId,
    #[serde(default)]
    pub guild_id: GuildId,
    pub name: String,
    #[serde(default)]
    pub position: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ChannelId>,
    #[serde(default)]
    pub bitrate: u32,
    #[serde(default)]
    pub user_limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rtc_region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message_id: Option<MessageId>,
    #[serde(default)]
    pub permission_overwrites: PermissionOverwrites,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryChannel {
    pub id: ChannelId,
    #[serde(default)]
    pub guild_id: GuildId,
    pub name: String,
    #[serde(default)]
    pub position: i32,
    #[serde(default)]
    pub permission_overwrites: PermissionOverwrites,
}

/// Forum and media channels. Their `last_message_id` tracks the newest thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForumChannel {
    pub id: ChannelId,
    #[serde(default)]
    pub guild_id: GuildId,
    pub name: String,
    #[serde(default)]
    pub position: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default)]
    pub nsfw: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ChannelId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message_id: Option<ChannelId>,
    #[serde(default)]
    pub permission_overwrites: PermissionOverwrites,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadKind {
    News,
    Public,
    Private,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThreadMetadata {
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub auto_archive_duration: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive_timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadChannel {
    pub id: ChannelId,
    #[serde(default)]
    pub guild_id: GuildId,
    pub parent_id: ChannelId,
    #[serde(rename = "thread_type")]
    pub kind: ThreadKind,
    pub name: String,
    #[serde(default)]
    pub owner_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message_id: Option<MessageId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_pin_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub message_count: u32,
    #[serde(default)]
    pub total_message_sent: u32,
    #[serde(default)]
    pub member_count: u32,
    #[serde(default)]
    pub thread_metadata: ThreadMetadata,
}

/// Every channel kind that lives in a guild.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GuildChannel {
    Text(TextChannel),
    News(TextChannel),
    Voice(VoiceChannel),
    Stage(VoiceChannel),
    Category(CategoryChannel),
    Forum(ForumChannel),
    Media(ForumChannel),
    Thread(ThreadChannel),
}

impl GuildChannel {
    pub fn id(&self) -> ChannelId {
        match self {
            Self::Text(c) | Self::News(c) => c.id,
            Self::Voice(c) | Self::Stage(c) => c.id,
            Self::Category(c) => c.id,
            Self::Forum(c) | Self::Media(c) => c.id,
            Self::Thread(c) => c.id,
        }
    }

    pub fn guild_id(&self) -> GuildId {
        match self {
            Self::Text(c) | Self::News(c) => c.guild_id,
            Self::Voice(c) | Self::Stage(c) => c.guild_id,
            Self::Category(c) => c.guild_id,
            Self::Forum(c) | Self::Media(c) => c.guild_id,
            Self::Thread(c) => c.guild_id,
        }
    }

    pub fn set_guild_id(&mut self, guild_id: GuildId) {
        match self {
            Self::Text(c) | Self::News(c) => c.guild_id = guild_id,
            Self::Voice(c) | Self::Stage(c) => c.guild_id = guild_id,
            Self::Category(c) => c.guild_id = guild_id,
            Self::Forum(c) | Self::Media(c) => c.guild_id = guild_id,
            Self::Thread(c) => c.guild_id = guild_id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Text(c) | Self::News(c) => &c.name,
            Self::Voice(c) | Self::Stage(c) => &c.name,
            Self::Category(c) => &c.name,
            Self::Forum(c) | Self::Media(c) => &c.name,
            Self::Thread(c) => &c.name,
        }
    }

    /// Threads carry no overwrites of their own; they inherit their parent's.
    pub fn permission_overwrites(&self) -> &PermissionOverwrites {
        match self {
            Self::Text(c) | Self::News(c) => &c.permission_overwrites,
            Self::Voice(c) | Self::Stage(c) => &c.permission_overwrites,
            Self::Category(c) => &c.permission_overwrites,
            Self::Forum(c) | Self::Media(c) => &c.permission_overwrites,
            Self::Thread(_) => &NO_OVERWRITES,
        }
    }

    pub fn parent_id(&self) -> Option<ChannelId> {
        match self {
            Self::Text(c) | Self::News(c) => c.parent_id,
            Self::Voice(c) | Self::Stage(c) => c.parent_id,
            Self::Category(_) => None,
            Self::Forum(c) | Self::Media(c) => c.parent_id,
            Self::Thread(c) => Some(c.parent_id),
        }
    }

    pub fn last_message_id(&self) -> Option<MessageId> {
        match self {
            Self::Text(c) | Self::News(c) => c.last_message_id,
            Self::Voice(c) | Self::Stage(c) => c.last_message_id,
            Self::Category(_) => None,
            Self::Forum(c) | Self::Media(c) => c.last_message_id,
            Self::Thread(c) => c.last_message_id,
        }
    }

    /// Advance the last-message pointer. Returns false for channels that
    /// cannot hold messages.
    pub fn set_last_message_id(&mut self, id: MessageId) -> bool {
        match self {
            Self::Text(c) | Self::News(c) => c.last_message_id = Some(id),
            Self::Voice(c) | Self::Stage(c) => c.last_message_id = Some(id),
            Self::Thread(c) => c.last_message_id = Some(id),
            Self::Category(_) | Self::Forum(_) | Self::Media(_) => return false,
        }
        true
    }

    pub fn last_pin_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Text(c) | Self::News(c) => c.last_pin_timestamp,
            Self::Thread(c) => c.last_pin_timestamp,
            _ => None,
        }
    }

    /// Returns false for channels that have no pins.
    pub fn set_last_pin_timestamp(&mut self, ts: Option<DateTime<Utc>>) -> bool {
        match self {
            Self::Text(c) | Self::News(c) => c.last_pin_timestamp = ts,
            Self::Thread(c) => c.last_pin_timestamp = ts,
            _ => return false,
        }
        true
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::News(_) => "news",
            Self::Voice(_) => "voice",
            Self::Stage(_) => "stage",
            Self::Category(_) => "category",
            Self::Forum(_) => "forum",
            Self::Media(_) => "media",
            Self::Thread(_) => "thread",
        }
    }

    // ── Narrowing ──

    /// Channels that accept messages directly (text, news, voice, stage, threads).
    pub fn is_message_channel(&self) -> bool {
        matches!(
            self,
            Self::Text(_) | Self::News(_) | Self::Voice(_) | Self::Stage(_) | Self::Thread(_)
        )
    }

    pub fn is_audio_channel(&self) -> bool {
        matches!(self, Self::Voice(_) | Self::Stage(_))
    }

    pub fn is_thread(&self) -> bool {
        matches!(self, Self::Thread(_))
    }

    pub fn as_thread(&self) -> Option<&ThreadChannel> {
        match self {
            Self::Thread(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_thread_mut(&mut self) -> Option<&mut ThreadChannel> {
        match self {
            Self::Thread(t) => Some(t),
            _ => None,
        }
    }

    pub fn into_thread(self) -> Option<ThreadChannel> {
        match self {
            Self::Thread(t) => Some(t),
            _ => None,
        }
    }

    pub fn into_text(self) -> Option<TextChannel> {
        match self {
            Self::Text(c) => Some(c),
            _ => None,
        }
    }

    pub fn into_news(self) -> Option<TextChannel> {
        match self {
            Self::News(c) => Some(c),
            _ => None,
        }
    }

    pub fn into_voice(self) -> Option<VoiceChannel> {
        match self {
            Self::Voice(c) => Some(c),
            _ => None,
        }
    }

    pub fn into_stage(self) -> Option<VoiceChannel> {
        match self {
            Self::Stage(c) => Some(c),
            _ => None,
        }
    }

    pub fn into_category(self) -> Option<CategoryChannel> {
        match self {
            Self::Category(c) => Some(c),
            _ => None,
        }
    }

    pub fn into_forum(self) -> Option<ForumChannel> {
        match self {
            Self::Forum(c) => Some(c),
            _ => None,
        }
    }

    pub fn into_media(self) -> Option<ForumChannel> {
        match self {
            Self::Media(c) => Some(c),
            _ => None,
        }
    }
}

impl From<ThreadChannel> for GuildChannel {
    fn from(thread: ThreadChannel) -> Self {
        Self::Thread(thread)
    }
}

impl TextChannel {
    pub fn new(guild_id: GuildId, id: ChannelId, name: impl Into<String>) -> Self {
        Self {
            id,
            guild_id,
            name: name.into(),
            position: 0,
            topic: None,
            nsfw: false,
            parent_id: None,
            last_message_id: None,
            last_pin_timestamp: None,
            rate_limit_per_user: 0,
            permission_overwrites: PermissionOverwrites::default(),
        }
    }
}

impl VoiceChannel {
    pub fn new(guild_id: GuildId, id: ChannelId, name: impl Into<String>) -> Self {
        Self {
            id,
            guild_id,
            name: name.into(),
            position: 0,
            parent_id: None,
            bitrate: 64_000,
            user_limit: 0,
            rtc_region: None,
            last_message_id: None,
            permission_overwrites: PermissionOverwrites::default(),
        }
    }
}

impl ThreadChannel {
    pub fn new(
        guild_id: GuildId,
        parent_id: ChannelId,
        id: ChannelId,
        kind: ThreadKind,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            guild_id,
            parent_id,
            kind,
            name: name.into(),
            owner_id: 0,
            last_message_id: None,
            last_pin_timestamp: None,
            message_count: 0,
            total_message_sent: 0,
            member_count: 0,
            thread_metadata: ThreadMetadata::default(),
        }
    }
}
