use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    ChannelId, CurrentUser, Emoji, Guild, GuildChannel, GuildId, Member, Message, MessageId,
    Presence, Role, RoleId, ScheduledEvent, StageInstance, Sticker, ThreadChannel, ThreadMember,
    UnavailableGuild, User, UserId, VoiceState,
};

/// A decoded gateway dispatch, in the wire's `{"t": NAME, "d": {...}}` shape.
///
/// Fields prefixed `old_` / `removed_` are never read from the wire; the
/// cache fills them with the values an event displaced before the event is
/// passed on to listeners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "d", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GatewayEvent {
    Ready(Ready),
    UserUpdate(UserUpdate),

    MessageCreate(MessageCreate),
    MessageUpdate(MessageUpdate),
    MessageDelete(MessageDelete),
    MessageDeleteBulk(MessageDeleteBulk),

    GuildCreate(Box<GuildCreate>),
    GuildUpdate(GuildUpdate),
    GuildDelete(GuildDelete),

    ChannelCreate(ChannelCreate),
    ChannelUpdate(ChannelUpdate),
    ChannelDelete(ChannelDelete),
    ChannelPinsUpdate(ChannelPinsUpdate),

    ThreadCreate(ThreadCreate),
    ThreadUpdate(ThreadUpdate),
    ThreadDelete(ThreadDelete),
    ThreadListSync(ThreadListSync),
    ThreadMemberUpdate(ThreadMemberUpdate),
    ThreadMembersUpdate(ThreadMembersUpdate),

    GuildRoleCreate(GuildRoleCreate),
    GuildRoleUpdate(GuildRoleUpdate),
    GuildRoleDelete(GuildRoleDelete),

    GuildScheduledEventCreate(GuildScheduledEventCreate),
    GuildScheduledEventUpdate(GuildScheduledEventUpdate),
    GuildScheduledEventDelete(GuildScheduledEventDelete),

    StageInstanceCreate(StageInstanceCreate),
    StageInstanceUpdate(StageInstanceUpdate),
    StageInstanceDelete(StageInstanceDelete),

    GuildMemberAdd(GuildMemberAdd),
    GuildMemberUpdate(GuildMemberUpdate),
    GuildMemberRemove(GuildMemberRemove),
    GuildMembersChunk(GuildMembersChunk),

    GuildEmojisUpdate(GuildEmojisUpdate),
    GuildStickersUpdate(GuildStickersUpdate),

    PresenceUpdate(PresenceUpdate),
    VoiceStateUpdate(VoiceStateUpdate),

    // ── No cache effect ──
    TypingStart(TypingStart),
    GuildBanAdd(GuildBan),
    GuildBanRemove(GuildBan),
    VoiceServerUpdate(VoiceServerUpdate),
    WebhooksUpdate(WebhooksUpdate),
    InviteCreate(InviteCreate),
    InviteDelete(InviteDelete),
}

impl GatewayEvent {
    /// The dispatch name as it appears in the `t` field.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ready(_) => "READY",
            Self::UserUpdate(_) => "USER_UPDATE",
            Self::MessageCreate(_) => "MESSAGE_CREATE",
            Self::MessageUpdate(_) => "MESSAGE_UPDATE",
            Self::MessageDelete(_) => "MESSAGE_DELETE",
            Self::MessageDeleteBulk(_) => "MESSAGE_DELETE_BULK",
            Self::GuildCreate(_) => "GUILD_CREATE",
            Self::GuildUpdate(_) => "GUILD_UPDATE",
            Self::GuildDelete(_) => "GUILD_DELETE",
            Self::ChannelCreate(_) => "CHANNEL_CREATE",
            Self::ChannelUpdate(_) => "CHANNEL_UPDATE",
            Self::ChannelDelete(_) => "CHANNEL_DELETE",
            Self::ChannelPinsUpdate(_) => "CHANNEL_PINS_UPDATE",
            Self::ThreadCreate(_) => "THREAD_CREATE",
            Self::ThreadUpdate(_) => "THREAD_UPDATE",
            Self::ThreadDelete(_) => "THREAD_DELETE",
            Self::ThreadListSync(_) => "THREAD_LIST_SYNC",
            Self::ThreadMemberUpdate(_) => "THREAD_MEMBER_UPDATE",
            Self::ThreadMembersUpdate(_) => "THREAD_MEMBERS_UPDATE",
            Self::GuildRoleCreate(_) => "GUILD_ROLE_CREATE",
            Self::GuildRoleUpdate(_) => "GUILD_ROLE_UPDATE",
            Self::GuildRoleDelete(_) => "GUILD_ROLE_DELETE",
            Self::GuildScheduledEventCreate(_) => "GUILD_SCHEDULED_EVENT_CREATE",
            Self::GuildScheduledEventUpdate(_) => "GUILD_SCHEDULED_EVENT_UPDATE",
            Self::GuildScheduledEventDelete(_) => "GUILD_SCHEDULED_EVENT_DELETE",
            Self::StageInstanceCreate(_) => "STAGE_INSTANCE_CREATE",
            Self::StageInstanceUpdate(_) => "STAGE_INSTANCE_UPDATE",
            Self::StageInstanceDelete(_) => "STAGE_INSTANCE_DELETE",
            Self::GuildMemberAdd(_) => "GUILD_MEMBER_ADD",
            Self::GuildMemberUpdate(_) => "GUILD_MEMBER_UPDATE",
            Self::GuildMemberRemove(_) => "GUILD_MEMBER_REMOVE",
            Self::GuildMembersChunk(_) => "GUILD_MEMBERS_CHUNK",
            Self::GuildEmojisUpdate(_) => "GUILD_EMOJIS_UPDATE",
            Self::GuildStickersUpdate(_) => "GUILD_STICKERS_UPDATE",
            Self::PresenceUpdate(_) => "PRESENCE_UPDATE",
            Self::VoiceStateUpdate(_) => "VOICE_STATE_UPDATE",
            Self::TypingStart(_) => "TYPING_START",
            Self::GuildBanAdd(_) => "GUILD_BAN_ADD",
            Self::GuildBanRemove(_) => "GUILD_BAN_REMOVE",
            Self::VoiceServerUpdate(_) => "VOICE_SERVER_UPDATE",
            Self::WebhooksUpdate(_) => "WEBHOOKS_UPDATE",
            Self::InviteCreate(_) => "INVITE_CREATE",
            Self::InviteDelete(_) => "INVITE_DELETE",
        }
    }
}

// ── Session ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ready {
    pub user: CurrentUser,
    #[serde(default)]
    pub guilds: Vec<UnavailableGuild>,
    #[serde(default)]
    pub session_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(flatten)]
    pub user: CurrentUser,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_user: Option<CurrentUser>,
}

// ── Messages ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageCreate {
    #[serde(flatten)]
    pub message: Message,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageUpdate {
    #[serde(flatten)]
    pub message: Message,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_message: Option<Message>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDelete {
    pub id: MessageId,
    pub channel_id: ChannelId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<GuildId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_message: Option<Message>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDeleteBulk {
    pub ids: Vec<MessageId>,
    pub channel_id: ChannelId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<GuildId>,
    /// Only the messages that were cached; misses are skipped.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub old_messages: Vec<Message>,
}

// ── Guilds ──

/// Full guild hydration. Nested collections usually omit their guild id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuildCreate {
    #[serde(flatten)]
    pub guild: Guild,
    #[serde(default)]
    pub channels: Vec<GuildChannel>,
    #[serde(default)]
    pub threads: Vec<ThreadChannel>,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub voice_states: Vec<VoiceState>,
    #[serde(default)]
    pub emojis: Vec<Emoji>,
    #[serde(default)]
    pub stickers: Vec<Sticker>,
    #[serde(default)]
    pub stage_instances: Vec<StageInstance>,
    #[serde(default)]
    pub guild_scheduled_events: Vec<ScheduledEvent>,
    #[serde(default)]
    pub presences: Vec<Presence>,
}

impl GuildCreate {
    pub fn new(guild: Guild) -> Self {
        Self {
            guild,
            channels: Vec::new(),
            threads: Vec::new(),
            roles: Vec::new(),
            members: Vec::new(),
            voice_states: Vec::new(),
            emojis: Vec::new(),
            stickers: Vec::new(),
            stage_instances: Vec::new(),
            guild_scheduled_events: Vec::new(),
            presences: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuildUpdate {
    #[serde(flatten)]
    pub guild: Guild,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_guild: Option<Guild>,
}

/// `unavailable == true` signals an outage rather than the guild going away.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuildDelete {
    pub id: GuildId,
    #[serde(default)]
    pub unavailable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_guild: Option<Guild>,
}

// ── Channels ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelCreate {
    #[serde(flatten)]
    pub channel: GuildChannel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelUpdate {
    #[serde(flatten)]
    pub channel: GuildChannel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_channel: Option<GuildChannel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelDelete {
    #[serde(flatten)]
    pub channel: GuildChannel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_channel: Option<GuildChannel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelPinsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<GuildId>,
    pub channel_id: ChannelId,
    #[serde(default)]
    pub last_pin_timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_last_pin_timestamp: Option<DateTime<Utc>>,
}

// ── Threads ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadCreate {
    #[serde(flatten)]
    pub thread: ThreadChannel,
    #[serde(default)]
    pub newly_created: bool,
    /// The current user's membership, when it joined on creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member: Option<ThreadMember>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadUpdate {
    #[serde(flatten)]
    pub thread: ThreadChannel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_thread: Option<ThreadChannel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadDelete {
    pub id: ChannelId,
    #[serde(default)]
    pub guild_id: GuildId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ChannelId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_thread: Option<ThreadChannel>,
}

/// Active threads the current user gained access to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadListSync {
    pub guild_id: GuildId,
    #[serde(default)]
    pub channel_ids: Vec<ChannelId>,
    #[serde(default)]
    pub threads: Vec<ThreadChannel>,
    #[serde(default)]
    pub members: Vec<ThreadMember>,
}

/// The current user's own thread membership changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadMemberUpdate {
    #[serde(flatten)]
    pub member: ThreadMember,
    #[serde(default)]
    pub guild_id: GuildId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddedThreadMember {
    #[serde(flatten)]
    pub thread_member: ThreadMember,
    pub member: Member,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence: Option<Presence>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadMembersUpdate {
    pub id: ChannelId,
    pub guild_id: GuildId,
    #[serde(default)]
    pub member_count: u32,
    #[serde(default)]
    pub added_members: Vec<AddedThreadMember>,
    #[serde(default)]
    pub removed_member_ids: Vec<UserId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub removed_members: Vec<ThreadMember>,
}

// ── Roles ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuildRoleCreate {
    pub guild_id: GuildId,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuildRoleUpdate {
    pub guild_id: GuildId,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_role: Option<Role>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuildRoleDelete {
    pub guild_id: GuildId,
    pub role_id: RoleId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_role: Option<Role>,
}

// ── Scheduled events ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuildScheduledEventCreate {
    #[serde(flatten)]
    pub event: ScheduledEvent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuildScheduledEventUpdate {
    #[serde(flatten)]
    pub event: ScheduledEvent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_event: Option<ScheduledEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuildScheduledEventDelete {
    #[serde(flatten)]
    pub event: ScheduledEvent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_event: Option<ScheduledEvent>,
}

// ── Stage instances ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageInstanceCreate {
    #[serde(flatten)]
    pub stage_instance: StageInstance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageInstanceUpdate {
    #[serde(flatten)]
    pub stage_instance: StageInstance,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_stage_instance: Option<StageInstance>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageInstanceDelete {
    #[serde(flatten)]
    pub stage_instance: StageInstance,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_stage_instance: Option<StageInstance>,
}

// ── Members ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuildMemberAdd {
    #[serde(flatten)]
    pub member: Member,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuildMemberUpdate {
    #[serde(flatten)]
    pub member: Member,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_member: Option<Member>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuildMemberRemove {
    pub guild_id: GuildId,
    pub user: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_member: Option<Member>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuildMembersChunk {
    pub guild_id: GuildId,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub presences: Vec<Presence>,
    #[serde(default)]
    pub chunk_index: u32,
    #[serde(default)]
    pub chunk_count: u32,
    #[serde(default)]
    pub not_found: Vec<UserId>,
}

// ── Emoji & stickers ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuildEmojisUpdate {
    pub guild_id: GuildId,
    pub emojis: Vec<Emoji>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub removed_emojis: Vec<Emoji>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuildStickersUpdate {
    pub guild_id: GuildId,
    pub stickers: Vec<Sticker>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub removed_stickers: Vec<Sticker>,
}

// ── Presence & voice ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceUpdate {
    #[serde(flatten)]
    pub presence: Presence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_presence: Option<Presence>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceStateUpdate {
    #[serde(flatten)]
    pub voice_state: VoiceState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member: Option<Member>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_voice_state: Option<VoiceState>,
}

// ── Pass-through ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypingStart {
    pub channel_id: ChannelId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<GuildId>,
    pub user_id: UserId,
    /// Unix seconds.
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuildBan {
    pub guild_id: GuildId,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceServerUpdate {
    pub token: String,
    pub guild_id: GuildId,
    #[serde(default)]
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhooksUpdate {
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InviteCreate {
    pub code: String,
    pub channel_id: ChannelId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<GuildId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inviter: Option<User>,
    #[serde(default)]
    pub max_age: u32,
    #[serde(default)]
    pub max_uses: u32,
    #[serde(default)]
    pub temporary: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InviteDelete {
    pub code: String,
    pub channel_id: ChannelId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<GuildId>,
}
