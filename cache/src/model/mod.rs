//! Value snapshots for every entity the cache retains.
//!
//! Every type here is plain data: the cache replaces values wholesale and
//! hands out clones, so nothing in this module holds a lock or a reference
//! into a store.

mod channel;
mod emoji;
mod guild;
mod member;
mod message;
mod presence;
mod role;
mod stage;
mod voice;

pub use channel::{
    CategoryChannel, ForumChannel, GuildChannel, OverwriteKind, PermissionOverwrite,
    PermissionOverwrites, TextChannel, ThreadChannel, ThreadKind, ThreadMetadata, VoiceChannel,
};
pub use emoji::{Emoji, Sticker};
pub use guild::{Guild, UnavailableGuild};
pub use member::{CurrentUser, Member, ThreadMember, User};
pub use message::Message;
pub use presence::{OnlineStatus, Presence};
pub use role::Role;
pub use stage::{ScheduledEvent, ScheduledEventStatus, StageInstance};
pub use voice::VoiceState;

/// 64-bit platform identifier.
pub type Snowflake = u64;

pub type GuildId = Snowflake;
pub type ChannelId = Snowflake;
pub type RoleId = Snowflake;
pub type UserId = Snowflake;
pub type MessageId = Snowflake;
pub type EmojiId = Snowflake;
pub type StickerId = Snowflake;
pub type StageInstanceId = Snowflake;
pub type ScheduledEventId = Snowflake;
