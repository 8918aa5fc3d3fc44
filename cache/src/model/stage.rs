use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ChannelId, GuildId, ScheduledEventId, StageInstanceId, UserId};

/// A live stage session in a stage channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageInstance {
    pub id: StageInstanceId,
    #[serde(default)]
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub privacy_level: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_scheduled_event_id: Option<ScheduledEventId>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduledEventStatus {
    #[default]
    Scheduled,
    Active,
    Completed,
    Canceled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub id: ScheduledEventId,
    #[serde(default)]
    pub guild_id: GuildId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<ChannelId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator_id: Option<UserId>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub scheduled_start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: ScheduledEventStatus,
    #[serde(default)]
    pub user_count: u32,
}
