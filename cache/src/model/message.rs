use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ChannelId, GuildId, MessageId, User};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub channel_id: ChannelId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<GuildId>,
    pub author: User,
    #[serde(default)]
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub tts: bool,
}

impl Message {
    pub fn new(channel_id: ChannelId, id: MessageId, author: User, content: impl Into<String>) -> Self {
        Self {
            id,
            channel_id,
            guild_id: None,
            author,
            content: content.into(),
            timestamp: Utc::now(),
            edited_timestamp: None,
            pinned: false,
            tts: false,
        }
    }
}
