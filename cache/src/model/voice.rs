use serde::{Deserialize, Serialize};

use super::{ChannelId, GuildId, UserId};

/// A user's voice session in a guild. `channel_id == None` means disconnected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceState {
    #[serde(default)]
    pub guild_id: GuildId,
    #[serde(default)]
    pub channel_id: Option<ChannelId>,
    pub user_id: UserId,
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub mute: bool,
    #[serde(default)]
    pub deaf: bool,
    #[serde(default)]
    pub self_mute: bool,
    #[serde(default)]
    pub self_deaf: bool,
    #[serde(default)]
    pub self_stream: bool,
    #[serde(default)]
    pub self_video: bool,
    #[serde(default)]
    pub suppress: bool,
}

impl VoiceState {
    pub fn new(guild_id: GuildId, user_id: UserId, channel_id: Option<ChannelId>) -> Self {
        Self {
            guild_id,
            channel_id,
            user_id,
            session_id: String::new(),
            mute: false,
            deaf: false,
            self_mute: false,
            self_deaf: false,
            self_stream: false,
            self_video: false,
            suppress: false,
        }
    }

    /// Muted by the server or by the user.
    pub fn is_muted(&self) -> bool {
        self.mute || self.self_mute
    }

    /// Deafened by the server or by the user.
    pub fn is_deafened(&self) -> bool {
        self.deaf || self.self_deaf
    }

    pub fn is_connected(&self) -> bool {
        self.channel_id.is_some()
    }
}
