use serde::{Deserialize, Serialize};

use super::{GuildId, UserId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnlineStatus {
    Online,
    Idle,
    Dnd,
    Invisible,
    #[default]
    Offline,
}

/// A user's status within one guild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presence {
    pub user_id: UserId,
    #[serde(default)]
    pub guild_id: GuildId,
    #[serde(default)]
    pub status: OnlineStatus,
    #[serde(default)]
    pub activities: Vec<String>,
}

impl Presence {
    pub fn new(guild_id: GuildId, user_id: UserId, status: OnlineStatus) -> Self {
        Self {
            user_id,
            guild_id,
            status,
            activities: Vec::new(),
        }
    }
}
