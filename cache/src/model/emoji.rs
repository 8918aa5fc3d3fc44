use serde::{Deserialize, Serialize};

use super::{EmojiId, GuildId, RoleId, StickerId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Emoji {
    pub id: EmojiId,
    #[serde(default)]
    pub guild_id: GuildId,
    pub name: String,
    #[serde(default)]
    pub roles: Vec<RoleId>,
    #[serde(default)]
    pub animated: bool,
    #[serde(default = "default_true")]
    pub available: bool,
}

impl Emoji {
    pub fn new(guild_id: GuildId, id: EmojiId, name: impl Into<String>) -> Self {
        Self {
            id,
            guild_id,
            name: name.into(),
            roles: Vec::new(),
            animated: false,
            available: true,
        }
    }
}

/// Guild sticker. Standard stickers arrive without a guild and are not cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sticker {
    pub id: StickerId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<GuildId>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: String,
    #[serde(default = "default_true")]
    pub available: bool,
}

impl Sticker {
    pub fn new(guild_id: GuildId, id: StickerId, name: impl Into<String>) -> Self {
        Self {
            id,
            guild_id: Some(guild_id),
            name: name.into(),
            description: None,
            tags: String::new(),
            available: true,
        }
    }
}

fn default_true() -> bool {
    true
}
