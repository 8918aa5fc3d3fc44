use serde::{Deserialize, Serialize};

use super::{GuildId, RoleId};
use crate::permissions::Permissions;

/// A guild role. The `@everyone` role shares its id with the guild.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    #[serde(default)]
    pub guild_id: GuildId,
    pub name: String,
    #[serde(default)]
    pub permissions: Permissions,
    #[serde(default)]
    pub position: i32,
    #[serde(default)]
    pub color: u32,
    #[serde(default)]
    pub hoist: bool,
    #[serde(default)]
    pub managed: bool,
    #[serde(default)]
    pub mentionable: bool,
}

impl Role {
    pub fn new(guild_id: GuildId, id: RoleId, name: impl Into<String>, permissions: Permissions) -> Self {
        Self {
            id,
            guild_id,
            name: name.into(),
            permissions,
            position: 0,
            color: 0,
            hoist: false,
            managed: false,
            mentionable: false,
        }
    }

    pub fn is_everyone(&self) -> bool {
        self.id == self.guild_id
    }
}
