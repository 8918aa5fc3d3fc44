use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ChannelId, GuildId, RoleId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default)]
    pub bot: bool,
}

impl User {
    pub fn new(id: UserId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            global_name: None,
            avatar: None,
            bot: false,
        }
    }
}

/// The user the connection is authenticated as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    #[serde(flatten)]
    pub user: User,
    #[serde(default)]
    pub mfa_enabled: bool,
    #[serde(default)]
    pub verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

impl CurrentUser {
    pub fn id(&self) -> UserId {
        self.user.id
    }
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            user,
            mfa_enabled: false,
            verified: false,
            locale: None,
        }
    }
}

/// A user's membership in one guild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    #[serde(default)]
    pub guild_id: GuildId,
    pub user: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nick: Option<String>,
    #[serde(default)]
    pub roles: Vec<RoleId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joined_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pending: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub communication_disabled_until: Option<DateTime<Utc>>,
}

impl Member {
    pub fn new(guild_id: GuildId, user: User) -> Self {
        Self {
            guild_id,
            user,
            nick: None,
            roles: Vec::new(),
            joined_at: None,
            pending: false,
            communication_disabled_until: None,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user.id
    }

    /// Whether a timeout is in effect at `now`. An expired timestamp is ignored.
    pub fn is_timed_out_at(&self, now: DateTime<Utc>) -> bool {
        self.communication_disabled_until
            .is_some_and(|until| until > now)
    }

    pub fn is_timed_out(&self) -> bool {
        self.is_timed_out_at(Utc::now())
    }
}

/// A user's membership in a thread channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadMember {
    #[serde(rename = "id", default)]
    pub thread_id: ChannelId,
    #[serde(default)]
    pub user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub flags: u32,
}

impl ThreadMember {
    pub fn new(thread_id: ChannelId, user_id: UserId) -> Self {
        Self {
            thread_id,
            user_id,
            join_timestamp: None,
            flags: 0,
        }
    }
}
