use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::model::{GuildId, OverwriteKind, PermissionOverwrite, RoleId, UserId};

bitflags! {
    /// Permission bitfield for roles and channel overwrites.
    /// Bit positions match the gateway's wire encoding.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(from = "u64", into = "u64")]
    pub struct Permissions: u64 {
        // ── General ──
        const CREATE_INSTANT_INVITE    = 1 << 0;
        const KICK_MEMBERS             = 1 << 1;
        const BAN_MEMBERS              = 1 << 2;
        const ADMINISTRATOR            = 1 << 3;
        const MANAGE_CHANNELS          = 1 << 4;
        const MANAGE_GUILD             = 1 << 5;
        const ADD_REACTIONS            = 1 << 6;
        const VIEW_AUDIT_LOG           = 1 << 7;
        const PRIORITY_SPEAKER         = 1 << 8;
        const STREAM                   = 1 << 9;
        const VIEW_CHANNEL             = 1 << 10;

        // ── Channel text ──
        const SEND_MESSAGES            = 1 << 11;
        const SEND_TTS_MESSAGES        = 1 << 12;
        const MANAGE_MESSAGES          = 1 << 13;
        const EMBED_LINKS              = 1 << 14;
        const ATTACH_FILES             = 1 << 15;
        const READ_MESSAGE_HISTORY     = 1 << 16;
        const MENTION_EVERYONE         = 1 << 17;
        const USE_EXTERNAL_EMOJIS      = 1 << 18;
        const VIEW_GUILD_INSIGHTS      = 1 << 19;

        // ── Voice ──
        const CONNECT                  = 1 << 20;
        const SPEAK                    = 1 << 21;
        const MUTE_MEMBERS             = 1 << 22;
        const DEAFEN_MEMBERS           = 1 << 23;
        const MOVE_MEMBERS             = 1 << 24;
        const USE_VAD                  = 1 << 25;

        // ── Membership ──
        const CHANGE_NICKNAME          = 1 << 26;
        const MANAGE_NICKNAMES         = 1 << 27;
        const MANAGE_ROLES             = 1 << 28;
        const MANAGE_WEBHOOKS          = 1 << 29;
        const MANAGE_GUILD_EXPRESSIONS = 1 << 30;
        const USE_APPLICATION_COMMANDS = 1 << 31;
        const REQUEST_TO_SPEAK         = 1 << 32;
        const MANAGE_EVENTS            = 1 << 33;

        // ── Threads ──
        const MANAGE_THREADS           = 1 << 34;
        const CREATE_PUBLIC_THREADS    = 1 << 35;
        const CREATE_PRIVATE_THREADS   = 1 << 36;
        const USE_EXTERNAL_STICKERS    = 1 << 37;
        const SEND_MESSAGES_IN_THREADS = 1 << 38;
        const USE_EMBEDDED_ACTIVITIES  = 1 << 39;
        const MODERATE_MEMBERS         = 1 << 40;
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<u64> for Permissions {
    fn from(bits: u64) -> Self {
        Self::from_bits_truncate(bits)
    }
}

impl From<Permissions> for u64 {
    fn from(perms: Permissions) -> Self {
        perms.bits()
    }
}

/// What a timed-out member keeps regardless of roles and overwrites.
pub const TIMED_OUT_MASK: Permissions =
    Permissions::VIEW_CHANNEL.union(Permissions::READ_MESSAGE_HISTORY);

/// Compute a member's guild-level permissions.
///
/// Algorithm:
///   1. Guild owner gets all permissions unconditionally.
///   2. Start with the `@everyone` role's permissions (if known).
///   3. OR in each assigned role; the moment ADMINISTRATOR appears, return all.
///   4. An active timeout masks the result down to [`TIMED_OUT_MASK`].
pub fn compute_base_permissions(
    is_owner: bool,
    everyone: Option<Permissions>,
    role_permissions: impl IntoIterator<Item = Permissions>,
    timed_out: bool,
) -> Permissions {
    if is_owner {
        return Permissions::all();
    }

    let mut perms = everyone.unwrap_or_default();
    if perms.contains(Permissions::ADMINISTRATOR) {
        return Permissions::all();
    }

    for role_perms in role_permissions {
        perms |= role_perms;
        if perms.contains(Permissions::ADMINISTRATOR) {
            return Permissions::all();
        }
    }

    if timed_out {
        perms &= TIMED_OUT_MASK;
    }
    perms
}

/// Apply a channel's overwrites on top of a member's guild-level permissions.
///
/// Layers, in order:
///   1. The `@everyone` overwrite (target id == guild id): allow, then deny.
///   2. All overwrites for the member's other roles, unioned: deny, then allow.
///   3. The member's own overwrite: deny, then allow.
///
/// Administrators skip overwrites entirely. The timeout mask is re-applied last.
pub fn compute_channel_permissions(
    base: Permissions,
    guild_id: GuildId,
    role_ids: &[RoleId],
    user_id: UserId,
    overwrites: &[PermissionOverwrite],
    timed_out: bool,
) -> Permissions {
    if base.contains(Permissions::ADMINISTRATOR) {
        return Permissions::all();
    }

    let mut perms = base;

    if let Some(ov) = find_overwrite(overwrites, OverwriteKind::Role, guild_id) {
        perms |= ov.allow;
        perms &= !ov.deny;
    }

    let mut role_allow = Permissions::empty();
    let mut role_deny = Permissions::empty();
    for role_id in role_ids.iter().filter(|id| **id != guild_id) {
        if let Some(ov) = find_overwrite(overwrites, OverwriteKind::Role, *role_id) {
            role_allow |= ov.allow;
            role_deny |= ov.deny;
        }
    }
    perms &= !role_deny;
    perms |= role_allow;

    if let Some(ov) = find_overwrite(overwrites, OverwriteKind::Member, user_id) {
        perms &= !ov.deny;
        perms |= ov.allow;
    }

    if timed_out {
        perms &= TIMED_OUT_MASK;
    }
    perms
}

fn find_overwrite(
    overwrites: &[PermissionOverwrite],
    kind: OverwriteKind,
    id: u64,
) -> Option<&PermissionOverwrite> {
    overwrites.iter().find(|ov| ov.kind == kind && ov.id == id)
}
