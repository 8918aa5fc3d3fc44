//! Integration tests for guildcache: event sequences driven through
//! `Caches::handle_event`, checked through the facades and derived queries.
//!
//! Each test builds its own `Caches`, so tests are fully isolated.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};
    use proptest::prelude::*;
    use test_case::test_case;

    use crate::caches::Caches;
    use crate::events::*;
    use crate::flags::CacheFlags;
    use crate::model::{
        CurrentUser, Emoji, Guild, GuildChannel, GuildId, Member, Message, PermissionOverwrite,
        Presence, Role, ScheduledEvent, StageInstance, Sticker, TextChannel, ThreadChannel,
        ThreadKind, ThreadMember, UnavailableGuild, User, UserId, VoiceChannel, VoiceState,
    };
    use crate::permissions::Permissions;

    // ── Helpers ──────────────────────────────────────────────────

    const GUILD: GuildId = 100;
    const OWNER: UserId = 1;
    const ME: UserId = 7;

    fn caches() -> Caches {
        Caches::new(CacheFlags::all())
    }

    fn member(guild_id: GuildId, user_id: UserId, roles: Vec<u64>) -> Member {
        let mut m = Member::new(guild_id, User::new(user_id, format!("user{user_id}")));
        m.roles = roles;
        m
    }

    fn text(guild_id: GuildId, id: u64) -> GuildChannel {
        GuildChannel::Text(TextChannel::new(guild_id, id, format!("text{id}")))
    }

    fn thread(guild_id: GuildId, parent_id: u64, id: u64) -> ThreadChannel {
        ThreadChannel::new(guild_id, parent_id, id, ThreadKind::Public, format!("thread{id}"))
    }

    fn message(channel_id: u64, id: u64, guild_id: Option<GuildId>) -> Message {
        let mut m = Message::new(channel_id, id, User::new(OWNER, "owner"), "hi");
        m.guild_id = guild_id;
        m
    }

    /// A guild with the @everyone role granting `everyone` and nothing else.
    fn create_guild(caches: &Caches, guild_id: GuildId, everyone: Permissions, member_count: u32) {
        let mut guild = Guild::new(guild_id, "guild", OWNER);
        guild.member_count = member_count;
        let mut create = GuildCreate::new(guild);
        create.roles.push(Role::new(0, guild_id, "@everyone", everyone));
        caches.handle_event(GatewayEvent::GuildCreate(Box::new(create)));
    }

    fn add_member(caches: &Caches, m: Member) -> GatewayEvent {
        caches.handle_event(GatewayEvent::GuildMemberAdd(GuildMemberAdd { member: m }))
    }

    fn remove_member(caches: &Caches, guild_id: GuildId, user_id: UserId) -> GatewayEvent {
        caches.handle_event(GatewayEvent::GuildMemberRemove(GuildMemberRemove {
            guild_id,
            user: User::new(user_id, "gone"),
            old_member: None,
        }))
    }

    fn update_channel(caches: &Caches, channel: GuildChannel) -> GatewayEvent {
        caches.handle_event(GatewayEvent::ChannelUpdate(ChannelUpdate {
            channel,
            old_channel: None,
        }))
    }

    fn set_self(caches: &Caches, user_id: UserId, guilds: &[GuildId]) {
        caches.handle_event(GatewayEvent::Ready(Ready {
            user: CurrentUser::from(User::new(user_id, "me")),
            guilds: guilds
                .iter()
                .map(|id| UnavailableGuild {
                    id: *id,
                    unavailable: true,
                })
                .collect(),
            session_id: "s".into(),
        }));
    }

    // ═══════════════════════════════════════════════════════════════
    //  1. Entity lifecycle
    // ═══════════════════════════════════════════════════════════════

    #[test]
    fn test_role_create_update_delete_lifecycle() {
        let caches = caches();
        caches.handle_event(GatewayEvent::GuildRoleCreate(GuildRoleCreate {
            guild_id: GUILD,
            role: Role::new(0, 5, "mods", Permissions::KICK_MEMBERS),
        }));
        // Group key back-filled from the event
        assert_eq!(caches.roles().get(GUILD, 5).unwrap().guild_id, GUILD);

        let event = caches.handle_event(GatewayEvent::GuildRoleUpdate(GuildRoleUpdate {
            guild_id: GUILD,
            role: Role::new(GUILD, 5, "mods", Permissions::BAN_MEMBERS),
            old_role: None,
        }));
        let GatewayEvent::GuildRoleUpdate(update) = event else {
            panic!("expected GUILD_ROLE_UPDATE");
        };
        assert_eq!(update.old_role.unwrap().permissions, Permissions::KICK_MEMBERS);

        let event = caches.handle_event(GatewayEvent::GuildRoleDelete(GuildRoleDelete {
            guild_id: GUILD,
            role_id: 5,
            old_role: None,
        }));
        let GatewayEvent::GuildRoleDelete(delete) = event else {
            panic!("expected GUILD_ROLE_DELETE");
        };
        assert_eq!(delete.old_role.unwrap().permissions, Permissions::BAN_MEMBERS);
        assert!(caches.roles().get(GUILD, 5).is_none());
        assert_eq!(caches.roles().group_len(GUILD), 0);
        assert!(caches.member_roles(&member(GUILD, 2, vec![5])).is_empty());
    }

    #[test]
    fn test_role_delete_strips_role_from_members() {
        let caches = caches();
        create_guild(&caches, GUILD, Permissions::VIEW_CHANNEL, 0);
        add_member(&caches, member(GUILD, 2, vec![5, 6]));
        caches.handle_event(GatewayEvent::GuildRoleDelete(GuildRoleDelete {
            guild_id: GUILD,
            role_id: 5,
            old_role: None,
        }));
        assert_eq!(caches.members().get(GUILD, 2).unwrap().roles, vec![6]);
    }

    #[test]
    fn test_channel_create_update_delete_lifecycle() {
        let caches = caches();
        caches.handle_event(GatewayEvent::ChannelCreate(ChannelCreate {
            channel: text(GUILD, 10),
        }));

        let mut renamed = TextChannel::new(GUILD, 10, "renamed");
        renamed.topic = Some("t".into());
        let event = update_channel(&caches, GuildChannel::Text(renamed));
        let GatewayEvent::ChannelUpdate(update) = event else {
            panic!("expected CHANNEL_UPDATE");
        };
        assert_eq!(update.old_channel.unwrap().name(), "text10");

        let event = caches.handle_event(GatewayEvent::ChannelDelete(ChannelDelete {
            channel: text(GUILD, 10),
            old_channel: None,
        }));
        let GatewayEvent::ChannelDelete(delete) = event else {
            panic!("expected CHANNEL_DELETE");
        };
        assert_eq!(delete.old_channel.unwrap().name(), "renamed");
        assert!(caches.channels().get(10).is_none());
        assert!(caches.text_channel(10).is_none());
        assert!(caches.message_channel(10).is_none());
    }

    #[test]
    fn test_channel_delete_drops_messages_and_threads() {
        let caches = caches();
        caches.channels().add(text(GUILD, 10));
        caches.channels().add(thread(GUILD, 10, 11).into());
        caches.thread_members().add(ThreadMember::new(11, 2));
        caches.messages().add(message(10, 1, Some(GUILD)));
        caches.messages().add(message(11, 2, Some(GUILD)));

        caches.handle_event(GatewayEvent::ChannelDelete(ChannelDelete {
            channel: text(GUILD, 10),
            old_channel: None,
        }));

        assert!(caches.channels().is_empty());
        assert!(caches.messages().is_empty());
        assert!(caches.thread_members().is_empty());
    }

    #[test]
    fn test_message_create_update_delete_lifecycle() {
        let caches = caches();
        caches.channels().add(text(GUILD, 10));

        caches.handle_event(GatewayEvent::MessageCreate(MessageCreate {
            message: message(10, 50, None),
        }));
        assert_eq!(caches.channels().get(10).unwrap().last_message_id(), Some(50));
        // Guild id filled from the cached channel
        assert_eq!(caches.messages().get(10, 50).unwrap().guild_id, Some(GUILD));

        let mut edited = message(10, 50, Some(GUILD));
        edited.content = "edited".into();
        let event = caches.handle_event(GatewayEvent::MessageUpdate(MessageUpdate {
            message: edited,
            old_message: None,
        }));
        let GatewayEvent::MessageUpdate(update) = event else {
            panic!("expected MESSAGE_UPDATE");
        };
        assert_eq!(update.old_message.unwrap().content, "hi");

        let event = caches.handle_event(GatewayEvent::MessageDelete(MessageDelete {
            id: 50,
            channel_id: 10,
            guild_id: Some(GUILD),
            old_message: None,
        }));
        let GatewayEvent::MessageDelete(delete) = event else {
            panic!("expected MESSAGE_DELETE");
        };
        assert_eq!(delete.old_message.unwrap().content, "edited");
        assert!(caches.messages().get(10, 50).is_none());
    }

    #[test]
    fn test_delete_of_uncached_entity_leaves_enrichment_empty() {
        let caches = caches();
        let event = caches.handle_event(GatewayEvent::MessageDelete(MessageDelete {
            id: 1,
            channel_id: 2,
            guild_id: None,
            old_message: None,
        }));
        let GatewayEvent::MessageDelete(delete) = event else {
            panic!("expected MESSAGE_DELETE");
        };
        assert!(delete.old_message.is_none());

        let event = remove_member(&caches, GUILD, 9);
        let GatewayEvent::GuildMemberRemove(remove) = event else {
            panic!("expected GUILD_MEMBER_REMOVE");
        };
        assert!(remove.old_member.is_none());
    }

    #[test]
    fn test_user_update_attaches_old_user() {
        let caches = caches();
        set_self(&caches, ME, &[]);
        let event = caches.handle_event(GatewayEvent::UserUpdate(UserUpdate {
            user: CurrentUser::from(User::new(ME, "renamed")),
            old_user: None,
        }));
        let GatewayEvent::UserUpdate(update) = event else {
            panic!("expected USER_UPDATE");
        };
        assert_eq!(update.old_user.unwrap().user.username, "me");
        assert_eq!(caches.self_user().get().unwrap().user.username, "renamed");
    }

    #[test]
    fn test_scheduled_event_and_stage_lifecycle() {
        let caches = caches();
        let event = ScheduledEvent {
            id: 3,
            guild_id: GUILD,
            channel_id: None,
            creator_id: None,
            name: "meetup".into(),
            description: None,
            scheduled_start_time: Utc::now(),
            scheduled_end_time: None,
            status: Default::default(),
            user_count: 0,
        };
        caches.handle_event(GatewayEvent::GuildScheduledEventCreate(
            GuildScheduledEventCreate {
                event: event.clone(),
            },
        ));
        let mut renamed = event.clone();
        renamed.name = "party".into();
        let out = caches.handle_event(GatewayEvent::GuildScheduledEventUpdate(
            GuildScheduledEventUpdate {
                event: renamed.clone(),
                old_event: None,
            },
        ));
        let GatewayEvent::GuildScheduledEventUpdate(update) = out else {
            panic!("expected GUILD_SCHEDULED_EVENT_UPDATE");
        };
        assert_eq!(update.old_event.unwrap().name, "meetup");
        let out = caches.handle_event(GatewayEvent::GuildScheduledEventDelete(
            GuildScheduledEventDelete {
                event: renamed,
                old_event: None,
            },
        ));
        let GatewayEvent::GuildScheduledEventDelete(delete) = out else {
            panic!("expected GUILD_SCHEDULED_EVENT_DELETE");
        };
        assert_eq!(delete.old_event.unwrap().name, "party");
        assert!(caches.scheduled_events().is_empty());

        let stage = StageInstance {
            id: 4,
            guild_id: GUILD,
            channel_id: 30,
            topic: "town hall".into(),
            privacy_level: 2,
            guild_scheduled_event_id: None,
        };
        caches.handle_event(GatewayEvent::StageInstanceCreate(StageInstanceCreate {
            stage_instance: stage.clone(),
        }));
        let out = caches.handle_event(GatewayEvent::StageInstanceDelete(StageInstanceDelete {
            stage_instance: stage,
            old_stage_instance: None,
        }));
        let GatewayEvent::StageInstanceDelete(delete) = out else {
            panic!("expected STAGE_INSTANCE_DELETE");
        };
        assert_eq!(delete.old_stage_instance.unwrap().topic, "town hall");
        assert!(caches.stage_instances().get(GUILD, 4).is_none());
    }

    // ═══════════════════════════════════════════════════════════════
    //  2. Guild hydration and cascade removal
    // ═══════════════════════════════════════════════════════════════

    fn hydrate_full_guild(caches: &Caches, guild_id: GuildId) {
        let mut create = GuildCreate::new(Guild::new(guild_id, "full", OWNER));
        create.channels.push(text(0, guild_id + 10));
        create
            .channels
            .push(GuildChannel::Voice(VoiceChannel::new(0, guild_id + 11, "voice")));
        create.threads.push(thread(0, guild_id + 10, guild_id + 12));
        create
            .roles
            .push(Role::new(0, guild_id, "@everyone", Permissions::VIEW_CHANNEL));
        create.members.push(member(0, 2, vec![]));
        create.voice_states.push(VoiceState::new(0, 2, Some(guild_id + 11)));
        create.emojis.push(Emoji::new(0, 1, "smile"));
        let mut sticker = Sticker::new(0, 1, "wave");
        sticker.guild_id = None;
        create.stickers.push(sticker);
        create.stage_instances.push(StageInstance {
            id: 1,
            guild_id: 0,
            channel_id: guild_id + 11,
            topic: "t".into(),
            privacy_level: 2,
            guild_scheduled_event_id: None,
        });
        create.guild_scheduled_events.push(ScheduledEvent {
            id: 1,
            guild_id: 0,
            channel_id: None,
            creator_id: None,
            name: "e".into(),
            description: None,
            scheduled_start_time: Utc::now(),
            scheduled_end_time: None,
            status: Default::default(),
            user_count: 0,
        });
        create.presences.push(Presence::new(0, 2, Default::default()));
        caches.handle_event(GatewayEvent::GuildCreate(Box::new(create)));

        caches.thread_members().add(ThreadMember::new(guild_id + 12, 2));
        caches.messages().add(message(guild_id + 10, 1, Some(guild_id)));
        caches.messages().add(message(guild_id + 12, 2, Some(guild_id)));
        // A message in an uncached channel, reachable only by guild id
        caches.messages().add(message(guild_id + 99, 3, Some(guild_id)));
    }

    fn guild_entity_count(caches: &Caches, guild_id: GuildId) -> usize {
        caches.guilds().get(guild_id).map_or(0, |_| 1)
            + caches.channels().guild_len(guild_id)
            + caches.roles().group_len(guild_id)
            + caches.members().group_len(guild_id)
            + caches.voice_states().group_len(guild_id)
            + caches.presences().group_len(guild_id)
            + caches.emojis().group_len(guild_id)
            + caches.stickers().group_len(guild_id)
            + caches.stage_instances().group_len(guild_id)
            + caches.scheduled_events().group_len(guild_id)
            + caches.thread_members().group_len(guild_id + 12)
            + {
                let mut n = 0;
                caches.messages().for_each(|m| {
                    if m.guild_id == Some(guild_id) {
                        n += 1;
                    }
                });
                n
            }
    }

    #[test]
    fn test_guild_create_backfills_every_collection() {
        let caches = caches();
        hydrate_full_guild(&caches, GUILD);

        assert_eq!(caches.channels().get(GUILD + 10).unwrap().guild_id(), GUILD);
        assert_eq!(caches.thread(GUILD + 12).unwrap().guild_id, GUILD);
        assert!(caches.roles().get(GUILD, GUILD).is_some());
        assert!(caches.members().get(GUILD, 2).is_some());
        assert!(caches.voice_states().get(GUILD, 2).is_some());
        assert!(caches.emojis().get(GUILD, 1).is_some());
        assert!(caches.stickers().get(GUILD, 1).is_some());
        assert!(caches.stage_instances().get(GUILD, 1).is_some());
        assert!(caches.scheduled_events().get(GUILD, 1).is_some());
        assert!(caches.presences().get(GUILD, 2).is_some());
        // Nothing landed under the zero placeholder
        assert_eq!(caches.members().group_len(0), 0);
        assert_eq!(caches.roles().group_len(0), 0);
    }

    #[test]
    fn test_guild_delete_cascades_to_every_child() {
        let caches = caches();
        hydrate_full_guild(&caches, GUILD);
        hydrate_full_guild(&caches, 200);
        let other_before = guild_entity_count(&caches, 200);
        assert!(guild_entity_count(&caches, GUILD) > 10);

        let event = caches.handle_event(GatewayEvent::GuildDelete(GuildDelete {
            id: GUILD,
            unavailable: false,
            old_guild: None,
        }));
        let GatewayEvent::GuildDelete(delete) = event else {
            panic!("expected GUILD_DELETE");
        };
        assert_eq!(delete.old_guild.unwrap().name, "full");

        assert_eq!(guild_entity_count(&caches, GUILD), 0);
        assert!(caches.messages().get(GUILD + 10, 1).is_none());
        assert!(caches.messages().get(GUILD + 99, 3).is_none());
        // The other guild is untouched
        assert_eq!(guild_entity_count(&caches, 200), other_before);
    }

    #[test]
    fn test_unavailable_guild_delete_keeps_marker_but_evicts() {
        let caches = caches();
        hydrate_full_guild(&caches, GUILD);
        caches.handle_event(GatewayEvent::GuildDelete(GuildDelete {
            id: GUILD,
            unavailable: true,
            old_guild: None,
        }));
        assert!(caches.guilds().is_unavailable(GUILD));
        assert_eq!(guild_entity_count(&caches, GUILD), 0);

        // Outage ends: the guild comes back and the marker clears
        create_guild(&caches, GUILD, Permissions::VIEW_CHANNEL, 0);
        assert!(!caches.guilds().is_unavailable(GUILD));
        assert!(caches.guilds().unavailable_ids().is_empty());
    }

    #[test]
    fn test_ready_marks_guilds_unready_until_created() {
        let caches = caches();
        set_self(&caches, ME, &[GUILD, 200]);
        let mut unready = caches.guilds().unready_ids();
        unready.sort_unstable();
        assert_eq!(unready, vec![GUILD, 200]);

        create_guild(&caches, GUILD, Permissions::VIEW_CHANNEL, 0);
        assert!(!caches.guilds().is_unready(GUILD));
        assert!(caches.guilds().is_unready(200));
    }

    #[test]
    fn test_guild_update_keeps_hydrated_member_count() {
        let caches = caches();
        create_guild(&caches, GUILD, Permissions::VIEW_CHANNEL, 42);
        let mut renamed = Guild::new(GUILD, "renamed", OWNER);
        renamed.member_count = 0;
        let event = caches.handle_event(GatewayEvent::GuildUpdate(GuildUpdate {
            guild: renamed,
            old_guild: None,
        }));
        let GatewayEvent::GuildUpdate(update) = event else {
            panic!("expected GUILD_UPDATE");
        };
        assert_eq!(update.old_guild.unwrap().name, "guild");
        let guild = caches.guilds().get(GUILD).unwrap();
        assert_eq!(guild.name, "renamed");
        assert_eq!(guild.member_count, 42);
    }

    // ═══════════════════════════════════════════════════════════════
    //  3. Member bookkeeping
    // ═══════════════════════════════════════════════════════════════

    #[test]
    fn test_member_remove_saturates_at_zero() {
        let caches = caches();
        create_guild(&caches, GUILD, Permissions::VIEW_CHANNEL, 0);
        remove_member(&caches, GUILD, 2);
        assert_eq!(caches.guilds().get(GUILD).unwrap().member_count, 0);
    }

    #[test]
    fn test_member_update_and_remove_attach_old_member() {
        let caches = caches();
        create_guild(&caches, GUILD, Permissions::VIEW_CHANNEL, 0);
        add_member(&caches, member(GUILD, 2, vec![]));

        let mut nicked = member(GUILD, 2, vec![]);
        nicked.nick = Some("nick".into());
        let event = caches.handle_event(GatewayEvent::GuildMemberUpdate(GuildMemberUpdate {
            member: nicked,
            old_member: None,
        }));
        let GatewayEvent::GuildMemberUpdate(update) = event else {
            panic!("expected GUILD_MEMBER_UPDATE");
        };
        assert_eq!(update.old_member.unwrap().nick, None);

        let GatewayEvent::GuildMemberRemove(remove) = remove_member(&caches, GUILD, 2) else {
            panic!("expected GUILD_MEMBER_REMOVE");
        };
        assert_eq!(remove.old_member.unwrap().nick.as_deref(), Some("nick"));
        assert!(caches.members().get(GUILD, 2).is_none());
    }

    #[test]
    fn test_members_chunk_backfills_guild() {
        let caches = caches();
        caches.handle_event(GatewayEvent::GuildMembersChunk(GuildMembersChunk {
            guild_id: GUILD,
            members: vec![member(0, 2, vec![]), member(0, 3, vec![])],
            presences: vec![Presence::new(0, 2, Default::default())],
            chunk_index: 0,
            chunk_count: 1,
            not_found: vec![],
        }));
        assert_eq!(caches.members().group_len(GUILD), 2);
        assert!(caches.presences().get(GUILD, 2).is_some());
    }

    proptest! {
        #[test]
        fn prop_member_count_tracks_adds_and_removes(
            initial in 0u32..1000,
            (adds, removes) in (0u64..40).prop_flat_map(|n| (Just(n), 0..=n)),
        ) {
            let caches = caches();
            create_guild(&caches, GUILD, Permissions::VIEW_CHANNEL, initial);
            for user_id in 0..adds {
                add_member(&caches, member(GUILD, 1000 + user_id, vec![]));
            }
            for user_id in 0..removes {
                remove_member(&caches, GUILD, 1000 + user_id);
            }
            let count = caches.guilds().get(GUILD).unwrap().member_count;
            prop_assert_eq!(u64::from(count), u64::from(initial) + adds - removes);
            prop_assert_eq!(caches.members().group_len(GUILD) as u64, adds - removes);
        }
    }

    // ═══════════════════════════════════════════════════════════════
    //  4. Permission resolution
    // ═══════════════════════════════════════════════════════════════

    #[test]
    fn test_permission_scenario_overwrite_layers() {
        let caches = caches();
        create_guild(&caches, GUILD, Permissions::VIEW_CHANNEL, 1);
        caches.handle_event(GatewayEvent::ChannelCreate(ChannelCreate {
            channel: text(GUILD, 10),
        }));
        let m = member(GUILD, 2, vec![]);
        add_member(&caches, m.clone());

        let channel = caches.channels().get(10).unwrap();
        assert_eq!(
            caches.member_permissions_in_channel(&channel, &m),
            Permissions::VIEW_CHANNEL
        );

        let mut hidden = TextChannel::new(GUILD, 10, "text10");
        hidden.permission_overwrites.upsert(PermissionOverwrite::role(
            GUILD,
            Permissions::empty(),
            Permissions::VIEW_CHANNEL,
        ));
        update_channel(&caches, GuildChannel::Text(hidden.clone()));
        let channel = caches.channels().get(10).unwrap();
        assert_eq!(
            caches.member_permissions_in_channel(&channel, &m),
            Permissions::empty()
        );

        hidden.permission_overwrites.upsert(PermissionOverwrite::member(
            2,
            Permissions::VIEW_CHANNEL,
            Permissions::empty(),
        ));
        update_channel(&caches, GuildChannel::Text(hidden));
        let channel = caches.channels().get(10).unwrap();
        assert_eq!(
            caches.member_permissions_in_channel(&channel, &m),
            Permissions::VIEW_CHANNEL
        );
    }

    #[test_case(Permissions::SEND_MESSAGES, Permissions::empty(), true ; "member allow keeps send")]
    #[test_case(Permissions::empty(), Permissions::SEND_MESSAGES, false ; "member deny removes send")]
    fn test_overwrite_precedence_through_cache(allow: Permissions, deny: Permissions, expect: bool) {
        let caches = caches();
        create_guild(&caches, GUILD, Permissions::VIEW_CHANNEL, 0);
        caches.roles().add(Role::new(GUILD, 1, "r1", Permissions::empty()));
        caches.roles().add(Role::new(GUILD, 2, "r2", Permissions::empty()));

        let mut channel = TextChannel::new(GUILD, 10, "c");
        channel.permission_overwrites.upsert(PermissionOverwrite::role(
            1,
            Permissions::empty(),
            Permissions::SEND_MESSAGES,
        ));
        channel.permission_overwrites.upsert(PermissionOverwrite::role(
            2,
            Permissions::SEND_MESSAGES,
            Permissions::empty(),
        ));
        channel
            .permission_overwrites
            .upsert(PermissionOverwrite::member(3, allow, deny));
        let channel = GuildChannel::Text(channel);

        let m = member(GUILD, 3, vec![1, 2]);
        let perms = caches.member_permissions_in_channel(&channel, &m);
        assert_eq!(perms.contains(Permissions::SEND_MESSAGES), expect);
    }

    #[test]
    fn test_administrator_bypasses_explicit_denies() {
        let caches = caches();
        create_guild(&caches, GUILD, Permissions::VIEW_CHANNEL, 0);
        caches
            .roles()
            .add(Role::new(GUILD, 9, "admin", Permissions::ADMINISTRATOR));

        let mut channel = TextChannel::new(GUILD, 10, "locked");
        channel.permission_overwrites.upsert(PermissionOverwrite::role(
            GUILD,
            Permissions::empty(),
            Permissions::all(),
        ));
        channel.permission_overwrites.upsert(PermissionOverwrite::role(
            9,
            Permissions::empty(),
            Permissions::all(),
        ));
        channel.permission_overwrites.upsert(PermissionOverwrite::member(
            2,
            Permissions::empty(),
            Permissions::all(),
        ));
        let channel = GuildChannel::Text(channel);

        let admin = member(GUILD, 2, vec![9]);
        assert_eq!(caches.member_permissions(&admin), Permissions::all());
        assert_eq!(
            caches.member_permissions_in_channel(&channel, &admin),
            Permissions::all()
        );
    }

    #[test]
    fn test_expired_timeout_is_ignored() {
        let caches = caches();
        create_guild(&caches, GUILD, Permissions::VIEW_CHANNEL | Permissions::SPEAK, 0);
        let mut m = member(GUILD, 2, vec![]);
        m.communication_disabled_until = Some(Utc::now() - Duration::minutes(1));
        assert!(caches.member_permissions(&m).contains(Permissions::SPEAK));
        m.communication_disabled_until = Some(Utc::now() + Duration::minutes(10));
        assert!(!caches.member_permissions(&m).contains(Permissions::SPEAK));
    }

    proptest! {
        #[test]
        fn prop_permissions_independent_of_role_order(
            grants in prop::collection::vec((any::<u64>(), any::<u64>(), any::<u64>()), 6),
            order in Just((1u64..=6).collect::<Vec<_>>()).prop_shuffle(),
        ) {
            let caches = caches();
            create_guild(&caches, GUILD, Permissions::VIEW_CHANNEL, 0);
            let mut channel = TextChannel::new(GUILD, 10, "c");
            for (i, (perms, allow, deny)) in grants.iter().enumerate() {
                let role_id = i as u64 + 1;
                caches.roles().add(Role::new(
                    GUILD,
                    role_id,
                    "r",
                    Permissions::from_bits_truncate(*perms),
                ));
                channel.permission_overwrites.upsert(PermissionOverwrite::role(
                    role_id,
                    Permissions::from_bits_truncate(*allow),
                    Permissions::from_bits_truncate(*deny),
                ));
            }
            let channel = GuildChannel::Text(channel);

            let sorted = member(GUILD, 2, (1..=6).collect());
            let shuffled = member(GUILD, 2, order);
            let expected = caches.member_permissions_in_channel(&channel, &sorted);
            prop_assert_eq!(caches.member_permissions_in_channel(&channel, &shuffled), expected);
            // Idempotent
            prop_assert_eq!(caches.member_permissions_in_channel(&channel, &sorted), expected);
            prop_assert_eq!(
                caches.member_permissions(&shuffled),
                caches.member_permissions(&sorted)
            );
        }
    }

    // ═══════════════════════════════════════════════════════════════
    //  5. Threads
    // ═══════════════════════════════════════════════════════════════

    #[test]
    fn test_thread_message_counters() {
        let caches = caches();
        caches.channels().add(text(GUILD, 10));
        caches.handle_event(GatewayEvent::ThreadCreate(ThreadCreate {
            thread: thread(GUILD, 10, 11),
            newly_created: true,
            member: None,
        }));

        for id in 1..=3 {
            caches.handle_event(GatewayEvent::MessageCreate(MessageCreate {
                message: message(11, id, Some(GUILD)),
            }));
        }
        let t = caches.thread(11).unwrap();
        assert_eq!((t.message_count, t.total_message_sent), (3, 3));
        assert_eq!(t.last_message_id, Some(3));

        caches.handle_event(GatewayEvent::MessageDelete(MessageDelete {
            id: 1,
            channel_id: 11,
            guild_id: Some(GUILD),
            old_message: None,
        }));
        let event = caches.handle_event(GatewayEvent::MessageDeleteBulk(MessageDeleteBulk {
            ids: vec![2, 3, 404, 405],
            channel_id: 11,
            guild_id: Some(GUILD),
            old_messages: vec![],
        }));
        let GatewayEvent::MessageDeleteBulk(bulk) = event else {
            panic!("expected MESSAGE_DELETE_BULK");
        };
        assert_eq!(bulk.old_messages.len(), 2);

        let t = caches.thread(11).unwrap();
        assert_eq!(t.message_count, 0);
        assert_eq!(t.total_message_sent, 3);
        assert_eq!(caches.messages().group_len(11), 0);
    }

    #[test]
    fn test_thread_create_stores_own_membership() {
        let caches = caches();
        set_self(&caches, ME, &[]);
        let mut own = ThreadMember::new(0, 0);
        own.flags = 1;
        caches.handle_event(GatewayEvent::ThreadCreate(ThreadCreate {
            thread: thread(GUILD, 10, 11),
            newly_created: true,
            member: Some(own),
        }));
        assert_eq!(caches.thread_members().get(11, ME).unwrap().flags, 1);
    }

    #[test]
    fn test_thread_members_update_adds_and_removes() {
        let caches = caches();
        caches.channels().add(thread(GUILD, 10, 11).into());
        caches.thread_members().add(ThreadMember::new(11, 5));

        let event = caches.handle_event(GatewayEvent::ThreadMembersUpdate(ThreadMembersUpdate {
            id: 11,
            guild_id: GUILD,
            member_count: 2,
            added_members: vec![AddedThreadMember {
                thread_member: ThreadMember::new(0, 6),
                member: member(0, 6, vec![]),
                presence: Some(Presence::new(0, 6, Default::default())),
            }],
            removed_member_ids: vec![5, 404],
            removed_members: vec![],
        }));
        let GatewayEvent::ThreadMembersUpdate(update) = event else {
            panic!("expected THREAD_MEMBERS_UPDATE");
        };
        assert_eq!(update.removed_members, vec![ThreadMember::new(11, 5)]);

        assert_eq!(caches.thread(11).unwrap().member_count, 2);
        assert!(caches.thread_members().get(11, 6).is_some());
        assert!(caches.thread_members().get(11, 5).is_none());
        // Nested member and presence are keyed by the guild, not the thread
        assert!(caches.members().get(GUILD, 6).is_some());
        assert!(caches.presences().get(GUILD, 6).is_some());
        assert!(caches.members().get(11, 6).is_none());
    }

    #[test]
    fn test_thread_update_and_delete() {
        let caches = caches();
        caches.channels().add(thread(GUILD, 10, 11).into());
        caches.thread_members().add(ThreadMember::new(11, 5));
        caches.messages().add(message(11, 1, Some(GUILD)));

        let mut archived = thread(GUILD, 10, 11);
        archived.thread_metadata.archived = true;
        let event = caches.handle_event(GatewayEvent::ThreadUpdate(ThreadUpdate {
            thread: archived,
            old_thread: None,
        }));
        let GatewayEvent::ThreadUpdate(update) = event else {
            panic!("expected THREAD_UPDATE");
        };
        assert!(!update.old_thread.unwrap().thread_metadata.archived);

        let event = caches.handle_event(GatewayEvent::ThreadDelete(ThreadDelete {
            id: 11,
            guild_id: GUILD,
            parent_id: Some(10),
            old_thread: None,
        }));
        let GatewayEvent::ThreadDelete(delete) = event else {
            panic!("expected THREAD_DELETE");
        };
        assert!(delete.old_thread.unwrap().thread_metadata.archived);
        assert!(caches.thread(11).is_none());
        assert_eq!(caches.thread_members().group_len(11), 0);
        assert_eq!(caches.messages().group_len(11), 0);
    }

    #[test]
    fn test_thread_list_sync_and_member_update() {
        let caches = caches();
        caches.handle_event(GatewayEvent::ThreadListSync(ThreadListSync {
            guild_id: GUILD,
            channel_ids: vec![10],
            threads: vec![thread(0, 10, 11), thread(0, 10, 12)],
            members: vec![ThreadMember::new(11, ME)],
        }));
        assert_eq!(caches.threads_in_channel(10).len(), 2);
        assert_eq!(caches.thread(12).unwrap().guild_id, GUILD);
        assert!(caches.thread_members().get(11, ME).is_some());

        caches.handle_event(GatewayEvent::ThreadMemberUpdate(ThreadMemberUpdate {
            member: ThreadMember::new(12, ME),
            guild_id: GUILD,
        }));
        assert!(caches.thread_members().get(12, ME).is_some());
    }

    #[test]
    fn test_channel_update_drops_threads_when_hidden_from_self() {
        let caches = caches();
        create_guild(&caches, GUILD, Permissions::VIEW_CHANNEL, 0);
        set_self(&caches, ME, &[]);
        add_member(&caches, member(GUILD, ME, vec![]));
        caches.channels().add(text(GUILD, 10));
        caches.channels().add(thread(GUILD, 10, 11).into());
        caches.thread_members().add(ThreadMember::new(11, ME));

        // Still visible: threads stay
        update_channel(&caches, text(GUILD, 10));
        assert!(caches.thread(11).is_some());

        let mut hidden = TextChannel::new(GUILD, 10, "text10");
        hidden.permission_overwrites.upsert(PermissionOverwrite::role(
            GUILD,
            Permissions::empty(),
            Permissions::VIEW_CHANNEL,
        ));
        update_channel(&caches, GuildChannel::Text(hidden));
        assert!(caches.thread(11).is_none());
        assert_eq!(caches.thread_members().group_len(11), 0);
        assert!(caches.channels().get(10).is_some());
    }

    #[test]
    fn test_channel_pins_update_attaches_old_timestamp() {
        let caches = caches();
        let first = Utc::now() - Duration::days(1);
        let mut channel = TextChannel::new(GUILD, 10, "pins");
        channel.last_pin_timestamp = Some(first);
        caches.channels().add(GuildChannel::Text(channel));

        let now = Utc::now();
        let event = caches.handle_event(GatewayEvent::ChannelPinsUpdate(ChannelPinsUpdate {
            guild_id: Some(GUILD),
            channel_id: 10,
            last_pin_timestamp: Some(now),
            old_last_pin_timestamp: None,
        }));
        let GatewayEvent::ChannelPinsUpdate(pins) = event else {
            panic!("expected CHANNEL_PINS_UPDATE");
        };
        assert_eq!(pins.old_last_pin_timestamp, Some(first));
        assert_eq!(caches.channels().get(10).unwrap().last_pin_timestamp(), Some(now));
    }

    // ═══════════════════════════════════════════════════════════════
    //  6. Emoji, stickers, presence, voice
    // ═══════════════════════════════════════════════════════════════

    #[test]
    fn test_emojis_update_is_a_set_difference() {
        let caches = caches();
        for id in 1..=3 {
            caches.emojis().add(Emoji::new(GUILD, id, format!("e{id}")));
        }
        let event = caches.handle_event(GatewayEvent::GuildEmojisUpdate(GuildEmojisUpdate {
            guild_id: GUILD,
            emojis: vec![Emoji::new(0, 2, "renamed"), Emoji::new(0, 4, "new")],
            removed_emojis: vec![],
        }));
        let GatewayEvent::GuildEmojisUpdate(update) = event else {
            panic!("expected GUILD_EMOJIS_UPDATE");
        };
        let mut removed: Vec<_> = update.removed_emojis.iter().map(|e| e.id).collect();
        removed.sort_unstable();
        assert_eq!(removed, vec![1, 3]);
        assert_eq!(caches.emojis().group_len(GUILD), 2);
        assert_eq!(caches.emojis().get(GUILD, 2).unwrap().name, "renamed");
    }

    #[test]
    fn test_stickers_update_backfills_and_removes() {
        let caches = caches();
        caches.stickers().add(Sticker::new(GUILD, 1, "old"));
        let mut incoming = Sticker::new(GUILD, 2, "new");
        incoming.guild_id = None;
        let event = caches.handle_event(GatewayEvent::GuildStickersUpdate(GuildStickersUpdate {
            guild_id: GUILD,
            stickers: vec![incoming],
            removed_stickers: vec![],
        }));
        let GatewayEvent::GuildStickersUpdate(update) = event else {
            panic!("expected GUILD_STICKERS_UPDATE");
        };
        assert_eq!(update.removed_stickers.len(), 1);
        assert!(caches.stickers().get(GUILD, 2).is_some());
        assert!(caches.stickers().get(GUILD, 1).is_none());
    }

    #[test]
    fn test_presence_update_attaches_old() {
        let caches = caches();
        caches.presences().add(Presence::new(GUILD, 2, Default::default()));
        let event = caches.handle_event(GatewayEvent::PresenceUpdate(PresenceUpdate {
            presence: Presence::new(GUILD, 2, crate::model::OnlineStatus::Dnd),
            old_presence: None,
        }));
        let GatewayEvent::PresenceUpdate(update) = event else {
            panic!("expected PRESENCE_UPDATE");
        };
        assert_eq!(
            update.old_presence.unwrap().status,
            crate::model::OnlineStatus::Offline
        );
        assert_eq!(
            caches.presences().get(GUILD, 2).unwrap().status,
            crate::model::OnlineStatus::Dnd
        );
    }

    #[test]
    fn test_voice_state_connect_and_disconnect() {
        let caches = caches();
        let voice = GuildChannel::Voice(VoiceChannel::new(GUILD, 30, "lounge"));
        caches.channels().add(voice.clone());

        caches.handle_event(GatewayEvent::VoiceStateUpdate(VoiceStateUpdate {
            voice_state: VoiceState::new(GUILD, 2, Some(30)),
            member: Some(member(0, 2, vec![])),
            old_voice_state: None,
        }));
        assert!(caches.members().get(GUILD, 2).is_some());
        assert_eq!(caches.audio_channel_members(&voice).len(), 1);

        let event = caches.handle_event(GatewayEvent::VoiceStateUpdate(VoiceStateUpdate {
            voice_state: VoiceState::new(GUILD, 2, None),
            member: None,
            old_voice_state: None,
        }));
        let GatewayEvent::VoiceStateUpdate(update) = event else {
            panic!("expected VOICE_STATE_UPDATE");
        };
        assert_eq!(update.old_voice_state.unwrap().channel_id, Some(30));
        assert!(caches.voice_states().get(GUILD, 2).is_none());
        assert!(caches.audio_channel_members(&voice).is_empty());
    }

    #[test]
    fn test_pass_through_events_unchanged() {
        let caches = caches();
        let events = vec![
            GatewayEvent::TypingStart(TypingStart {
                channel_id: 1,
                guild_id: Some(GUILD),
                user_id: 2,
                timestamp: 0,
            }),
            GatewayEvent::GuildBanAdd(GuildBan {
                guild_id: GUILD,
                user: User::new(2, "x"),
            }),
            GatewayEvent::InviteDelete(InviteDelete {
                code: "abc".into(),
                channel_id: 1,
                guild_id: None,
            }),
        ];
        for event in events {
            assert_eq!(caches.handle_event(event.clone()), event);
        }
    }

    // ═══════════════════════════════════════════════════════════════
    //  7. Retention flags
    // ═══════════════════════════════════════════════════════════════

    #[test]
    fn test_disabled_categories_report_nothing() {
        let caches = Caches::new(CacheFlags::empty());
        set_self(&caches, ME, &[GUILD]);
        hydrate_full_guild(&caches, GUILD);
        add_member(&caches, member(GUILD, 3, vec![]));
        caches.handle_event(GatewayEvent::MessageCreate(MessageCreate {
            message: message(GUILD + 10, 9, Some(GUILD)),
        }));

        assert!(caches.guilds().get(GUILD).is_none());
        assert_eq!(caches.guilds().len(), 0);
        assert_eq!(caches.channels().len(), 0);
        assert_eq!(caches.roles().len(), 0);
        assert_eq!(caches.members().len(), 0);
        assert_eq!(caches.thread_members().len(), 0);
        assert_eq!(caches.presences().len(), 0);
        assert_eq!(caches.voice_states().len(), 0);
        assert_eq!(caches.messages().len(), 0);
        assert_eq!(caches.emojis().len(), 0);
        assert_eq!(caches.stickers().len(), 0);
        assert_eq!(caches.stage_instances().len(), 0);
        assert_eq!(caches.scheduled_events().len(), 0);
        assert!(caches.thread(GUILD + 12).is_none());

        // Always retained
        assert!(caches.self_user().get().is_some());
        assert!(!caches.guilds().is_unready(GUILD));
    }

    #[test]
    fn test_partial_retention() {
        let caches = Caches::new(CacheFlags::GUILDS | CacheFlags::MEMBERS);
        hydrate_full_guild(&caches, GUILD);
        assert!(caches.guilds().get(GUILD).is_some());
        assert_eq!(caches.members().group_len(GUILD), 1);
        assert_eq!(caches.roles().group_len(GUILD), 0);
        // Without cached roles the member has no permissions at all
        let m = caches.members().get(GUILD, 2).unwrap();
        assert_eq!(caches.member_permissions(&m), Permissions::empty());
    }

    // ═══════════════════════════════════════════════════════════════
    //  8. Replay and concurrency
    // ═══════════════════════════════════════════════════════════════

    #[test]
    fn test_replay_json_lines() {
        let lines = [
            r#"{"t":"READY","d":{"user":{"id":7,"username":"bot","bot":true},"guilds":[{"id":100,"unavailable":true}]}}"#,
            r#"{"t":"GUILD_CREATE","d":{"id":100,"name":"g","owner_id":1,"member_count":1,"roles":[{"id":100,"name":"@everyone","permissions":3072}],"channels":[{"type":"text","id":10,"name":"general"}],"members":[{"user":{"id":7,"username":"bot"}}]}}"#,
            r#"{"t":"MESSAGE_CREATE","d":{"id":1,"channel_id":10,"author":{"id":7,"username":"bot"},"content":"hello","timestamp":"2024-01-01T00:00:00Z"}}"#,
            r#"{"t":"GUILD_MEMBER_ADD","d":{"guild_id":100,"user":{"id":8,"username":"ann"}}}"#,
        ];
        let caches = caches();
        for line in lines {
            let event: GatewayEvent = serde_json::from_str(line).unwrap();
            caches.handle_event(event);
        }

        assert!(!caches.guilds().is_unready(100));
        assert_eq!(caches.guilds().get(100).unwrap().member_count, 2);
        assert_eq!(caches.channels().get(10).unwrap().last_message_id(), Some(1));
        let me = caches.self_member(100).unwrap();
        let channel = caches.channels().get(10).unwrap();
        assert_eq!(
            caches.member_permissions_in_channel(&channel, &me),
            Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES
        );
    }

    #[test]
    fn test_concurrent_event_streams_and_queries() {
        let caches = Arc::new(caches());
        create_guild(&caches, GUILD, Permissions::VIEW_CHANNEL, 0);

        std::thread::scope(|s| {
            for shard in 0..4u64 {
                let caches = Arc::clone(&caches);
                s.spawn(move || {
                    for i in 0..100 {
                        add_member(&caches, member(GUILD, 10_000 + shard * 1000 + i, vec![GUILD]));
                    }
                });
            }
            let caches = Arc::clone(&caches);
            s.spawn(move || {
                for _ in 0..100 {
                    caches.members().group_for_each(GUILD, |m| {
                        assert_eq!(caches.member_permissions(m), Permissions::VIEW_CHANNEL);
                    });
                }
            });
        });

        assert_eq!(caches.members().group_len(GUILD), 400);
        assert_eq!(caches.guilds().get(GUILD).unwrap().member_count, 400);
    }
}
