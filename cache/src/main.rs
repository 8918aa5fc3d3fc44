use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use guildcache::{CacheConfig, Caches, GatewayEvent};

/// Replay a JSON-lines capture of gateway dispatches through the cache.
#[derive(Parser)]
#[command(name = "guildcache", version)]
struct Args {
    /// File with one `{"t": ..., "d": ...}` dispatch per line.
    events: PathBuf,

    /// Cache configuration file.
    #[arg(short, long, default_value = "guildcache.toml")]
    config: PathBuf,

    /// Print a per-category breakdown for this guild after the replay.
    #[arg(short, long)]
    guild: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("guildcache=info")),
        )
        .init();

    let args = Args::parse();
    let config = CacheConfig::load(&args.config)?;
    let caches = Caches::from_config(&config);

    let file = File::open(&args.events)
        .with_context(|| format!("failed to open {}", args.events.display()))?;

    let mut applied = 0usize;
    let mut skipped = 0usize;
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("failed to read {}", args.events.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<GatewayEvent>(&line) {
            Ok(event) => {
                caches.handle_event(event);
                applied += 1;
            }
            Err(e) => {
                warn!(line = index + 1, error = %e, "skipping undecodable event");
                skipped += 1;
            }
        }
    }

    info!(
        applied,
        skipped,
        guilds = caches.guilds().len(),
        channels = caches.channels().len(),
        roles = caches.roles().len(),
        members = caches.members().len(),
        presences = caches.presences().len(),
        voice_states = caches.voice_states().len(),
        messages = caches.messages().len(),
        "replay finished"
    );

    if let Some(guild_id) = args.guild {
        report_guild(&caches, guild_id);
    }
    Ok(())
}

fn report_guild(caches: &Caches, guild_id: u64) {
    let Some(guild) = caches.guilds().get(guild_id) else {
        warn!(guild_id, "guild not cached");
        return;
    };
    info!(
        guild_id,
        name = %guild.name,
        member_count = guild.member_count,
        unready = caches.guilds().is_unready(guild_id),
        unavailable = caches.guilds().is_unavailable(guild_id),
        channels = caches.channels().guild_len(guild_id),
        roles = caches.roles().group_len(guild_id),
        members = caches.members().group_len(guild_id),
        voice_states = caches.voice_states().group_len(guild_id),
        emojis = caches.emojis().group_len(guild_id),
        stickers = caches.stickers().group_len(guild_id),
        stage_instances = caches.stage_instances().group_len(guild_id),
        scheduled_events = caches.scheduled_events().group_len(guild_id),
        "guild summary"
    );
    if let Some(me) = caches.self_member(guild_id) {
        info!(
            guild_id,
            permissions = caches.member_permissions(&me).bits(),
            "current user permissions"
        );
    }
}
