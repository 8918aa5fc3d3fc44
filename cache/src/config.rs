use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tracing::info;

use crate::flags::CacheFlags;

/// Environment variable overriding `[cache] retain`.
pub const RETAIN_ENV: &str = "GUILDCACHE_RETAIN";

/// On-disk layout of guildcache.toml.
#[derive(Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    cache: CacheSection,
}

#[derive(Deserialize)]
#[serde(default)]
struct CacheSection {
    /// Category names to retain, e.g. `["guilds", "channels", "members"]`.
    retain: Vec<String>,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            retain: CacheFlags::default().names(),
        }
    }
}

/// Runtime cache configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheConfig {
    pub flags: CacheFlags,
}

impl CacheConfig {
    /// Load config from a TOML file. Falls back to defaults if the file doesn't exist.
    /// `GUILDCACHE_RETAIN` overrides the file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with_env(path, |key| std::env::var(key).ok())
    }

    /// Like [`Self::load`], reading environment variables through `env`.
    pub fn load_with_env(path: impl AsRef<Path>, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            Self::from_toml(&contents)
                .with_context(|| format!("failed to parse config file {}", path.display()))?
        } else {
            info!(path = %path.display(), "no config file found, using defaults");
            Self::default()
        };

        config.apply_env_overrides(env)?;
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(contents)?;
        let flags = parse_flags(file.cache.retain.iter().map(String::as_str))?;
        Ok(Self { flags })
    }

    fn apply_env_overrides(&mut self, env: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(v) = env(RETAIN_ENV) {
            self.flags = parse_flags(v.split(',').map(str::trim).filter(|s| !s.is_empty()))
                .with_context(|| format!("invalid {RETAIN_ENV}"))?;
        }
        Ok(())
    }
}

fn parse_flags<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<CacheFlags> {
    let mut flags = CacheFlags::empty();
    for name in names {
        match CacheFlags::parse_name(name) {
            Some(flag) => flags |= flag,
            None => bail!("unknown cache category '{name}'"),
        }
    }
    Ok(flags)
}
