use bitflags::bitflags;

bitflags! {
    /// Which entity categories the cache retains. A category whose flag is
    /// off is backed by a disabled store and never holds anything.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CacheFlags: u32 {
        const GUILDS           = 1 << 0;
        const CHANNELS         = 1 << 1;
        const ROLES            = 1 << 2;
        const MEMBERS          = 1 << 3;
        const THREAD_MEMBERS   = 1 << 4;
        const PRESENCES        = 1 << 5;
        const VOICE_STATES     = 1 << 6;
        const MESSAGES         = 1 << 7;
        const EMOJIS           = 1 << 8;
        const STICKERS         = 1 << 9;
        const STAGE_INSTANCES  = 1 << 10;
        const SCHEDULED_EVENTS = 1 << 11;
    }
}

impl Default for CacheFlags {
    /// Everything except the two high-volume categories.
    fn default() -> Self {
        Self::all().difference(Self::MESSAGES | Self::PRESENCES)
    }
}

impl CacheFlags {
    /// Look up one flag by name, case-insensitively (`"voice_states"`).
    /// `"all"` and `"none"` name the full and empty sets.
    pub fn parse_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.eq_ignore_ascii_case("all") {
            return Some(Self::all());
        }
        if name.eq_ignore_ascii_case("none") {
            return Some(Self::empty());
        }
        Self::from_name(&name.to_ascii_uppercase())
    }

    /// Lower-case names of the set flags, in bit order.
    pub fn names(&self) -> Vec<String> {
        self.iter_names()
            .map(|(name, _)| name.to_ascii_lowercase())
            .collect()
    }
}
