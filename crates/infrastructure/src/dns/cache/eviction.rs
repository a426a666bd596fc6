use std::fmt;
use std::str::FromStr;

/// Which entry a full shard gives up to make room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvictionStrategy {
    /// Least recently used
    #[default]
    Lru,
    /// An already expired entry among the least recently used ones,
    /// falling back to plain LRU
    ExpiredFirst,
}

impl EvictionStrategy {
    /// How many entries from the cold end `ExpiredFirst` inspects.
    pub const EXPIRED_SCAN: usize = 8;

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lru => "lru",
            Self::ExpiredFirst => "expired-first",
        }
    }
}

impl FromStr for EvictionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lru" => Ok(Self::Lru),
            "expired-first" | "expired_first" => Ok(Self::ExpiredFirst),
            other => Err(format!("unknown eviction strategy '{other}'")),
        }
    }
}

impl fmt::Display for EvictionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
