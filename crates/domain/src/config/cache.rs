use serde::{Deserialize, Serialize};

/// Response cache configuration
///
/// Every zone block that lists a `cache` stage gets its own cache built
/// from these values.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Maximum number of cached responses
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Number of independently locked shards.
    /// With 1 shard eviction is exact global LRU.
    #[serde(default = "default_shards")]
    pub shards: usize,

    /// Floor applied to every computed TTL (seconds)
    #[serde(default = "default_min_ttl")]
    pub min_ttl: u32,

    /// Ceiling for positive answers (seconds)
    #[serde(default = "default_max_ttl")]
    pub max_ttl: u32,

    /// Fallback TTL for negative answers without an SOA (seconds)
    #[serde(default = "default_negative_ttl")]
    pub negative_ttl: u32,

    /// Ceiling for negative answers (seconds)
    #[serde(default = "default_max_negative_ttl")]
    pub max_negative_ttl: u32,

    /// Eviction policy: "lru" or "expired-first"
    #[serde(default = "default_eviction")]
    pub eviction: String,

    /// Interval of the background sweep removing expired entries (seconds).
    /// 0 disables the sweep; expiry is still enforced on lookup.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

fn default_capacity() -> usize {
    10_000
}

fn default_shards() -> usize {
    16
}

fn default_min_ttl() -> u32 {
    5
}

fn default_max_ttl() -> u32 {
    3600
}

fn default_negative_ttl() -> u32 {
    30
}

fn default_max_negative_ttl() -> u32 {
    1800
}

fn default_eviction() -> String {
    "lru".to_string()
}

fn default_sweep_interval_secs() -> u64 {
    300
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            shards: default_shards(),
            min_ttl: default_min_ttl(),
            max_ttl: default_max_ttl(),
            negative_ttl: default_negative_ttl(),
            max_negative_ttl: default_max_negative_ttl(),
            eviction: default_eviction(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}
