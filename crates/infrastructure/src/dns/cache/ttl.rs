use super::entry::EntryKind;
use ferrous_chain_domain::config::CacheConfig;
use ferrous_chain_domain::DnsMessage;

/// Decides how long a response may stay cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlPolicy {
    pub min_ttl: u32,
    pub max_ttl: u32,
    /// Used for negative answers carrying no SOA
    pub negative_ttl: u32,
    pub max_negative_ttl: u32,
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}

impl TtlPolicy {
    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            min_ttl: config.min_ttl,
            max_ttl: config.max_ttl,
            negative_ttl: config.negative_ttl,
            max_negative_ttl: config.max_negative_ttl,
        }
    }

    /// TTL to store `msg` with, or `None` when it must not be stored.
    ///
    /// `min_ttl` lifts short TTLs, zero included, so only a computed TTL of
    /// zero is refused.
    pub fn ttl_for(&self, msg: &DnsMessage, kind: EntryKind) -> Option<u32> {
        let ttl = match kind {
            EntryKind::Positive => msg
                .min_answer_ttl()?
                .max(self.min_ttl)
                .min(self.max_ttl),
            EntryKind::Negative => msg
                .negative_soa_ttl()
                .unwrap_or(self.negative_ttl)
                .max(self.min_ttl)
                .min(self.max_negative_ttl),
        };
        (ttl > 0).then_some(ttl)
    }
}
