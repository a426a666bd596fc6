use super::entry::{CacheEntry, EntryKind};
use super::eviction::EvictionStrategy;
use super::stats::CacheStats;
use super::ttl::TtlPolicy;
use super::CacheKey;
use ferrous_chain_domain::config::{CacheConfig, ConfigError};
use ferrous_chain_domain::{DnsMessage, Rcode, RecordType};
use lru::LruCache;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, info};

pub(super) type Shard = LruCache<CacheKey, Arc<CacheEntry>>;

/// Bounded, TTL-aware store of DNS responses.
///
/// The key space is split over independently locked shards. Each shard is
/// a single `LruCache`, so entries and their recency order live in one
/// structure behind one lock. Expired entries are never served; they are
/// dropped when looked up, when they are picked for eviction, or by
/// [`sweep`](Self::sweep).
pub struct ResponseCache {
    pub(super) shards: Box<[Mutex<Shard>]>,
    per_shard: usize,
    policy: TtlPolicy,
    eviction: EvictionStrategy,
    positive: AtomicUsize,
    negative: AtomicUsize,
    pub(super) stats: Arc<CacheStats>,
}

impl ResponseCache {
    pub fn new(
        capacity: usize,
        shards: usize,
        policy: TtlPolicy,
        eviction: EvictionStrategy,
    ) -> Self {
        let capacity = capacity.max(1);
        let shard_count = shards.clamp(1, capacity);
        let per_shard = capacity / shard_count;

        info!(
            capacity = per_shard * shard_count,
            shards = shard_count,
            eviction = %eviction,
            min_ttl = policy.min_ttl,
            max_ttl = policy.max_ttl,
            "Initializing response cache"
        );

        Self {
            shards: (0..shard_count)
                .map(|_| Mutex::new(LruCache::unbounded()))
                .collect(),
            per_shard,
            policy,
            eviction,
            positive: AtomicUsize::new(0),
            negative: AtomicUsize::new(0),
            stats: Arc::new(CacheStats::default()),
        }
    }

    /// Cache sized by `config`, with `capacity` overriding its entry count.
    pub fn from_config(
        config: &CacheConfig,
        capacity: Option<usize>,
    ) -> Result<Self, ConfigError> {
        let eviction: EvictionStrategy = config
            .eviction
            .parse()
            .map_err(ConfigError::Validation)?;
        Ok(Self::new(
            capacity.unwrap_or(config.capacity),
            config.shards,
            TtlPolicy::from_config(config),
            eviction,
        ))
    }

    #[inline]
    fn shard(&self, key: &CacheKey) -> &Mutex<Shard> {
        let idx = (key.shard_hash() % self.shards.len() as u64) as usize;
        &self.shards[idx]
    }

    /// Live entry for `key`, refreshing its recency.
    pub fn lookup(&self, key: &CacheKey, now: Instant) -> Option<Arc<CacheEntry>> {
        let mut shard = self.shard(key).lock();

        match shard.get(key) {
            Some(entry) if !entry.is_expired(now) => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                return Some(Arc::clone(entry));
            }
            Some(_) => {}
            None => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                return None;
            }
        }

        if let Some(expired) = shard.pop(key) {
            self.untrack(expired.kind);
        }
        drop(shard);

        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        self.stats.lazy_expirations.fetch_add(1, Ordering::Relaxed);
        debug!(qname = %key.qname, qtype = %key.qtype, "Dropped expired cache entry");
        None
    }

    /// Store `msg` under `key`. Returns whether it was stored.
    ///
    /// Replaces any previous entry for the key. When the shard is full one
    /// entry is evicted first according to the eviction strategy.
    pub fn store(&self, key: CacheKey, msg: &DnsMessage, now: Instant) -> bool {
        if !matches!(msg.rcode(), Rcode::NoError | Rcode::NXDomain) {
            return false;
        }
        let kind = EntryKind::of(msg);
        let Some(ttl) = self.policy.ttl_for(msg, kind) else {
            debug!(qname = %key.qname, qtype = %key.qtype, "Response not cacheable: zero TTL");
            return false;
        };
        let entry = Arc::new(CacheEntry::new(msg, kind, ttl, now));

        let mut shard = self.shard(&key).lock();
        if !shard.contains(&key) && shard.len() >= self.per_shard {
            self.evict_one(&mut shard, now);
        }
        if let Some(previous) = shard.put(key, entry) {
            self.untrack(previous.kind);
        }
        self.track(kind);
        drop(shard);

        self.stats.insertions.fetch_add(1, Ordering::Relaxed);
        true
    }

    fn evict_one(&self, shard: &mut Shard, now: Instant) {
        let expired = match self.eviction {
            EvictionStrategy::Lru => None,
            EvictionStrategy::ExpiredFirst => shard
                .iter()
                .rev()
                .take(EvictionStrategy::EXPIRED_SCAN)
                .find(|(_, entry)| entry.is_expired(now))
                .map(|(key, _)| key.clone()),
        };

        let victim = match expired {
            Some(key) => shard.pop_entry(&key),
            None => shard.pop_lru(),
        };

        if let Some((key, entry)) = victim {
            self.untrack(entry.kind);
            self.stats.evictions.fetch_add(1, Ordering::Relaxed);
            debug!(qname = %key.qname, qtype = %key.qtype, "Evicted cache entry");
        }
    }

    #[inline]
    fn counter(&self, kind: EntryKind) -> &AtomicUsize {
        match kind {
            EntryKind::Positive => &self.positive,
            EntryKind::Negative => &self.negative,
        }
    }

    #[inline]
    pub(super) fn track(&self, kind: EntryKind) {
        self.counter(kind).fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(super) fn untrack(&self, kind: EntryKind) {
        self.counter(kind).fetch_sub(1, Ordering::Relaxed);
    }

    /// Maximum number of entries held at once.
    pub fn capacity(&self) -> usize {
        self.per_shard * self.shards.len()
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    pub fn len(&self) -> usize {
        self.shards.iter().map(|s| s.lock().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn len_of(&self, kind: EntryKind) -> usize {
        self.counter(kind).load(Ordering::Relaxed)
    }

    pub fn policy(&self) -> &TtlPolicy {
        &self.policy
    }

    pub fn strategy(&self) -> EvictionStrategy {
        self.eviction
    }

    pub fn stats(&self) -> Arc<CacheStats> {
        Arc::clone(&self.stats)
    }

    /// Drop every entry. Kind counters are settled shard by shard under the
    /// shard lock, so stores racing the clear stay counted.
    pub fn clear(&self) {
        for shard in self.shards.iter() {
            let mut shard = shard.lock();
            for (_, entry) in shard.iter() {
                self.untrack(entry.kind);
            }
            shard.clear();
        }
        self.stats.reset();
        info!("Cache cleared");
    }
}

/// Whether a final response may be memoized for `qtype`.
pub fn is_cacheable(msg: &DnsMessage, qtype: RecordType) -> bool {
    matches!(msg.rcode(), Rcode::NoError | Rcode::NXDomain)
        && !msg.header.truncated
        && !msg.from_cache
        && !qtype.is_transfer()
}
