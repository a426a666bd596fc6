use super::storage::ResponseCache;
use std::sync::atomic::Ordering;
use tokio::time::Instant;
use tracing::debug;

impl ResponseCache {
    /// Remove every entry expired at `now`. Returns how many were removed.
    ///
    /// Lookups never serve expired entries anyway; this only reclaims
    /// memory held by keys nobody asks for any more.
    pub fn sweep(&self, now: Instant) -> usize {
        let mut removed = 0;

        for shard in self.shards.iter() {
            let mut shard = shard.lock();
            let expired: Vec<_> = shard
                .iter()
                .filter(|(_, entry)| entry.is_expired(now))
                .map(|(key, _)| key.clone())
                .collect();

            for key in expired {
                if let Some(entry) = shard.pop(&key) {
                    self.untrack(entry.kind);
                    removed += 1;
                }
            }
        }

        self.stats.sweeps.fetch_add(1, Ordering::Relaxed);
        if removed > 0 {
            debug!(removed, cache_size = self.len(), "Cache sweep completed");
        }
        removed
    }

    /// Number of sweeps run so far.
    pub fn sweep_count(&self) -> u64 {
        self.stats.sweeps.load(Ordering::Relaxed)
    }
}
