use super::cache::ResponseCache;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Background task that drops expired cache entries.
///
/// Lookups already refuse expired entries; sweeping only returns their
/// memory early.
pub struct CacheSweeper {
    cache: Arc<ResponseCache>,
    interval: Duration,
    shutdown: CancellationToken,
}

impl CacheSweeper {
    pub fn new(cache: Arc<ResponseCache>, interval: Duration, shutdown: CancellationToken) -> Self {
        Self {
            cache,
            interval,
            shutdown,
        }
    }

    /// Start the sweep loop. It exits when the shutdown token is cancelled.
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(interval_secs = self.interval.as_secs(), "Cache sweeper started");

            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => break,
                    _ = sleep(self.interval) => Self::sweep_cycle(&self.cache),
                }
            }

            info!("Cache sweeper stopped");
        })
    }

    fn sweep_cycle(cache: &ResponseCache) {
        debug!("Starting cache sweep cycle");

        let removed = cache.sweep(Instant::now());

        if removed > 0 {
            info!(removed, cache_size = cache.len(), "Cache sweep completed");
        } else {
            debug!("No expired entries to sweep");
        }
    }
}
