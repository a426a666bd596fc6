use anyhow::Context;
use ferrous_chain_application::ports::{MetricsSink, Middleware};
use ferrous_chain_application::services::{Chain, ChainBuilder, ZoneRouter};
use ferrous_chain_domain::config::{CacheConfig, StageConfig, ZoneConfig};
use ferrous_chain_domain::Config;
use ferrous_chain_infrastructure::dns::{
    AutoStage, CacheStage, CacheSweeper, ChaosStage, ForwardingUpstream, InMemoryMetrics,
    MetricsStage, ProxyStage, ResponseCache, Zone,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Everything the listeners need, built once from the configuration.
pub struct DnsServices {
    pub router: Arc<ZoneRouter>,
    pub metrics: Arc<InMemoryMetrics>,
    /// One cache per configured `cache` stage
    pub caches: Vec<Arc<ResponseCache>>,
    /// Handles for loading and unloading authoritative zones at runtime
    pub auto_stages: Vec<Arc<AutoStage>>,
}

impl DnsServices {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        info!(zones = config.zones.len(), "Initializing DNS services");

        let metrics = Arc::new(InMemoryMetrics::new());
        let sink: Arc<dyn MetricsSink> = metrics.clone();
        let mut caches = Vec::new();
        let mut auto_stages = Vec::new();

        let mut chains = Vec::with_capacity(config.zones.len());
        for zone in &config.zones {
            let chain = Self::build_chain(zone, &config.cache, &sink, &mut caches, &mut auto_stages)?;
            info!(
                zone = %chain.zone(),
                stages = ?chain.stage_names(),
                "Chain built"
            );
            chains.push(Arc::new(chain));
        }

        let router = Arc::new(ZoneRouter::new(chains).with_metrics(sink));

        Ok(Self {
            router,
            metrics,
            caches,
            auto_stages,
        })
    }

    fn build_chain(
        zone: &ZoneConfig,
        cache_config: &CacheConfig,
        sink: &Arc<dyn MetricsSink>,
        caches: &mut Vec<Arc<ResponseCache>>,
        auto_stages: &mut Vec<Arc<AutoStage>>,
    ) -> anyhow::Result<Chain> {
        let mut builder = ChainBuilder::new(&zone.zone)
            .fallback(zone.fallback()?)
            .metrics(Arc::clone(sink));

        for stage in &zone.stages {
            let built: Arc<dyn Middleware> = match stage {
                StageConfig::Prometheus => Arc::new(MetricsStage::new(Arc::clone(sink))),
                StageConfig::Cache { capacity } => {
                    let cache = Arc::new(ResponseCache::from_config(cache_config, *capacity)?);
                    caches.push(Arc::clone(&cache));
                    Arc::new(CacheStage::new(cache, Arc::clone(sink)))
                }
                StageConfig::Chaos {
                    version,
                    authors,
                    hostname,
                } => Arc::new(ChaosStage::new(
                    version.clone(),
                    authors.clone(),
                    hostname.clone(),
                )),
                StageConfig::Proxy {
                    upstreams,
                    timeout_ms,
                } => {
                    let servers = upstreams
                        .iter()
                        .map(|u| u.parse::<SocketAddr>())
                        .collect::<Result<Vec<_>, _>>()
                        .with_context(|| format!("Zone '{}': invalid upstream", zone.zone))?;
                    let upstream =
                        ForwardingUpstream::new(servers, Duration::from_millis(*timeout_ms));
                    Arc::new(ProxyStage::new(Arc::new(upstream)))
                }
                StageConfig::Auto { zones } => {
                    let loaded = zones
                        .iter()
                        .map(Zone::from_config)
                        .collect::<Result<Vec<_>, _>>()?;
                    let auto = Arc::new(AutoStage::new(loaded));
                    auto_stages.push(Arc::clone(&auto));
                    auto
                }
            };
            builder = builder.stage(built);
        }

        Ok(builder.build())
    }

    /// Start one sweeper per cache. They stop when `shutdown` is cancelled.
    pub fn start_sweepers(
        &self,
        interval: Duration,
        shutdown: &CancellationToken,
    ) -> Vec<JoinHandle<()>> {
        self.caches
            .iter()
            .map(|cache| CacheSweeper::new(Arc::clone(cache), interval, shutdown.clone()).start())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
[cache]
capacity = 256
shards = 4

[[zones]]
zone = "."
stages = [
    { kind = "prometheus" },
    { kind = "chaos", version = "test-1.0", hostname = "dns01" },
    { kind = "cache", capacity = 64 },
    { kind = "proxy", upstreams = ["192.0.2.53:53"] },
]

[[zones]]
zone = "example.org."
fallback_rcode = "SERVFAIL"
stages = [
    { kind = "cache" },
    { kind = "auto", zones = [
        { origin = "example.org.", records = [
            { name = "@", record_type = "SOA", value = "ns1 hostmaster 1 7200 3600 1209600 60" },
            { name = "www", record_type = "A", value = "192.0.2.10" },
        ] },
    ] },
]
"#;

    #[test]
    fn test_builds_one_chain_per_zone() {
        let config = Config::from_toml(CONFIG).unwrap();
        config.validate().unwrap();

        let services = DnsServices::new(&config).unwrap();

        let zones: Vec<&str> = services.router.zones().collect();
        assert_eq!(zones.len(), 2);
        assert!(zones.contains(&"example.org."));

        let root = services.router.route("www.example.net.").unwrap();
        assert_eq!(root.stage_names(), vec!["prometheus", "chaos", "cache", "proxy"]);
        let org = services.router.route("www.example.org.").unwrap();
        assert_eq!(org.stage_names(), vec!["cache", "auto"]);
    }

    #[test]
    fn test_each_cache_stage_gets_its_own_cache() {
        let config = Config::from_toml(CONFIG).unwrap();
        let services = DnsServices::new(&config).unwrap();

        assert_eq!(services.caches.len(), 2);
        assert_eq!(services.caches[0].capacity(), 64);
        assert_eq!(services.caches[1].capacity(), 256);
        assert!(!Arc::ptr_eq(&services.caches[0], &services.caches[1]));
        assert_eq!(
            services.auto_stages[0].zone_names(),
            vec!["example.org.".to_string()]
        );
    }

    #[test]
    fn test_default_config_builds() {
        let services = DnsServices::new(&Config::default()).unwrap();
        assert_eq!(services.caches.len(), 1);
        assert!(services.router.route("anything.test.").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweepers_stop_on_shutdown() {
        let services = DnsServices::new(&Config::from_toml(CONFIG).unwrap()).unwrap();
        let shutdown = CancellationToken::new();

        let handles = services.start_sweepers(Duration::from_secs(30), &shutdown);
        assert_eq!(handles.len(), 2);

        shutdown.cancel();
        for handle in handles {
            handle.await.unwrap();
        }
    }
}
