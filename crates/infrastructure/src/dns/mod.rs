pub mod authority;
pub mod cache;
pub mod cache_sweeper;
pub mod events;
pub mod forwarding;
pub mod middleware;
pub mod transport;

pub use authority::Zone;
pub use cache::{CacheKey, EvictionStrategy, ResponseCache, TtlPolicy};
pub use cache_sweeper::CacheSweeper;
pub use events::InMemoryMetrics;
pub use forwarding::ForwardingUpstream;
pub use middleware::{AutoStage, CacheStage, ChaosStage, MetricsStage, ProxyStage};
