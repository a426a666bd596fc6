//! Middleware stages
//!
//! Each stage implements the application's `Middleware` port. `CacheStage`
//! and `MetricsStage` wrap the rest of the chain; the others answer or
//! decline on their own.

pub mod auto;
pub mod cache_stage;
pub mod chaos;
pub mod metrics_stage;
pub mod proxy;

pub use auto::AutoStage;
pub use cache_stage::{CacheStage, CachingWriter};
pub use chaos::ChaosStage;
pub use metrics_stage::MetricsStage;
pub use proxy::ProxyStage;
