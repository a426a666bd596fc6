pub mod metrics_sink;
pub mod middleware;
pub mod response_writer;
pub mod upstream;

pub use metrics_sink::{CacheStatus, MetricsSink, NoopMetrics};
pub use middleware::{Middleware, Next, Served};
pub use response_writer::{ResponseBuffer, ResponseWriter};
pub use upstream::Upstream;
