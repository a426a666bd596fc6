//! In-process metrics collection
//!
//! `InMemoryMetrics` implements the application's `MetricsSink` port with
//! lock-free counters keyed by zone, protocol, rcode and cache status. An
//! exporter reads them through the accessor methods.

pub mod metrics;

pub use metrics::InMemoryMetrics;
