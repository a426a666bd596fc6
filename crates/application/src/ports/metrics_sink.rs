use ferrous_chain_domain::{DnsProtocol, DnsQuery, Rcode};
use std::time::Duration;

/// Outcome of a cache-stage lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheStatus {
    /// Hit on a positive answer
    Success,
    /// Hit on a negative (NXDOMAIN/NODATA) answer
    Denial,
    Miss,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Denial => "denial",
            Self::Miss => "miss",
        }
    }
}

/// Observation hooks the chain, the cache and the metrics stage call into.
///
/// Aggregation and export format belong to the implementation.
pub trait MetricsSink: Send + Sync {
    /// Called once per completed dispatch with the final rcode.
    fn response_completed(&self, zone: &str, protocol: DnsProtocol, rcode: Rcode);

    /// Called by the metrics stage for every request it observes.
    ///
    /// `rcode` is that of the reply the stage saw, `None` when the rest of
    /// the chain left the answer to the dispatcher's fallback.
    fn request_observed(
        &self,
        _zone: &str,
        _query: &DnsQuery,
        _rcode: Option<Rcode>,
        _duration: Duration,
    ) {
    }

    /// Called on every cache-stage invocation.
    fn cache_status(&self, _zone: &str, _status: CacheStatus) {}

    /// Current number of cached entries of one kind (`Success` or `Denial`).
    fn cache_size(&self, _zone: &str, _kind: CacheStatus, _size: usize) {}

    /// Called once for every stage fault turned into SERVFAIL.
    fn internal_fault(&self, _zone: &str) {}
}

/// Sink that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn response_completed(&self, _zone: &str, _protocol: DnsProtocol, _rcode: Rcode) {}
}
