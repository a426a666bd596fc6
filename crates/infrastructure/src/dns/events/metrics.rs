use dashmap::DashMap;
use ferrous_chain_application::ports::{CacheStatus, MetricsSink};
use ferrous_chain_domain::{DnsProtocol, DnsQuery, Rcode, RecordType};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

type RcodeKey = (Arc<str>, DnsProtocol, Rcode);
/// zone, protocol, address family
type RequestKey = (Arc<str>, DnsProtocol, &'static str);

/// Request metrics tracker
///
/// Thread-safe: atomics for global counters, DashMap for labelled ones.
#[derive(Clone, Default)]
pub struct InMemoryMetrics {
    /// Completed responses per zone/protocol/rcode
    rcodes: Arc<DashMap<RcodeKey, u64>>,

    /// Requests seen by the metrics stage per zone/protocol/family
    requests: Arc<DashMap<RequestKey, u64>>,

    /// Requests seen by the metrics stage per zone/qtype
    qtypes: Arc<DashMap<(Arc<str>, RecordType), u64>>,

    /// Reply rcodes seen by the metrics stage per zone
    observed_rcodes: Arc<DashMap<(Arc<str>, Rcode), u64>>,

    /// Sum of request durations per zone, in microseconds
    durations_us: Arc<DashMap<Arc<str>, u64>>,

    cache_statuses: Arc<DashMap<(Arc<str>, CacheStatus), u64>>,

    /// Latest cache size gauge per zone/kind
    cache_sizes: Arc<DashMap<(Arc<str>, CacheStatus), usize>>,

    faults: Arc<DashMap<Arc<str>, u64>>,

    total_responses: Arc<AtomicU64>,
}

impl InMemoryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_responses(&self) -> u64 {
        self.total_responses.load(Ordering::Relaxed)
    }

    /// Responses with `rcode` for `zone`, over every protocol.
    pub fn rcode_count(&self, zone: &str, rcode: Rcode) -> u64 {
        self.rcodes
            .iter()
            .filter(|e| &*e.key().0 == zone && e.key().2 == rcode)
            .map(|e| *e.value())
            .sum()
    }

    pub fn rcode_count_for(&self, zone: &str, protocol: DnsProtocol, rcode: Rcode) -> u64 {
        self.rcodes
            .get(&(Arc::from(zone), protocol, rcode))
            .map(|v| *v)
            .unwrap_or(0)
    }

    /// Requests observed for `zone`, over every protocol and family.
    pub fn request_count(&self, zone: &str) -> u64 {
        self.requests
            .iter()
            .filter(|e| &*e.key().0 == zone)
            .map(|e| *e.value())
            .sum()
    }

    /// `family` is "1" for IPv4 and "2" for IPv6.
    pub fn request_count_for(&self, zone: &str, protocol: DnsProtocol, family: &str) -> u64 {
        self.requests
            .iter()
            .filter(|e| {
                let (z, p, f) = e.key();
                &**z == zone && *p == protocol && *f == family
            })
            .map(|e| *e.value())
            .sum()
    }

    pub fn qtype_count(&self, zone: &str, record_type: RecordType) -> u64 {
        self.qtypes
            .get(&(Arc::from(zone), record_type))
            .map(|v| *v)
            .unwrap_or(0)
    }

    /// Replies with `rcode` the metrics stage saw for `zone`.
    pub fn observed_rcode_count(&self, zone: &str, rcode: Rcode) -> u64 {
        self.observed_rcodes
            .get(&(Arc::from(zone), rcode))
            .map(|v| *v)
            .unwrap_or(0)
    }

    /// Mean duration of requests observed for `zone`.
    pub fn avg_duration(&self, zone: &str) -> Duration {
        let count = self.request_count(zone);
        if count == 0 {
            return Duration::ZERO;
        }
        let total = self.durations_us.get(zone).map(|v| *v).unwrap_or(0);
        Duration::from_micros(total / count)
    }

    pub fn cache_status_count(&self, zone: &str, status: CacheStatus) -> u64 {
        self.cache_statuses
            .get(&(Arc::from(zone), status))
            .map(|v| *v)
            .unwrap_or(0)
    }

    /// Positive and negative hits together.
    pub fn cache_hits(&self, zone: &str) -> u64 {
        self.cache_status_count(zone, CacheStatus::Success)
            + self.cache_status_count(zone, CacheStatus::Denial)
    }

    pub fn cache_misses(&self, zone: &str) -> u64 {
        self.cache_status_count(zone, CacheStatus::Miss)
    }

    pub fn cache_size(&self, zone: &str, kind: CacheStatus) -> usize {
        self.cache_sizes
            .get(&(Arc::from(zone), kind))
            .map(|v| *v)
            .unwrap_or(0)
    }

    pub fn faults(&self, zone: &str) -> u64 {
        self.faults.get(zone).map(|v| *v).unwrap_or(0)
    }

    /// Get top N zones by response count
    pub fn top_zones(&self, n: usize) -> Vec<(String, u64)> {
        let mut totals: std::collections::HashMap<String, u64> = Default::default();
        for entry in self.rcodes.iter() {
            *totals.entry(entry.key().0.to_string()).or_default() += *entry.value();
        }

        let mut zones: Vec<_> = totals.into_iter().collect();
        zones.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        zones.truncate(n);
        zones
    }

    /// Reset all metrics
    pub fn reset(&self) {
        self.rcodes.clear();
        self.requests.clear();
        self.qtypes.clear();
        self.observed_rcodes.clear();
        self.durations_us.clear();
        self.cache_statuses.clear();
        self.cache_sizes.clear();
        self.faults.clear();
        self.total_responses.store(0, Ordering::Relaxed);
    }
}

impl MetricsSink for InMemoryMetrics {
    fn response_completed(&self, zone: &str, protocol: DnsProtocol, rcode: Rcode) {
        self.total_responses.fetch_add(1, Ordering::Relaxed);
        self.rcodes
            .entry((Arc::from(zone), protocol, rcode))
            .and_modify(|c| *c += 1)
            .or_insert(1);
    }

    fn request_observed(
        &self,
        zone: &str,
        query: &DnsQuery,
        rcode: Option<Rcode>,
        duration: Duration,
    ) {
        let zone: Arc<str> = Arc::from(zone);

        if let Some(rcode) = rcode {
            self.observed_rcodes
                .entry((Arc::clone(&zone), rcode))
                .and_modify(|c| *c += 1)
                .or_insert(1);
        }

        self.requests
            .entry((Arc::clone(&zone), query.protocol, query.family()))
            .and_modify(|c| *c += 1)
            .or_insert(1);

        self.qtypes
            .entry((Arc::clone(&zone), query.record_type))
            .and_modify(|c| *c += 1)
            .or_insert(1);

        let micros = duration.as_micros() as u64;
        self.durations_us
            .entry(zone)
            .and_modify(|c| *c += micros)
            .or_insert(micros);
    }

    fn cache_status(&self, zone: &str, status: CacheStatus) {
        self.cache_statuses
            .entry((Arc::from(zone), status))
            .and_modify(|c| *c += 1)
            .or_insert(1);
    }

    fn cache_size(&self, zone: &str, kind: CacheStatus, size: usize) {
        self.cache_sizes.insert((Arc::from(zone), kind), size);
    }

    fn internal_fault(&self, zone: &str) {
        self.faults
            .entry(Arc::from(zone))
            .and_modify(|c| *c += 1)
            .or_insert(1);
    }
}
