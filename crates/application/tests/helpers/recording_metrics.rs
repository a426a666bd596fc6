use ferrous_chain_application::ports::{CacheStatus, MetricsSink};
use ferrous_chain_domain::{DnsProtocol, DnsQuery, Rcode};
use std::sync::Mutex;
use std::time::Duration;

/// Sink that keeps every observation for later assertions.
#[derive(Default)]
pub struct RecordingMetrics {
    completed: Mutex<Vec<(String, DnsProtocol, Rcode)>>,
    observed: Mutex<Vec<(String, Option<Rcode>)>>,
    statuses: Mutex<Vec<(String, CacheStatus)>>,
    faults: Mutex<Vec<String>>,
}

impl RecordingMetrics {
    pub fn completed(&self) -> Vec<(String, DnsProtocol, Rcode)> {
        self.completed.lock().unwrap().clone()
    }

    pub fn observed(&self) -> Vec<(String, Option<Rcode>)> {
        self.observed.lock().unwrap().clone()
    }

    pub fn statuses(&self) -> Vec<(String, CacheStatus)> {
        self.statuses.lock().unwrap().clone()
    }

    pub fn faults(&self) -> usize {
        self.faults.lock().unwrap().len()
    }
}

impl MetricsSink for RecordingMetrics {
    fn response_completed(&self, zone: &str, protocol: DnsProtocol, rcode: Rcode) {
        self.completed
            .lock()
            .unwrap()
            .push((zone.to_string(), protocol, rcode));
    }

    fn request_observed(
        &self,
        zone: &str,
        _query: &DnsQuery,
        rcode: Option<Rcode>,
        _duration: Duration,
    ) {
        self.observed.lock().unwrap().push((zone.to_string(), rcode));
    }

    fn cache_status(&self, zone: &str, status: CacheStatus) {
        self.statuses
            .lock()
            .unwrap()
            .push((zone.to_string(), status));
    }

    fn internal_fault(&self, zone: &str) {
        self.faults.lock().unwrap().push(zone.to_string());
    }
}
