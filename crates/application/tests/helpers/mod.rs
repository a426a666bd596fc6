#![allow(dead_code)]

mod mock_stages;
mod recording_metrics;

pub use mock_stages::*;
pub use recording_metrics::RecordingMetrics;

use ferrous_chain_domain::{DnsQuery, RecordType};

pub fn a_query(name: &str) -> DnsQuery {
    DnsQuery::new(name, RecordType::A).with_id(4242)
}
