#![allow(dead_code)]
pub mod messages;
pub mod mock_dns_server;
pub mod mock_upstream;

use ferrous_chain_application::ports::ResponseBuffer;
use ferrous_chain_application::services::Chain;
use ferrous_chain_application::RequestContext;
use ferrous_chain_domain::{DnsMessage, DnsQuery, Rcode};
use ferrous_chain_infrastructure::dns::cache::{EvictionStrategy, ResponseCache, TtlPolicy};

pub fn policy() -> TtlPolicy {
    TtlPolicy {
        min_ttl: 0,
        max_ttl: 3600,
        negative_ttl: 30,
        max_negative_ttl: 1800,
    }
}

/// Single-shard cache, so eviction order is exact LRU.
pub fn lru_cache(capacity: usize) -> ResponseCache {
    ResponseCache::new(capacity, 1, policy(), EvictionStrategy::Lru)
}

/// Dispatch `query` through `chain` and return the rcode and written reply.
pub async fn ask(chain: &Chain, query: &DnsQuery) -> (Rcode, DnsMessage) {
    let mut writer = ResponseBuffer::new();
    let rcode = chain
        .dispatch(&RequestContext::new(chain.zone()), &mut writer, query)
        .await;
    let reply = writer
        .into_message()
        .expect("dispatch always writes a response");
    (rcode, reply)
}
