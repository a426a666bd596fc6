use async_trait::async_trait;
use ferrous_chain_domain::{DnsMessage, DnsQuery, DomainError};

/// Forwarding transport used by the proxy stage.
///
/// Implementations own their timeouts and retries; the stage treats the
/// exchange as opaque.
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn exchange(&self, query: &DnsQuery) -> Result<DnsMessage, DomainError>;

    /// Human-readable target, used in logs.
    fn describe(&self) -> String;
}
