//! One-shot exchanges with an upstream server.
//!
//! The forwarding upstream speaks UDP first and falls back to TCP when the
//! reply is truncated.

pub mod tcp;
pub mod udp;

use async_trait::async_trait;
use ferrous_chain_domain::{DnsProtocol, DomainError};
use std::time::Duration;

/// Raw reply bytes and the protocol they arrived over.
#[derive(Debug)]
pub struct TransportResponse {
    pub bytes: Vec<u8>,
    pub protocol: DnsProtocol,
}

#[async_trait]
pub trait DnsTransport: Send + Sync {
    /// Send one wire-format query and wait up to `timeout` for its reply.
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError>;
}
