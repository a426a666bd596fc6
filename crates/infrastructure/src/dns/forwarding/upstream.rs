use super::{MessageBuilder, ResponseParser};
use crate::dns::transport::tcp::TcpTransport;
use crate::dns::transport::udp::UdpTransport;
use crate::dns::transport::DnsTransport;
use async_trait::async_trait;
use ferrous_chain_application::ports::Upstream;
use ferrous_chain_domain::{DnsMessage, DnsQuery, DomainError};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Forwards queries to a set of upstream resolvers, round-robin.
///
/// Each attempt goes over UDP first and is retried over TCP when the
/// answer comes back truncated. A failing server hands the query to the
/// next one; the error of the last attempt is returned when all fail.
pub struct ForwardingUpstream {
    servers: Vec<SocketAddr>,
    timeout: Duration,
    counter: AtomicUsize,
}

impl ForwardingUpstream {
    pub fn new(servers: Vec<SocketAddr>, timeout: Duration) -> Self {
        Self {
            servers,
            timeout,
            counter: AtomicUsize::new(0),
        }
    }

    pub fn servers(&self) -> &[SocketAddr] {
        &self.servers
    }

    fn next_index(&self) -> usize {
        self.counter.fetch_add(1, Ordering::Relaxed) % self.servers.len()
    }

    async fn query_server(
        &self,
        server: SocketAddr,
        query: &DnsQuery,
    ) -> Result<DnsMessage, DomainError> {
        let start = Instant::now();
        let (id, query_bytes) = MessageBuilder::build_query(query)?;

        let udp = UdpTransport::new(server);
        let mut response = udp.send(&query_bytes, self.timeout).await?;
        let mut msg = ResponseParser::parse(&response.bytes)?;
        Self::check_reply(server, id, &msg)?;

        if msg.header.truncated {
            debug!(server = %server, "Response truncated (TC bit), retrying via TCP");

            let remaining = self
                .timeout
                .checked_sub(start.elapsed())
                .unwrap_or(Duration::from_millis(500));
            let tcp = TcpTransport::new(server);
            response = tcp.send(&query_bytes, remaining).await?;
            msg = ResponseParser::parse(&response.bytes)?;
            Self::check_reply(server, id, &msg)?;
        }

        debug!(
            server = %server,
            protocol = response.protocol.as_str(),
            rcode = %msg.rcode(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Upstream responded"
        );
        Ok(msg)
    }

    fn check_reply(server: SocketAddr, id: u16, msg: &DnsMessage) -> Result<(), DomainError> {
        if msg.header.id != id || !msg.header.response {
            return Err(DomainError::Upstream {
                server: server.to_string(),
                reason: format!("mismatched reply id {} (expected {id})", msg.header.id),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Upstream for ForwardingUpstream {
    async fn exchange(&self, query: &DnsQuery) -> Result<DnsMessage, DomainError> {
        if self.servers.is_empty() {
            return Err(DomainError::NoUpstreams);
        }

        let start_index = self.next_index();
        let mut last_error = DomainError::NoUpstreams;

        for i in 0..self.servers.len() {
            let server = self.servers[(start_index + i) % self.servers.len()];
            match self.query_server(server, query).await {
                Ok(msg) => return Ok(msg),
                Err(e) => {
                    warn!(server = %server, error = %e, "Upstream failed, trying next");
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }

    fn describe(&self) -> String {
        self.servers
            .iter()
            .map(SocketAddr::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}
