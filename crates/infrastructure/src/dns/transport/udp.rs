use super::{DnsTransport, TransportResponse};
use async_trait::async_trait;
use ferrous_chain_domain::{DnsProtocol, DomainError};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, warn};

/// Largest datagram accepted from an upstream.
const RECV_BUFFER_SIZE: usize = 4096;

/// DNS over UDP, one ephemeral socket per query.
pub struct UdpTransport {
    server_addr: SocketAddr,
}

impl UdpTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self { server_addr }
    }

    fn local_addr(&self) -> SocketAddr {
        match self.server_addr {
            SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
            SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
        }
    }

    fn io_error(&self, what: &str, e: std::io::Error) -> DomainError {
        DomainError::Upstream {
            server: self.server_addr.to_string(),
            reason: format!("{what} failed: {e}"),
        }
    }
}

#[async_trait]
impl DnsTransport for UdpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        let deadline = Instant::now() + timeout;
        let timed_out = || DomainError::UpstreamTimeout(self.server_addr.to_string());

        let socket = UdpSocket::bind(self.local_addr()).await?;
        socket
            .send_to(message_bytes, self.server_addr)
            .await
            .map_err(|e| self.io_error("send", e))?;

        let mut buf = vec![0u8; RECV_BUFFER_SIZE];
        // Stray datagrams do not extend the deadline.
        let len = loop {
            let (len, from) = timeout_at(deadline, socket.recv_from(&mut buf))
                .await
                .map_err(|_| timed_out())?
                .map_err(|e| self.io_error("receive", e))?;

            if from == self.server_addr {
                break len;
            }
            warn!(expected = %self.server_addr, from = %from, "Ignoring datagram from unexpected source");
        };

        buf.truncate(len);
        debug!(server = %self.server_addr, bytes = len, "UDP reply received");

        Ok(TransportResponse {
            bytes: buf,
            protocol: DnsProtocol::Udp,
        })
    }
}
