use super::{DnsTransport, TransportResponse};
use async_trait::async_trait;
use ferrous_chain_domain::{DnsProtocol, DomainError};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

/// DNS over TCP with the RFC 1035 two-byte length prefix.
pub struct TcpTransport {
    server_addr: SocketAddr,
}

impl TcpTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self { server_addr }
    }

    async fn exchange(&self, message_bytes: &[u8]) -> Result<Vec<u8>, DomainError> {
        let server = self.server_addr.to_string();
        let upstream_err = |reason: String| DomainError::Upstream {
            server: server.clone(),
            reason,
        };

        let len = u16::try_from(message_bytes.len())
            .map_err(|_| DomainError::InvalidMessage("query exceeds 65535 bytes".into()))?;

        let mut stream = TcpStream::connect(self.server_addr)
            .await
            .map_err(|e| upstream_err(format!("connect failed: {e}")))?;
        stream.set_nodelay(true)?;

        let mut frame = Vec::with_capacity(message_bytes.len() + 2);
        frame.extend_from_slice(&len.to_be_bytes());
        frame.extend_from_slice(message_bytes);
        stream
            .write_all(&frame)
            .await
            .map_err(|e| upstream_err(format!("write failed: {e}")))?;

        let response_len = stream
            .read_u16()
            .await
            .map_err(|e| upstream_err(format!("read failed: {e}")))?;
        let mut response = vec![0u8; usize::from(response_len)];
        stream
            .read_exact(&mut response)
            .await
            .map_err(|e| upstream_err(format!("read failed: {e}")))?;

        Ok(response)
    }
}

#[async_trait]
impl DnsTransport for TcpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        let bytes = tokio::time::timeout(timeout, self.exchange(message_bytes))
            .await
            .map_err(|_| DomainError::UpstreamTimeout(self.server_addr.to_string()))??;

        debug!(server = %self.server_addr, bytes_received = bytes.len(), "TCP response received");

        Ok(TransportResponse {
            bytes,
            protocol: DnsProtocol::Tcp,
        })
    }
}
