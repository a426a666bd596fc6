use ferrous_chain_application::ports::ResponseBuffer;
use ferrous_chain_application::services::ZoneRouter;
use ferrous_chain_application::RequestContext;
use ferrous_chain_domain::message::Header;
use ferrous_chain_domain::{DnsMessage, DnsProtocol, Rcode};
use ferrous_chain_infrastructure::dns::forwarding::{MessageBuilder, ResponseParser};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Largest message that fits the two-byte TCP length prefix.
const MAX_TCP_MESSAGE: usize = u16::MAX as usize;

/// Turns one request packet into one response packet.
pub struct QueryHandler {
    router: Arc<ZoneRouter>,
    request_timeout: Duration,
    shutdown: CancellationToken,
}

impl QueryHandler {
    pub fn new(router: Arc<ZoneRouter>, request_timeout: Duration, shutdown: CancellationToken) -> Self {
        Self {
            router,
            request_timeout,
            shutdown,
        }
    }

    /// Decode, route, dispatch and encode. `None` means nothing should be
    /// sent back.
    pub async fn handle(
        &self,
        packet: &[u8],
        protocol: DnsProtocol,
        client: SocketAddr,
    ) -> Option<Vec<u8>> {
        let query = match ResponseParser::parse_query(packet, protocol, client) {
            Ok(query) => query,
            Err(e) => {
                debug!(client = %client, error = %e, "Malformed request");
                return Self::format_error(packet);
            }
        };

        let ctx = RequestContext::new(".")
            .with_cancellation(self.shutdown.child_token())
            .with_deadline(Instant::now() + self.request_timeout);
        let mut writer = ResponseBuffer::new();
        self.router.serve(ctx, &mut writer, &query).await;

        let response = writer.into_message()?;
        let limit = match protocol {
            DnsProtocol::Udp => query.max_udp_payload(),
            DnsProtocol::Tcp => MAX_TCP_MESSAGE,
        };

        match MessageBuilder::build_response_limited(&response, limit) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!(domain = %query.qname, error = %e, "Failed to encode response");
                let fallback = DnsMessage::error_response(&query, Rcode::ServFail);
                MessageBuilder::build_response(&fallback).ok()
            }
        }
    }

    /// FORMERR echoing the id of a packet that could not be decoded.
    fn format_error(packet: &[u8]) -> Option<Vec<u8>> {
        let id = ResponseParser::peek_id(packet)?;
        let msg = DnsMessage {
            header: Header {
                id,
                response: true,
                rcode: Rcode::FormErr,
                ..Header::default()
            },
            ..DnsMessage::default()
        };
        MessageBuilder::build_response(&msg).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrous_chain_application::services::ChainBuilder;
    use ferrous_chain_domain::{DnsQuery, RecordClass, RecordType};
    use ferrous_chain_infrastructure::dns::ChaosStage;

    fn handler() -> QueryHandler {
        let chain = ChainBuilder::new(".")
            .stage(Arc::new(ChaosStage::new(
                "test-1.0".into(),
                (0..40).map(|i| format!("author number {i} of the project")).collect(),
                Some("dns01".into()),
            )))
            .build();
        let router = Arc::new(ZoneRouter::new(vec![Arc::new(chain)]));
        QueryHandler::new(router, Duration::from_secs(1), CancellationToken::new())
    }

    fn client() -> SocketAddr {
        "192.0.2.1:53000".parse().unwrap()
    }

    fn chaos(name: &str) -> DnsQuery {
        DnsQuery::new(name, RecordType::TXT).with_class(RecordClass::CH)
    }

    #[tokio::test]
    async fn test_answers_decoded_query() {
        let (id, packet) = MessageBuilder::build_query(&chaos("version.bind.")).unwrap();

        let bytes = handler().handle(&packet, DnsProtocol::Udp, client()).await.unwrap();
        let reply = ResponseParser::parse(&bytes).unwrap();

        assert_eq!(reply.header.id, id);
        assert_eq!(reply.rcode(), Rcode::NoError);
        assert_eq!(reply.answers.len(), 1);
    }

    #[tokio::test]
    async fn test_unhandled_query_is_refused() {
        let (_, packet) =
            MessageBuilder::build_query(&DnsQuery::new("www.example.net.", RecordType::A)).unwrap();

        let bytes = handler().handle(&packet, DnsProtocol::Udp, client()).await.unwrap();

        assert_eq!(ResponseParser::parse(&bytes).unwrap().rcode(), Rcode::Refused);
    }

    #[tokio::test]
    async fn test_garbage_gets_formerr() {
        let bytes = handler()
            .handle(&[0xab, 0xcd, 0x01], DnsProtocol::Udp, client())
            .await
            .unwrap();
        let reply = ResponseParser::parse(&bytes).unwrap();

        assert_eq!(reply.header.id, 0xabcd);
        assert_eq!(reply.rcode(), Rcode::FormErr);
        assert!(handler().handle(&[0x01], DnsProtocol::Udp, client()).await.is_none());
    }

    #[tokio::test]
    async fn test_udp_answer_truncated_to_payload_size() {
        let (_, packet) = MessageBuilder::build_query(&chaos("authors.bind.")).unwrap();

        let udp = handler().handle(&packet, DnsProtocol::Udp, client()).await.unwrap();
        assert!(udp.len() <= 512);
        let reply = ResponseParser::parse(&udp).unwrap();
        assert!(reply.header.truncated);
        assert!(reply.answers.is_empty());

        let tcp = handler().handle(&packet, DnsProtocol::Tcp, client()).await.unwrap();
        let reply = ResponseParser::parse(&tcp).unwrap();
        assert!(!reply.header.truncated);
        assert_eq!(reply.answers.len(), 40);
    }
}
