use super::record_type_map::RecordTypeMapper;
use ferrous_chain_domain::dns_record::Soa;
use ferrous_chain_domain::{
    DnsMessage, DnsProtocol, DnsQuery, DnsRecord, DomainError, Header, Question, RData, Rcode,
};
use hickory_proto::op::{Message, MessageType, OpCode};
use hickory_proto::rr::{RData as HickoryRData, Record};
use hickory_proto::serialize::binary::BinEncodable;
use std::net::SocketAddr;
use tracing::debug;

/// Decodes wire-format DNS messages
pub struct ResponseParser;

impl ResponseParser {
    /// Decode a response received from an upstream server.
    pub fn parse(response_bytes: &[u8]) -> Result<DnsMessage, DomainError> {
        let message = Message::from_vec(response_bytes)
            .map_err(|e| DomainError::Wire(format!("Failed to parse DNS response: {e}")))?;

        let question = match message.queries().first() {
            Some(q) => Some(Question {
                name: q.name().to_utf8(),
                qtype: RecordTypeMapper::from_hickory(q.query_type()),
                qclass: RecordTypeMapper::class_from_hickory(q.query_class()),
            }),
            None => None,
        };

        let msg = DnsMessage {
            header: Header {
                id: message.id(),
                opcode: u8::from(message.op_code()),
                response: message.message_type() == MessageType::Response,
                authoritative: message.authoritative(),
                truncated: message.truncated(),
                recursion_desired: message.recursion_desired(),
                recursion_available: message.recursion_available(),
                rcode: Rcode::from(u16::from(message.response_code())),
            },
            question,
            answers: convert_all(message.answers())?,
            authority: convert_all(message.name_servers())?,
            additional: convert_all(message.additionals())?,
            edns_payload: message.extensions().as_ref().map(|e| e.max_payload()),
            from_cache: false,
        };

        debug!(
            id = msg.header.id,
            rcode = %msg.rcode(),
            answers = msg.answers.len(),
            truncated = msg.header.truncated,
            "DNS response parsed"
        );

        Ok(msg)
    }

    /// Decode a client request into a query.
    ///
    /// Fails unless the packet is a standard query with exactly one
    /// question.
    pub fn parse_query(
        request_bytes: &[u8],
        protocol: DnsProtocol,
        client: SocketAddr,
    ) -> Result<DnsQuery, DomainError> {
        let message = Message::from_vec(request_bytes)
            .map_err(|e| DomainError::Wire(format!("Failed to parse DNS request: {e}")))?;

        if message.message_type() != MessageType::Query || message.op_code() != OpCode::Query {
            return Err(DomainError::InvalidMessage(format!(
                "unsupported opcode {:?}",
                message.op_code()
            )));
        }
        let [question] = message.queries() else {
            return Err(DomainError::InvalidMessage(format!(
                "expected one question, got {}",
                message.queries().len()
            )));
        };

        let mut query = DnsQuery::new(
            &question.name().to_utf8(),
            RecordTypeMapper::from_hickory(question.query_type()),
        )
        .with_id(message.id())
        .with_class(RecordTypeMapper::class_from_hickory(question.query_class()))
        .with_protocol(protocol)
        .with_client(client)
        .with_recursion_desired(message.recursion_desired());

        if let Some(edns) = message.extensions() {
            query = query.with_edns(edns.max_payload(), edns.flags().dnssec_ok);
        }
        Ok(query)
    }

    /// Id of a packet too broken to decode, if it is long enough to have one.
    pub fn peek_id(bytes: &[u8]) -> Option<u16> {
        match bytes {
            [hi, lo, ..] => Some(u16::from_be_bytes([*hi, *lo])),
            _ => None,
        }
    }
}

fn convert_all(records: &[Record]) -> Result<Vec<DnsRecord>, DomainError> {
    records.iter().map(from_hickory_record).collect()
}

fn from_hickory_record(record: &Record) -> Result<DnsRecord, DomainError> {
    let data = match record.data() {
        HickoryRData::A(a) => RData::A(a.0),
        HickoryRData::AAAA(aaaa) => RData::Aaaa(aaaa.0),
        HickoryRData::CNAME(cname) => RData::Cname(cname.0.to_utf8()),
        HickoryRData::NS(ns) => RData::Ns(ns.0.to_utf8()),
        HickoryRData::PTR(ptr) => RData::Ptr(ptr.0.to_utf8()),
        HickoryRData::MX(mx) => RData::Mx {
            preference: mx.preference(),
            exchange: mx.exchange().to_utf8(),
        },
        HickoryRData::TXT(txt) => RData::Txt(
            txt.txt_data()
                .iter()
                .map(|part| String::from_utf8_lossy(part).into_owned())
                .collect(),
        ),
        HickoryRData::SOA(soa) => RData::Soa(Soa {
            mname: soa.mname().to_utf8(),
            rname: soa.rname().to_utf8(),
            serial: soa.serial(),
            refresh: soa.refresh() as u32,
            retry: soa.retry() as u32,
            expire: soa.expire() as u32,
            minimum: soa.minimum(),
        }),
        other => RData::Opaque(
            other
                .to_bytes()
                .map_err(|e| DomainError::Wire(format!("Failed to encode record data: {e}")))?,
        ),
    };

    Ok(DnsRecord::with_type(
        &record.name().to_utf8(),
        RecordTypeMapper::from_hickory(record.record_type()),
        record.ttl(),
        data,
    )
    .in_class(RecordTypeMapper::class_from_hickory(record.dns_class())))
}
