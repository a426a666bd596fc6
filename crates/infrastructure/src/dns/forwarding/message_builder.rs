//! DNS Message Builder
//!
//! Turns domain messages and queries into wire format using `hickory-proto`.

use super::record_type_map::RecordTypeMapper;
use ferrous_chain_domain::{DnsMessage, DnsQuery, DnsRecord, DomainError, RData};
use hickory_proto::op::{Edns, Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::rdata::{A, AAAA, CNAME, MX, NS, NULL, PTR, SOA, TXT};
use hickory_proto::rr::{Name, RData as HickoryRData, Record};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::str::FromStr;

/// Builds wire-format DNS messages
pub struct MessageBuilder;

impl MessageBuilder {
    /// Build an upstream query for `query` under a fresh random id.
    ///
    /// EDNS and the DO bit are carried over from the client's request.
    pub fn build_query(query: &DnsQuery) -> Result<(u16, Vec<u8>), DomainError> {
        let name = parse_name(&query.name)?;

        let mut question = Query::query(name, RecordTypeMapper::to_hickory(query.record_type));
        question.set_query_class(RecordTypeMapper::class_to_hickory(query.class));

        let id = fastrand::u16(..);
        let mut message = Message::new(id, MessageType::Query, OpCode::Query);
        message.set_recursion_desired(query.recursion_desired);
        message.add_query(question);

        if let Some(payload) = query.edns_payload {
            let mut edns = Edns::new();
            edns.set_max_payload(payload.max(512));
            edns.set_dnssec_ok(query.dnssec_ok);
            *message.extensions_mut() = Some(edns);
        }

        let bytes = Self::serialize_message(&message)?;
        Ok((id, bytes))
    }

    /// Encode a response.
    pub fn build_response(msg: &DnsMessage) -> Result<Vec<u8>, DomainError> {
        let mut message = Message::new(msg.header.id, MessageType::Response, OpCode::Query);
        message.set_authoritative(msg.header.authoritative);
        message.set_truncated(msg.header.truncated);
        message.set_recursion_desired(msg.header.recursion_desired);
        message.set_recursion_available(msg.header.recursion_available);
        message.set_response_code(<ResponseCode as From<u16>>::from(msg.rcode().to_u16()));

        if let Some(question) = &msg.question {
            let mut query = Query::query(
                parse_name(&question.name)?,
                RecordTypeMapper::to_hickory(question.qtype),
            );
            query.set_query_class(RecordTypeMapper::class_to_hickory(question.qclass));
            message.add_query(query);
        }

        for record in &msg.answers {
            message.add_answer(to_hickory_record(record)?);
        }
        for record in &msg.authority {
            message.add_name_server(to_hickory_record(record)?);
        }
        for record in &msg.additional {
            message.add_additional(to_hickory_record(record)?);
        }

        if let Some(payload) = msg.edns_payload {
            let mut edns = Edns::new();
            edns.set_max_payload(payload.max(512));
            *message.extensions_mut() = Some(edns);
        }

        Self::serialize_message(&message)
    }

    /// Encode a response so that it fits in `max_size` bytes.
    ///
    /// An oversized message is re-encoded with empty sections and TC set,
    /// telling the client to retry over TCP.
    pub fn build_response_limited(
        msg: &DnsMessage,
        max_size: usize,
    ) -> Result<Vec<u8>, DomainError> {
        let bytes = Self::build_response(msg)?;
        if bytes.len() <= max_size {
            return Ok(bytes);
        }

        let mut truncated = msg.clone();
        truncated.answers.clear();
        truncated.authority.clear();
        truncated.additional.clear();
        truncated.header.truncated = true;
        Self::build_response(&truncated)
    }

    fn serialize_message(message: &Message) -> Result<Vec<u8>, DomainError> {
        let mut buf = Vec::with_capacity(512);
        let mut encoder = BinEncoder::new(&mut buf);

        message
            .emit(&mut encoder)
            .map_err(|e| DomainError::Wire(format!("Failed to serialize DNS message: {e}")))?;

        Ok(buf)
    }
}

fn parse_name(name: &str) -> Result<Name, DomainError> {
    Name::from_str(name)
        .map_err(|e| DomainError::InvalidDomainName(format!("Invalid domain '{name}': {e}")))
}

fn to_hickory_record(record: &DnsRecord) -> Result<Record, DomainError> {
    let rdata = match &record.data {
        RData::A(addr) => HickoryRData::A(A(*addr)),
        RData::Aaaa(addr) => HickoryRData::AAAA(AAAA(*addr)),
        RData::Cname(target) => HickoryRData::CNAME(CNAME(parse_name(target)?)),
        RData::Ns(target) => HickoryRData::NS(NS(parse_name(target)?)),
        RData::Ptr(target) => HickoryRData::PTR(PTR(parse_name(target)?)),
        RData::Mx {
            preference,
            exchange,
        } => HickoryRData::MX(MX::new(*preference, parse_name(exchange)?)),
        RData::Txt(parts) => HickoryRData::TXT(TXT::new(parts.clone())),
        RData::Soa(soa) => HickoryRData::SOA(SOA::new(
            parse_name(&soa.mname)?,
            parse_name(&soa.rname)?,
            soa.serial,
            soa.refresh as i32,
            soa.retry as i32,
            soa.expire as i32,
            soa.minimum,
        )),
        RData::Opaque(bytes) => HickoryRData::Unknown {
            code: RecordTypeMapper::to_hickory(record.record_type),
            rdata: NULL::with(bytes.clone()),
        },
    };

    let mut out = Record::from_rdata(parse_name(&record.name)?, record.ttl, rdata);
    out.set_dns_class(RecordTypeMapper::class_to_hickory(record.class));
    Ok(out)
}
