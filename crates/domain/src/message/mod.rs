pub mod header;
pub mod rcode;

pub use header::{Header, Question};
pub use rcode::Rcode;

use crate::{DnsQuery, DnsRecord, RecordType};

/// DNS message, used for both queries and responses.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DnsMessage {
    pub header: Header,
    pub question: Option<Question>,
    pub answers: Vec<DnsRecord>,
    pub authority: Vec<DnsRecord>,
    pub additional: Vec<DnsRecord>,
    /// UDP payload size to advertise in an OPT record, if any
    pub edns_payload: Option<u16>,
    /// Set when the message was built from the response cache.
    /// Never encoded on the wire.
    pub from_cache: bool,
}

impl DnsMessage {
    /// Empty NOERROR reply to `query`: id and RD copied, question echoed.
    pub fn response_to(query: &DnsQuery) -> Self {
        Self {
            header: Header {
                id: query.id,
                response: true,
                recursion_desired: query.recursion_desired,
                ..Header::default()
            },
            question: Some(Question::from_query(query)),
            edns_payload: query.edns_payload,
            ..Self::default()
        }
    }

    /// Reply to `query` carrying only `rcode`.
    pub fn error_response(query: &DnsQuery, rcode: Rcode) -> Self {
        let mut msg = Self::response_to(query);
        msg.header.rcode = rcode;
        msg
    }

    pub fn rcode(&self) -> Rcode {
        self.header.rcode
    }

    pub fn is_nxdomain(&self) -> bool {
        self.header.rcode == Rcode::NXDomain
    }

    /// NOERROR with no answer for the asked type.
    pub fn is_nodata(&self) -> bool {
        self.header.rcode == Rcode::NoError && self.answers.is_empty()
    }

    /// NXDOMAIN or NODATA.
    pub fn is_negative(&self) -> bool {
        self.is_nxdomain() || self.is_nodata()
    }

    /// Smallest TTL in the answer section.
    pub fn min_answer_ttl(&self) -> Option<u32> {
        self.answers.iter().map(|r| r.ttl).min()
    }

    /// Negative-caching TTL from the authority SOA (RFC 2308 §5):
    /// the lesser of the SOA record's own TTL and its MINIMUM field.
    pub fn negative_soa_ttl(&self) -> Option<u32> {
        self.authority.iter().find_map(|r| {
            if r.record_type != RecordType::SOA {
                return None;
            }
            r.data.as_soa().map(|soa| soa.minimum.min(r.ttl))
        })
    }

    /// Whether this message answers `query`: same id, same question.
    pub fn answers_query(&self, query: &DnsQuery) -> bool {
        self.header.id == query.id
            && self
                .question
                .as_ref()
                .is_some_and(|q| q.matches(query))
    }

    /// Rewrite every record's TTL.
    pub fn set_ttl(&mut self, ttl: u32) {
        for record in self
            .answers
            .iter_mut()
            .chain(self.authority.iter_mut())
            .chain(self.additional.iter_mut())
        {
            record.ttl = ttl;
        }
    }
}
