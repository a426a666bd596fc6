use super::Rcode;
use crate::{DnsQuery, RecordClass, RecordType};

/// Message header flags (RFC 1035 §4.1.1). Section counts are implied by
/// the section vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Header {
    pub id: u16,
    pub opcode: u8,
    /// QR
    pub response: bool,
    /// AA, only ever set by stages that own the zone
    pub authoritative: bool,
    /// TC
    pub truncated: bool,
    /// RD
    pub recursion_desired: bool,
    /// RA
    pub recursion_available: bool,
    pub rcode: Rcode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub name: String,
    pub qtype: RecordType,
    pub qclass: RecordClass,
}

impl Question {
    pub fn from_query(query: &DnsQuery) -> Self {
        Self {
            name: query.name.to_string(),
            qtype: query.record_type,
            qclass: query.class,
        }
    }

    pub fn matches(&self, query: &DnsQuery) -> bool {
        self.qtype == query.record_type
            && self.qclass == query.class
            && self.name.eq_ignore_ascii_case(&query.name)
    }
}
