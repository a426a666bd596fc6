use super::{RData, RecordClass, RecordType};
use crate::name::fqdn;

/// DNS resource record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecord {
    /// Owner name, fully qualified and lowercased
    pub name: String,
    pub record_type: RecordType,
    pub class: RecordClass,
    /// Time to live in seconds
    pub ttl: u32,
    pub data: RData,
}

impl DnsRecord {
    /// Create an IN-class record whose type follows from its data.
    ///
    /// Opaque data has no implied type; use [`DnsRecord::with_type`] for it.
    pub fn new(name: &str, ttl: u32, data: RData) -> Self {
        let record_type = data.record_type().unwrap_or(RecordType::Unknown(0));
        Self {
            name: fqdn(name),
            record_type,
            class: RecordClass::IN,
            ttl,
            data,
        }
    }

    pub fn with_type(name: &str, record_type: RecordType, ttl: u32, data: RData) -> Self {
        Self {
            name: fqdn(name),
            record_type,
            class: RecordClass::IN,
            ttl,
            data,
        }
    }

    pub fn in_class(mut self, class: RecordClass) -> Self {
        self.class = class;
        self
    }
}
