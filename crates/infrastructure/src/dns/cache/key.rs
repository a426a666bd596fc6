use ferrous_chain_domain::name::fqdn;
use ferrous_chain_domain::{DnsQuery, RecordClass, RecordType};
use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Identity of a cached response.
///
/// Besides the question it carries the client capabilities that change the
/// shape of an answer, so a DO=1 client never gets a DO=0 response and the
/// other way round.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Lowercased, fully qualified
    pub qname: Arc<str>,
    pub qtype: RecordType,
    pub qclass: RecordClass,
    pub dnssec_ok: bool,
    pub edns: bool,
}

impl CacheKey {
    pub fn new(qname: &str, qtype: RecordType, qclass: RecordClass) -> Self {
        Self {
            qname: Arc::from(fqdn(qname).as_str()),
            qtype,
            qclass,
            dnssec_ok: false,
            edns: false,
        }
    }

    #[inline]
    pub fn from_query(query: &DnsQuery) -> Self {
        Self {
            qname: Arc::clone(&query.qname),
            qtype: query.record_type,
            qclass: query.class,
            dnssec_ok: query.dnssec_ok,
            edns: query.edns_payload.is_some(),
        }
    }

    pub fn with_capabilities(mut self, edns: bool, dnssec_ok: bool) -> Self {
        self.edns = edns;
        self.dnssec_ok = dnssec_ok;
        self
    }

    #[inline]
    pub(crate) fn shard_hash(&self) -> u64 {
        let mut hasher = FxHasher::default();
        self.hash(&mut hasher);
        hasher.finish()
    }
}
