use super::{DnsProtocol, RecordClass, RecordType};
use crate::name::fqdn;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

/// One incoming DNS question plus the request facts stages care about.
///
/// Built once per packet by the transport and only ever read afterwards.
/// Uses `Arc<str>` for zero-cost cloning across stages.
#[derive(Debug, Clone)]
pub struct DnsQuery {
    pub id: u16,
    /// Question name as asked, fully qualified (case preserved)
    pub name: Arc<str>,
    /// Lowercased form of `name`, used for every comparison
    pub qname: Arc<str>,
    pub record_type: RecordType,
    pub class: RecordClass,
    pub protocol: DnsProtocol,
    pub client: SocketAddr,
    /// EDNS0 UDP payload size advertised by the client, if it sent OPT
    pub edns_payload: Option<u16>,
    pub dnssec_ok: bool,
    pub recursion_desired: bool,
}

impl DnsQuery {
    pub fn new(name: &str, record_type: RecordType) -> Self {
        let qualified = if name.ends_with('.') {
            name.to_string()
        } else {
            format!("{name}.")
        };
        Self {
            id: 0,
            name: Arc::from(qualified.as_str()),
            qname: Arc::from(fqdn(name).as_str()),
            record_type,
            class: RecordClass::IN,
            protocol: DnsProtocol::Udp,
            client: SocketAddr::from((Ipv4Addr::LOCALHOST, 0)),
            edns_payload: None,
            dnssec_ok: false,
            recursion_desired: true,
        }
    }

    pub fn with_id(mut self, id: u16) -> Self {
        self.id = id;
        self
    }

    pub fn with_class(mut self, class: RecordClass) -> Self {
        self.class = class;
        self
    }

    pub fn with_protocol(mut self, protocol: DnsProtocol) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn with_client(mut self, client: SocketAddr) -> Self {
        self.client = client;
        self
    }

    pub fn with_edns(mut self, payload: u16, dnssec_ok: bool) -> Self {
        self.edns_payload = Some(payload);
        self.dnssec_ok = dnssec_ok;
        self
    }

    pub fn with_recursion_desired(mut self, rd: bool) -> Self {
        self.recursion_desired = rd;
        self
    }

    /// Largest response the client accepts over UDP.
    pub fn max_udp_payload(&self) -> usize {
        self.edns_payload.map_or(512, |p| p.max(512) as usize)
    }

    /// "1" for IPv4 clients, "2" for IPv6, as IANA address family numbers.
    pub fn family(&self) -> &'static str {
        if self.client.is_ipv4() {
            "1"
        } else {
            "2"
        }
    }
}
