use ferrous_chain_domain::dns_record::Soa;
use ferrous_chain_domain::{DnsMessage, DnsQuery, DnsRecord, RData, Rcode, RecordType};
use std::net::Ipv4Addr;

pub fn a_query(name: &str) -> DnsQuery {
    DnsQuery::new(name, RecordType::A).with_id(4242)
}

/// NOERROR answer to `query` with one A record per TTL.
pub fn answer(query: &DnsQuery, ttls: &[u32]) -> DnsMessage {
    let mut msg = DnsMessage::response_to(query);
    msg.header.recursion_available = true;
    for (i, ttl) in ttls.iter().enumerate() {
        msg.answers.push(DnsRecord::new(
            &query.qname,
            *ttl,
            RData::A(Ipv4Addr::new(192, 0, 2, i as u8 + 1)),
        ));
    }
    msg
}

pub fn soa(zone: &str, ttl: u32, minimum: u32) -> DnsRecord {
    DnsRecord::new(
        zone,
        ttl,
        RData::Soa(Soa {
            mname: format!("ns1.{zone}"),
            rname: format!("hostmaster.{zone}"),
            serial: 2024010101,
            refresh: 7200,
            retry: 3600,
            expire: 1209600,
            minimum,
        }),
    )
}

/// NXDOMAIN for `query` carrying the SOA of `zone`.
pub fn nxdomain(query: &DnsQuery, zone: &str, soa_ttl: u32, minimum: u32) -> DnsMessage {
    let mut msg = DnsMessage::error_response(query, Rcode::NXDomain);
    msg.authority.push(soa(zone, soa_ttl, minimum));
    msg
}
