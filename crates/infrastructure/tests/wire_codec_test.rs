mod helpers;

use ferrous_chain_domain::dns_record::Soa;
use ferrous_chain_domain::{
    DnsMessage, DnsProtocol, DnsQuery, DnsRecord, RData, Rcode, RecordClass, RecordType,
};
use ferrous_chain_infrastructure::dns::forwarding::{MessageBuilder, ResponseParser};
use helpers::messages::{a_query, answer, nxdomain};
use std::net::{Ipv6Addr, SocketAddr};

fn client() -> SocketAddr {
    "192.0.2.99:40000".parse().unwrap()
}

// ============================================================================
// Requests
// ============================================================================

#[test]
fn test_query_decodes_question_and_flags() {
    let query = DnsQuery::new("WWW.Example.NET", RecordType::AAAA)
        .with_edns(1232, true)
        .with_recursion_desired(true);
    let (id, bytes) = MessageBuilder::build_query(&query).unwrap();

    let decoded = ResponseParser::parse_query(&bytes, DnsProtocol::Tcp, client()).unwrap();

    assert_eq!(decoded.id, id);
    assert_eq!(&*decoded.qname, "www.example.net.");
    assert_eq!(decoded.record_type, RecordType::AAAA);
    assert_eq!(decoded.class, RecordClass::IN);
    assert_eq!(decoded.protocol, DnsProtocol::Tcp);
    assert_eq!(decoded.client, client());
    assert_eq!(decoded.edns_payload, Some(1232));
    assert!(decoded.dnssec_ok);
    assert!(decoded.recursion_desired);
}

#[test]
fn test_chaos_class_survives_encoding() {
    let query = DnsQuery::new("version.bind.", RecordType::TXT).with_class(RecordClass::CH);
    let (_, bytes) = MessageBuilder::build_query(&query).unwrap();

    let decoded = ResponseParser::parse_query(&bytes, DnsProtocol::Udp, client()).unwrap();

    assert_eq!(decoded.class, RecordClass::CH);
    assert_eq!(decoded.edns_payload, None);
}

#[test]
fn test_garbage_is_rejected_but_id_is_peekable() {
    let garbage = [0x12, 0x34, 0xff];
    assert!(ResponseParser::parse_query(&garbage, DnsProtocol::Udp, client()).is_err());
    assert_eq!(ResponseParser::peek_id(&garbage), Some(0x1234));
    assert_eq!(ResponseParser::peek_id(&[0x01]), None);
}

#[test]
fn test_response_is_not_accepted_as_query() {
    let bytes = MessageBuilder::build_response(&answer(&a_query("www.example.net."), &[60])).unwrap();
    assert!(ResponseParser::parse_query(&bytes, DnsProtocol::Udp, client()).is_err());
}

// ============================================================================
// Responses
// ============================================================================

#[test]
fn test_response_sections_survive_encoding() {
    let query = a_query("www.example.net.");
    let mut msg = answer(&query, &[300, 120]);
    msg.header.authoritative = true;
    msg.answers.push(DnsRecord::new(
        "www.example.net.",
        60,
        RData::Aaaa(Ipv6Addr::LOCALHOST),
    ));
    msg.additional.push(DnsRecord::new(
        "www.example.net.",
        30,
        RData::Txt(vec!["v=spf1 -all".into()]),
    ));

    let bytes = MessageBuilder::build_response(&msg).unwrap();
    let decoded = ResponseParser::parse(&bytes).unwrap();

    assert_eq!(decoded.header.id, 4242);
    assert!(decoded.header.response);
    assert!(decoded.header.authoritative);
    assert!(decoded.header.recursion_available);
    assert_eq!(decoded.question, msg.question);
    assert_eq!(decoded.answers, msg.answers);
    assert_eq!(decoded.additional, msg.additional);
}

#[test]
fn test_negative_response_keeps_soa() {
    let query = a_query("nonexist.example.org.");
    let msg = nxdomain(&query, "example.org.", 3600, 60);

    let decoded = ResponseParser::parse(&MessageBuilder::build_response(&msg).unwrap()).unwrap();

    assert_eq!(decoded.rcode(), Rcode::NXDomain);
    assert_eq!(decoded.negative_soa_ttl(), Some(60));
    assert_eq!(
        decoded.authority[0].data.as_soa(),
        Some(&Soa {
            mname: "ns1.example.org.".into(),
            rname: "hostmaster.example.org.".into(),
            serial: 2024010101,
            refresh: 7200,
            retry: 3600,
            expire: 1209600,
            minimum: 60,
        })
    );
}

#[test]
fn test_oversized_response_is_truncated() {
    let query = a_query("big.example.net.");
    let ttls = vec![300; 60];
    let msg = answer(&query, &ttls);

    let full = MessageBuilder::build_response(&msg).unwrap();
    assert!(full.len() > 512);

    let limited = MessageBuilder::build_response_limited(&msg, 512).unwrap();
    assert!(limited.len() <= 512);

    let decoded = ResponseParser::parse(&limited).unwrap();
    assert!(decoded.header.truncated);
    assert!(decoded.answers.is_empty());
    assert_eq!(decoded.question, msg.question);
}

#[test]
fn test_small_response_is_left_alone() {
    let msg = DnsMessage::error_response(&a_query("www.example.net."), Rcode::Refused);

    let limited = MessageBuilder::build_response_limited(&msg, 512).unwrap();

    assert_eq!(limited, MessageBuilder::build_response(&msg).unwrap());
}
