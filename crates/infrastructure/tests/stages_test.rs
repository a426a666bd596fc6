mod helpers;

use ferrous_chain_application::services::ChainBuilder;
use ferrous_chain_domain::config::{AuthoritativeZoneConfig, ZoneRecord};
use ferrous_chain_domain::{DnsProtocol, DnsQuery, RData, Rcode, RecordClass, RecordType};
use ferrous_chain_infrastructure::dns::authority::Zone;
use ferrous_chain_infrastructure::dns::middleware::{AutoStage, ChaosStage, MetricsStage, ProxyStage};
use ferrous_chain_infrastructure::dns::InMemoryMetrics;
use helpers::ask;
use helpers::messages::{a_query, answer};
use helpers::mock_upstream::MockUpstream;
use std::net::Ipv4Addr;
use std::sync::Arc;

fn record(name: &str, record_type: &str, value: &str) -> ZoneRecord {
    ZoneRecord {
        name: name.into(),
        record_type: record_type.into(),
        value: value.into(),
        ttl: Some(300),
    }
}

fn example_org() -> Zone {
    Zone::from_config(&AuthoritativeZoneConfig {
        origin: "example.org.".into(),
        records: vec![
            record("@", "SOA", "ns1 hostmaster 2024010101 7200 3600 1209600 60"),
            record("@", "NS", "ns1"),
            record("ns1", "A", "192.0.2.53"),
            record("www", "A", "192.0.2.10"),
            record("alias", "CNAME", "www"),
        ],
    })
    .unwrap()
}

fn chaos_query(name: &str) -> DnsQuery {
    DnsQuery::new(name, RecordType::TXT)
        .with_class(RecordClass::CH)
        .with_id(77)
}

// ============================================================================
// Chaos
// ============================================================================

#[tokio::test]
async fn test_chaos_answers_version() {
    let chain = ChainBuilder::new(".")
        .stage(Arc::new(ChaosStage::new("ferrous-chain-0.3.0".into(), vec![], Some("dns01".into()))))
        .build();

    let (rcode, reply) = ask(&chain, &chaos_query("version.bind.")).await;

    assert_eq!(rcode, Rcode::NoError);
    assert_eq!(reply.header.id, 77);
    assert_eq!(reply.answers.len(), 1);
    assert_eq!(reply.answers[0].class, RecordClass::CH);
    assert_eq!(reply.answers[0].ttl, 0);
    assert_eq!(reply.answers[0].data, RData::Txt(vec!["ferrous-chain-0.3.0".into()]));
}

#[tokio::test]
async fn test_chaos_lists_every_author() {
    let chain = ChainBuilder::new(".")
        .stage(Arc::new(ChaosStage::new(
            "1.0".into(),
            vec!["Ada".into(), "Grace".into()],
            None,
        )))
        .build();

    let (_, reply) = ask(&chain, &chaos_query("authors.bind.")).await;

    assert_eq!(reply.answers.len(), 2);
}

#[tokio::test]
async fn test_chaos_declines_other_queries() {
    let chain = ChainBuilder::new(".")
        .stage(Arc::new(ChaosStage::new("1.0".into(), vec![], None)))
        .build();

    let (rcode, _) = ask(&chain, &a_query("version.bind.")).await;
    assert_eq!(rcode, Rcode::Refused);

    let (rcode, _) = ask(&chain, &chaos_query("unknown.bind.")).await;
    assert_eq!(rcode, Rcode::Refused);
}

// ============================================================================
// Authoritative zones
// ============================================================================

#[tokio::test]
async fn test_auto_answers_with_aa() {
    let chain = ChainBuilder::new("example.org.")
        .stage(Arc::new(AutoStage::new(vec![example_org()])))
        .build();

    let (rcode, reply) = ask(&chain, &DnsQuery::new("www.example.org.", RecordType::A)).await;

    assert_eq!(rcode, Rcode::NoError);
    assert!(reply.header.authoritative);
    assert_eq!(reply.answers[0].data, RData::A(Ipv4Addr::new(192, 0, 2, 10)));
}

#[tokio::test]
async fn test_auto_chases_cname() {
    let chain = ChainBuilder::new("example.org.")
        .stage(Arc::new(AutoStage::new(vec![example_org()])))
        .build();

    let (_, reply) = ask(&chain, &DnsQuery::new("alias.example.org.", RecordType::A)).await;

    let types: Vec<_> = reply.answers.iter().map(|r| r.record_type).collect();
    assert_eq!(types, vec![RecordType::CNAME, RecordType::A]);
}

#[tokio::test]
async fn test_auto_nxdomain_and_nodata_carry_soa() {
    let chain = ChainBuilder::new("example.org.")
        .stage(Arc::new(AutoStage::new(vec![example_org()])))
        .build();

    let (rcode, nx) = ask(&chain, &DnsQuery::new("nonexist.example.org.", RecordType::A)).await;
    assert_eq!(rcode, Rcode::NXDomain);
    assert!(nx.header.authoritative);
    assert_eq!(nx.authority[0].record_type, RecordType::SOA);

    let (rcode, nodata) = ask(&chain, &DnsQuery::new("www.example.org.", RecordType::MX)).await;
    assert_eq!(rcode, Rcode::NoError);
    assert!(nodata.answers.is_empty());
    assert_eq!(nodata.authority[0].record_type, RecordType::SOA);
}

#[tokio::test]
async fn test_auto_zone_swap_at_runtime() {
    let auto = Arc::new(AutoStage::new(vec![]));
    let chain = ChainBuilder::new(".").stage(auto.clone()).build();
    let query = DnsQuery::new("www.example.org.", RecordType::A);

    let (rcode, _) = ask(&chain, &query).await;
    assert_eq!(rcode, Rcode::Refused);

    auto.insert_zone(example_org());
    assert_eq!(auto.zone_names(), vec!["example.org.".to_string()]);
    let (rcode, _) = ask(&chain, &query).await;
    assert_eq!(rcode, Rcode::NoError);

    assert!(auto.remove_zone("example.org"));
    assert!(!auto.remove_zone("example.org"));
    let (rcode, _) = ask(&chain, &query).await;
    assert_eq!(rcode, Rcode::Refused);
}

#[tokio::test]
async fn test_auto_prefers_deepest_zone() {
    let sub = Zone::from_config(&AuthoritativeZoneConfig {
        origin: "lab.example.org.".into(),
        records: vec![
            record("@", "SOA", "ns1 hostmaster 1 7200 3600 1209600 60"),
            record("www", "A", "198.51.100.7"),
        ],
    })
    .unwrap();
    let chain = ChainBuilder::new(".")
        .stage(Arc::new(AutoStage::new(vec![example_org(), sub])))
        .build();

    let (rcode, reply) = ask(&chain, &DnsQuery::new("www.lab.example.org.", RecordType::A)).await;

    assert_eq!(rcode, Rcode::NoError);
    assert_eq!(reply.answers[0].data, RData::A(Ipv4Addr::new(198, 51, 100, 7)));
}

// ============================================================================
// Proxy and metrics
// ============================================================================

#[tokio::test]
async fn test_proxy_rewrites_id_and_clears_aa() {
    let upstream = Arc::new(MockUpstream::new(|q| {
        let mut msg = answer(q, &[300]);
        msg.header.id = 1;
        msg.header.authoritative = true;
        Ok(msg)
    }));
    let chain = ChainBuilder::new(".")
        .stage(Arc::new(ProxyStage::new(upstream.clone())))
        .build();

    let (rcode, reply) = ask(&chain, &a_query("www.example.net.")).await;

    assert_eq!(rcode, Rcode::NoError);
    assert_eq!(reply.header.id, 4242);
    assert!(!reply.header.authoritative);
    assert_eq!(upstream.calls(), 1);
}

#[tokio::test]
async fn test_metrics_stage_observes_downstream() {
    let metrics = Arc::new(InMemoryMetrics::new());
    let upstream = Arc::new(MockUpstream::new(|q| Ok(answer(q, &[300]))));
    let chain = ChainBuilder::new("example.net.")
        .stage(Arc::new(MetricsStage::new(metrics.clone())))
        .stage(Arc::new(ProxyStage::new(upstream)))
        .metrics(metrics.clone())
        .build();

    ask(&chain, &a_query("www.example.net.")).await;
    ask(&chain, &a_query("mail.example.net.")).await;

    assert_eq!(metrics.request_count("example.net."), 2);
    assert_eq!(metrics.request_count_for("example.net.", DnsProtocol::Udp, "1"), 2);
    assert_eq!(metrics.qtype_count("example.net.", RecordType::A), 2);
    assert_eq!(metrics.rcode_count("example.net.", Rcode::NoError), 2);
}

#[tokio::test]
async fn test_metrics_stage_reports_servfail_on_fault() {
    let metrics = Arc::new(InMemoryMetrics::new());
    let chain = ChainBuilder::new("example.net.")
        .stage(Arc::new(MetricsStage::new(metrics.clone())))
        .stage(Arc::new(ProxyStage::new(Arc::new(MockUpstream::failing()))))
        .metrics(metrics.clone())
        .build();

    let (rcode, _) = ask(&chain, &a_query("www.example.net.")).await;

    assert_eq!(rcode, Rcode::ServFail);
    assert_eq!(metrics.observed_rcode_count("example.net.", Rcode::ServFail), 1);
    assert_eq!(metrics.faults("example.net."), 1);
}

#[tokio::test]
async fn test_metrics_stage_after_proxy_sees_proxied_rcode() {
    let metrics = Arc::new(InMemoryMetrics::new());
    let upstream = Arc::new(MockUpstream::new(|q| Ok(answer(q, &[300]))));
    let chain = ChainBuilder::new("example.net.")
        .stage(Arc::new(ProxyStage::new(upstream.clone())))
        .stage(Arc::new(MetricsStage::new(metrics.clone())))
        .metrics(metrics.clone())
        .build();

    let (rcode, reply) = ask(&chain, &a_query("www.example.net.")).await;

    assert_eq!(rcode, Rcode::NoError);
    assert_eq!(reply.answers.len(), 1);
    assert_eq!(upstream.calls(), 1);
    assert_eq!(metrics.observed_rcode_count("example.net.", Rcode::NoError), 1);
    assert_eq!(metrics.rcode_count("example.net.", Rcode::NoError), 1);
}
