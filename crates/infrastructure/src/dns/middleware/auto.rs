use crate::dns::authority::Zone;
use arc_swap::ArcSwap;
use async_trait::async_trait;
use ferrous_chain_application::ports::{Middleware, Next, ResponseWriter, Served};
use ferrous_chain_application::RequestContext;
use ferrous_chain_domain::name::{fqdn, label_count};
use ferrous_chain_domain::{DnsMessage, DnsQuery, DomainError, RecordClass};
use std::sync::Arc;
use tracing::{debug, info};

/// Authoritative answers from zones held in memory.
///
/// The zone set is replaced as a whole on every change, so a request sees
/// either the old set or the new one.
pub struct AutoStage {
    zones: ArcSwap<Vec<Arc<Zone>>>,
}

impl AutoStage {
    pub fn new(zones: Vec<Zone>) -> Self {
        let stage = Self {
            zones: ArcSwap::from_pointee(Vec::new()),
        };
        for zone in zones {
            stage.insert_zone(zone);
        }
        stage
    }

    /// Load `zone`, replacing a zone with the same origin.
    pub fn insert_zone(&self, zone: Zone) {
        let zone = Arc::new(zone);
        info!(
            zone = %zone.origin(),
            records = zone.record_count(),
            "Loaded authoritative zone"
        );
        self.zones.rcu(|current| {
            let mut next: Vec<Arc<Zone>> = current
                .iter()
                .filter(|z| z.origin() != zone.origin())
                .cloned()
                .collect();
            next.push(Arc::clone(&zone));
            // Deepest origin first so lookups take the closest zone.
            next.sort_by_key(|z| std::cmp::Reverse(label_count(z.origin())));
            next
        });
    }

    /// Unload the zone at `origin`. Returns whether it was loaded.
    pub fn remove_zone(&self, origin: &str) -> bool {
        let origin = fqdn(origin);
        let previous = self.zones.rcu(|current| {
            current
                .iter()
                .filter(|z| z.origin() != origin)
                .cloned()
                .collect::<Vec<_>>()
        });
        let removed = previous.iter().any(|z| z.origin() == origin);
        if removed {
            info!(zone = %origin, "Unloaded authoritative zone");
        }
        removed
    }

    pub fn zone_names(&self) -> Vec<String> {
        self.zones
            .load()
            .iter()
            .map(|z| z.origin().to_string())
            .collect()
    }

    fn find_zone(&self, qname: &str) -> Option<Arc<Zone>> {
        self.zones
            .load()
            .iter()
            .find(|z| z.contains(qname))
            .cloned()
    }
}

#[async_trait]
impl Middleware for AutoStage {
    fn name(&self) -> &'static str {
        "auto"
    }

    async fn serve(
        &self,
        _ctx: &RequestContext,
        writer: &mut dyn ResponseWriter,
        query: &DnsQuery,
        next: Next<'_>,
    ) -> Result<Served, DomainError> {
        if query.class != RecordClass::IN {
            return Ok(Served::Declined);
        }
        let Some(zone) = self.find_zone(&query.qname) else {
            return Ok(Served::Declined);
        };

        let answer = zone.lookup(&query.qname, query.record_type);
        let mut response = DnsMessage::response_to(query);
        response.header.authoritative = true;
        response.header.rcode = answer.rcode;
        response.answers = answer.answers;
        response.authority = answer.authority;

        debug!(
            domain = %query.qname,
            zone = %zone.origin(),
            rcode = %answer.rcode,
            "Authoritative answer"
        );
        writer.write(response);
        Ok(next.answered(answer.rcode))
    }
}
