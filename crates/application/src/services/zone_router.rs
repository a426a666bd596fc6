use crate::context::RequestContext;
use crate::ports::{MetricsSink, NoopMetrics, ResponseWriter};
use crate::services::chain::{reply_unless_written, Chain};
use ferrous_chain_domain::name::is_subdomain;
use ferrous_chain_domain::{DnsQuery, Rcode};
use std::sync::Arc;
use tracing::debug;

/// Zone label reported for queries that match no configured zone.
pub const DROPPED_ZONE: &str = "dropped";

/// Routes each query to the chain of the most specific matching zone.
pub struct ZoneRouter {
    chains: Vec<Arc<Chain>>,
    metrics: Arc<dyn MetricsSink>,
}

impl ZoneRouter {
    pub fn new(chains: Vec<Arc<Chain>>) -> Self {
        Self {
            chains,
            metrics: Arc::new(NoopMetrics),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsSink>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn zones(&self) -> impl Iterator<Item = &str> {
        self.chains.iter().map(|c| c.zone())
    }

    /// Longest zone suffix of `qname`, if any.
    pub fn route(&self, qname: &str) -> Option<&Arc<Chain>> {
        self.chains
            .iter()
            .filter(|chain| is_subdomain(qname, chain.zone()))
            .max_by_key(|chain| chain.zone().len())
    }

    /// Dispatch `query` to its chain, or answer REFUSED when no zone matches.
    pub async fn serve(
        &self,
        ctx: RequestContext,
        writer: &mut dyn ResponseWriter,
        query: &DnsQuery,
    ) -> Rcode {
        match self.route(&query.qname) {
            Some(chain) => {
                let ctx = ctx.with_zone(chain.zone_label());
                chain.dispatch(&ctx, writer, query).await
            }
            None => {
                debug!(qname = %query.qname, "No zone matches query");
                let rcode = reply_unless_written(writer, query, Rcode::Refused);
                self.metrics
                    .response_completed(DROPPED_ZONE, query.protocol, rcode);
                rcode
            }
        }
    }
}
