use async_trait::async_trait;
use ferrous_chain_application::ports::{MetricsSink, Middleware, Next, ResponseWriter, Served};
use ferrous_chain_application::RequestContext;
use ferrous_chain_domain::{DnsQuery, DomainError, Rcode};
use std::sync::Arc;
use tokio::time::Instant;

/// Times everything after it and reports one observation per request,
/// including the rcode of the reply that ends up in the writer.
///
/// Placed after an answering stage it still runs: that stage writes and
/// declines, and this one reports the reply already written.
pub struct MetricsStage {
    metrics: Arc<dyn MetricsSink>,
}

impl MetricsStage {
    pub fn new(metrics: Arc<dyn MetricsSink>) -> Self {
        Self { metrics }
    }
}

#[async_trait]
impl Middleware for MetricsStage {
    fn name(&self) -> &'static str {
        "prometheus"
    }

    fn observes_only(&self) -> bool {
        true
    }

    async fn serve(
        &self,
        ctx: &RequestContext,
        writer: &mut dyn ResponseWriter,
        query: &DnsQuery,
        next: Next<'_>,
    ) -> Result<Served, DomainError> {
        let start = Instant::now();
        let result = next.run(ctx, writer, query).await;
        let rcode = observed_rcode(&result, &*writer);
        self.metrics
            .request_observed(ctx.zone(), query, rcode, start.elapsed());
        result
    }
}

/// Rcode the client will get, as far as this stage can tell.
///
/// A fault or a handled-without-write turns into SERVFAIL at the
/// dispatcher; a bare decline is left to the chain's fallback.
fn observed_rcode(
    result: &Result<Served, DomainError>,
    writer: &dyn ResponseWriter,
) -> Option<Rcode> {
    match (writer.written(), result) {
        (Some(msg), _) => Some(msg.rcode()),
        (None, Err(_)) | (None, Ok(Served::Handled(_))) => Some(Rcode::ServFail),
        (None, Ok(Served::Declined)) => None,
    }
}
