use crate::context::RequestContext;
use crate::ports::middleware::walk;
use crate::ports::{Middleware, MetricsSink, NoopMetrics, ResponseWriter, Served};
use ferrous_chain_domain::name::fqdn;
use ferrous_chain_domain::{DnsMessage, DnsQuery, Rcode};
use std::sync::Arc;
use tracing::{debug, error, instrument};

/// Assembles an ordered list of stages into a [`Chain`].
pub struct ChainBuilder {
    zone: Arc<str>,
    stages: Vec<Arc<dyn Middleware>>,
    fallback: Rcode,
    metrics: Arc<dyn MetricsSink>,
}

impl ChainBuilder {
    pub fn new(zone: &str) -> Self {
        Self {
            zone: Arc::from(fqdn(zone).as_str()),
            stages: Vec::new(),
            fallback: Rcode::Refused,
            metrics: Arc::new(NoopMetrics),
        }
    }

    pub fn stage(mut self, stage: Arc<dyn Middleware>) -> Self {
        self.stages.push(stage);
        self
    }

    /// Rcode written when every stage declines and nothing was written.
    pub fn fallback(mut self, rcode: Rcode) -> Self {
        self.fallback = rcode;
        self
    }

    pub fn metrics(mut self, metrics: Arc<dyn MetricsSink>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn build(self) -> Chain {
        Chain {
            zone: self.zone,
            stages: self.stages,
            fallback: self.fallback,
            metrics: self.metrics,
        }
    }
}

/// Immutable pipeline serving one zone.
///
/// Shared as `Arc<Chain>` across request tasks; dispatch never locks.
pub struct Chain {
    zone: Arc<str>,
    stages: Vec<Arc<dyn Middleware>>,
    fallback: Rcode,
    metrics: Arc<dyn MetricsSink>,
}

impl Chain {
    pub fn zone(&self) -> &str {
        &self.zone
    }

    pub(crate) fn zone_label(&self) -> Arc<str> {
        Arc::clone(&self.zone)
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Walk the stages for `query` and make sure exactly one response ends
    /// up in `writer`. Returns the rcode of that response.
    #[instrument(skip_all, fields(zone = %self.zone, qname = %query.qname, qtype = %query.record_type))]
    pub async fn dispatch(
        &self,
        ctx: &RequestContext,
        writer: &mut dyn ResponseWriter,
        query: &DnsQuery,
    ) -> Rcode {
        let rcode = if self.stages.is_empty() {
            reply_unless_written(writer, query, Rcode::Refused)
        } else {
            self.run_stages(ctx, writer, query).await
        };

        self.metrics
            .response_completed(&self.zone, query.protocol, rcode);
        rcode
    }

    async fn run_stages(
        &self,
        ctx: &RequestContext,
        writer: &mut dyn ResponseWriter,
        query: &DnsQuery,
    ) -> Rcode {
        let outcome = tokio::select! {
            biased;
            _ = ctx.cancelled() => None,
            result = walk(&self.stages, ctx, writer, query) => Some(result),
        };

        match outcome {
            None => {
                debug!("Request cancelled before a stage answered");
                reply_unless_written(writer, query, Rcode::ServFail)
            }
            Some(Ok(Served::Handled(claimed))) => match writer.written() {
                Some(msg) => msg.rcode(),
                None => {
                    error!(claimed = %claimed, "Stage reported handled without writing a response");
                    self.metrics.internal_fault(&self.zone);
                    reply_unless_written(writer, query, Rcode::ServFail)
                }
            },
            Some(Ok(Served::Declined)) => reply_unless_written(writer, query, self.fallback),
            Some(Err(e)) => {
                error!(error = %e, "Stage failed");
                self.metrics.internal_fault(&self.zone);
                reply_unless_written(writer, query, Rcode::ServFail)
            }
        }
    }
}

/// Honour a response already in `writer`, otherwise write a bare `rcode`.
pub(crate) fn reply_unless_written(
    writer: &mut dyn ResponseWriter,
    query: &DnsQuery,
    rcode: Rcode,
) -> Rcode {
    if let Some(existing) = writer.written() {
        return existing.rcode();
    }
    writer.write(DnsMessage::error_response(query, rcode));
    rcode
}
