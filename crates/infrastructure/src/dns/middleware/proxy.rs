use async_trait::async_trait;
use ferrous_chain_application::ports::{Middleware, Next, ResponseWriter, Served, Upstream};
use ferrous_chain_application::RequestContext;
use ferrous_chain_domain::message::Question;
use ferrous_chain_domain::{DnsQuery, DomainError};
use std::sync::Arc;
use tracing::debug;

/// Forwards every query to an upstream resolver.
pub struct ProxyStage {
    upstream: Arc<dyn Upstream>,
}

impl ProxyStage {
    pub fn new(upstream: Arc<dyn Upstream>) -> Self {
        Self { upstream }
    }
}

#[async_trait]
impl Middleware for ProxyStage {
    fn name(&self) -> &'static str {
        "proxy"
    }

    async fn serve(
        &self,
        _ctx: &RequestContext,
        writer: &mut dyn ResponseWriter,
        query: &DnsQuery,
        next: Next<'_>,
    ) -> Result<Served, DomainError> {
        let mut response = self.upstream.exchange(query).await?;

        response.header.id = query.id;
        response.header.response = true;
        response.header.authoritative = false;
        response.header.recursion_desired = query.recursion_desired;
        response.question = Some(Question::from_query(query));
        response.from_cache = false;

        debug!(
            domain = %query.qname,
            record_type = %query.record_type,
            rcode = %response.rcode(),
            answers = response.answers.len(),
            upstream = %self.upstream.describe(),
            "Proxied query"
        );
        let rcode = response.rcode();
        writer.write(response);
        Ok(next.answered(rcode))
    }
}
