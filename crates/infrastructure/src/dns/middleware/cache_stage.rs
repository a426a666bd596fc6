use crate::dns::cache::{is_cacheable, CacheKey, EntryKind, ResponseCache};
use async_trait::async_trait;
use ferrous_chain_application::ports::{
    CacheStatus, MetricsSink, Middleware, Next, ResponseWriter, Served,
};
use ferrous_chain_application::RequestContext;
use ferrous_chain_domain::{DnsMessage, DnsQuery, DomainError};
use std::sync::Arc;
use tokio::time::Instant;
use tracing::debug;

/// Memoizes whatever the rest of the chain answers.
///
/// A hit is written straight from the cache and the rest of the chain never
/// runs. On a miss the rest of the chain runs with a [`CachingWriter`]
/// standing in for the real writer.
pub struct CacheStage {
    cache: Arc<ResponseCache>,
    metrics: Arc<dyn MetricsSink>,
}

impl CacheStage {
    pub fn new(cache: Arc<ResponseCache>, metrics: Arc<dyn MetricsSink>) -> Self {
        Self { cache, metrics }
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }
}

#[async_trait]
impl Middleware for CacheStage {
    fn name(&self) -> &'static str {
        "cache"
    }

    async fn serve(
        &self,
        ctx: &RequestContext,
        writer: &mut dyn ResponseWriter,
        query: &DnsQuery,
        next: Next<'_>,
    ) -> Result<Served, DomainError> {
        let key = CacheKey::from_query(query);
        let now = Instant::now();

        if let Some(entry) = self.cache.lookup(&key, now) {
            let status = match entry.kind {
                EntryKind::Positive => CacheStatus::Success,
                EntryKind::Negative => CacheStatus::Denial,
            };
            self.metrics.cache_status(ctx.zone(), status);

            let response = entry.to_response(query, now);
            debug!(
                domain = %query.qname,
                record_type = %query.record_type,
                ttl = entry.remaining_ttl(now),
                "Cache hit"
            );
            let rcode = response.rcode();
            writer.write(response);
            return Ok(next.answered(rcode));
        }

        self.metrics.cache_status(ctx.zone(), CacheStatus::Miss);

        let mut caching = CachingWriter {
            inner: writer,
            cache: &self.cache,
            metrics: self.metrics.as_ref(),
            zone: ctx.zone(),
            key: Some(key),
            query,
        };
        next.run(ctx, &mut caching, query).await
    }
}

/// Writer handed downstream on a miss: stores a copy of the final message,
/// then forwards it to the real writer.
pub struct CachingWriter<'a> {
    inner: &'a mut dyn ResponseWriter,
    cache: &'a ResponseCache,
    metrics: &'a dyn MetricsSink,
    zone: &'a str,
    key: Option<CacheKey>,
    query: &'a DnsQuery,
}

impl CachingWriter<'_> {
    fn memoize(&mut self, msg: &DnsMessage) {
        if !is_cacheable(msg, self.query.record_type) {
            return;
        }
        // Answers that do not match the question would poison the key.
        if !msg.answers_query(self.query) {
            debug!(domain = %self.query.qname, "Not caching response for a different question");
            return;
        }
        let Some(key) = self.key.take() else {
            return;
        };

        if self.cache.store(key, msg, Instant::now()) {
            self.metrics.cache_size(
                self.zone,
                CacheStatus::Success,
                self.cache.len_of(EntryKind::Positive),
            );
            self.metrics.cache_size(
                self.zone,
                CacheStatus::Denial,
                self.cache.len_of(EntryKind::Negative),
            );
        }
    }
}

impl ResponseWriter for CachingWriter<'_> {
    fn write(&mut self, msg: DnsMessage) {
        self.memoize(&msg);
        self.inner.write(msg);
    }

    fn written(&self) -> Option<&DnsMessage> {
        self.inner.written()
    }
}
