use async_trait::async_trait;
use ferrous_chain_application::ports::Upstream;
use ferrous_chain_domain::{DnsMessage, DnsQuery, DomainError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

type Responder = dyn Fn(&DnsQuery) -> Result<DnsMessage, DomainError> + Send + Sync;

/// Upstream answering from a closure and counting exchanges.
pub struct MockUpstream {
    respond: Box<Responder>,
    calls: Arc<AtomicUsize>,
}

impl MockUpstream {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(&DnsQuery) -> Result<DnsMessage, DomainError> + Send + Sync + 'static,
    {
        Self {
            respond: Box::new(respond),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Upstream that always fails.
    pub fn failing() -> Self {
        Self::new(|_| Err(DomainError::UpstreamTimeout("192.0.2.53:53".into())))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Upstream for MockUpstream {
    async fn exchange(&self, query: &DnsQuery) -> Result<DnsMessage, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.respond)(query)
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}
