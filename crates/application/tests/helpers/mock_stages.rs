use async_trait::async_trait;
use ferrous_chain_application::ports::{Middleware, Next, ResponseWriter, Served};
use ferrous_chain_application::RequestContext;
use ferrous_chain_domain::{DnsMessage, DnsQuery, DomainError, Rcode};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Call counting
// ============================================================================

#[derive(Clone, Default)]
pub struct Calls(Arc<AtomicUsize>);

impl Calls {
    pub fn hit(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Stages
// ============================================================================

/// Writes a response with `rcode`; handles unless only observers follow.
pub struct AnswerStage {
    pub rcode: Rcode,
    pub calls: Calls,
}

impl AnswerStage {
    pub fn new(rcode: Rcode) -> (Arc<Self>, Calls) {
        let calls = Calls::default();
        (
            Arc::new(Self {
                rcode,
                calls: calls.clone(),
            }),
            calls,
        )
    }
}

#[async_trait]
impl Middleware for AnswerStage {
    fn name(&self) -> &'static str {
        "answer"
    }

    async fn serve(
        &self,
        _ctx: &RequestContext,
        writer: &mut dyn ResponseWriter,
        query: &DnsQuery,
        next: Next<'_>,
    ) -> Result<Served, DomainError> {
        self.calls.hit();
        writer.write(DnsMessage::error_response(query, self.rcode));
        Ok(next.answered(self.rcode))
    }
}

/// Declines without touching the writer.
pub struct DeclineStage {
    pub calls: Calls,
}

impl DeclineStage {
    pub fn new() -> (Arc<Self>, Calls) {
        let calls = Calls::default();
        (
            Arc::new(Self {
                calls: calls.clone(),
            }),
            calls,
        )
    }
}

#[async_trait]
impl Middleware for DeclineStage {
    fn name(&self) -> &'static str {
        "decline"
    }

    async fn serve(
        &self,
        _ctx: &RequestContext,
        _writer: &mut dyn ResponseWriter,
        _query: &DnsQuery,
        _next: Next<'_>,
    ) -> Result<Served, DomainError> {
        self.calls.hit();
        Ok(Served::Declined)
    }
}

/// Writes a response but declines so later stages still run.
pub struct ObserveStage {
    pub rcode: Rcode,
}

#[async_trait]
impl Middleware for ObserveStage {
    fn name(&self) -> &'static str {
        "observe"
    }

    async fn serve(
        &self,
        _ctx: &RequestContext,
        writer: &mut dyn ResponseWriter,
        query: &DnsQuery,
        _next: Next<'_>,
    ) -> Result<Served, DomainError> {
        writer.write(DnsMessage::error_response(query, self.rcode));
        Ok(Served::Declined)
    }
}

/// Records what an earlier stage wrote, then declines.
pub struct PeekStage {
    pub seen: Arc<std::sync::Mutex<Option<Rcode>>>,
}

#[async_trait]
impl Middleware for PeekStage {
    fn name(&self) -> &'static str {
        "peek"
    }

    async fn serve(
        &self,
        _ctx: &RequestContext,
        writer: &mut dyn ResponseWriter,
        _query: &DnsQuery,
        _next: Next<'_>,
    ) -> Result<Served, DomainError> {
        if let Ok(mut seen) = self.seen.lock() {
            *seen = writer.written().map(|m| m.rcode());
        }
        Ok(Served::Declined)
    }
}

/// Fails, optionally after writing a response.
pub struct FaultStage {
    pub write_first: Option<Rcode>,
}

#[async_trait]
impl Middleware for FaultStage {
    fn name(&self) -> &'static str {
        "fault"
    }

    async fn serve(
        &self,
        _ctx: &RequestContext,
        writer: &mut dyn ResponseWriter,
        query: &DnsQuery,
        _next: Next<'_>,
    ) -> Result<Served, DomainError> {
        if let Some(rcode) = self.write_first {
            writer.write(DnsMessage::error_response(query, rcode));
        }
        Err(DomainError::StageFault {
            stage: "fault",
            reason: "boom".into(),
        })
    }
}

/// Claims to handle without writing anything.
pub struct LyingStage;

#[async_trait]
impl Middleware for LyingStage {
    fn name(&self) -> &'static str {
        "lying"
    }

    async fn serve(
        &self,
        _ctx: &RequestContext,
        _writer: &mut dyn ResponseWriter,
        _query: &DnsQuery,
        _next: Next<'_>,
    ) -> Result<Served, DomainError> {
        Ok(Served::Handled(Rcode::NoError))
    }
}

/// Sleeps before answering NOERROR.
pub struct SlowStage {
    pub delay: Duration,
}

#[async_trait]
impl Middleware for SlowStage {
    fn name(&self) -> &'static str {
        "slow"
    }

    async fn serve(
        &self,
        _ctx: &RequestContext,
        writer: &mut dyn ResponseWriter,
        query: &DnsQuery,
        _next: Next<'_>,
    ) -> Result<Served, DomainError> {
        tokio::time::sleep(self.delay).await;
        writer.write(DnsMessage::response_to(query));
        Ok(Served::Handled(Rcode::NoError))
    }
}

/// Runs the rest of the chain itself and passes its result through.
pub struct WrapStage {
    pub calls: Calls,
    pub tail_len: Arc<AtomicUsize>,
}

impl WrapStage {
    pub fn new() -> (Arc<Self>, Calls) {
        let calls = Calls::default();
        (
            Arc::new(Self {
                calls: calls.clone(),
                tail_len: Arc::new(AtomicUsize::new(0)),
            }),
            calls,
        )
    }
}

#[async_trait]
impl Middleware for WrapStage {
    fn name(&self) -> &'static str {
        "wrap"
    }

    async fn serve(
        &self,
        ctx: &RequestContext,
        writer: &mut dyn ResponseWriter,
        query: &DnsQuery,
        next: Next<'_>,
    ) -> Result<Served, DomainError> {
        self.calls.hit();
        self.tail_len.store(next.len(), Ordering::SeqCst);
        next.run(ctx, writer, query).await
    }
}

/// Drives the rest of the chain and records the rcode of whatever reply is
/// in the writer afterwards.
pub struct ObserverStage {
    pub seen: Arc<std::sync::Mutex<Vec<Option<Rcode>>>>,
}

impl ObserverStage {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            seen: Arc::default(),
        })
    }

    pub fn seen(&self) -> Vec<Option<Rcode>> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Middleware for ObserverStage {
    fn name(&self) -> &'static str {
        "observer"
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
        let result = next.run(ctx, writer, query).await;
        self.seen
            .lock()
            .unwrap()
            .push(writer.written().map(|msg| msg.rcode()));
        result
    }
}
