use crate::context::RequestContext;
use crate::ports::ResponseWriter;
use async_trait::async_trait;
use ferrous_chain_domain::{DnsQuery, DomainError, Rcode};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// What a stage did with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Served {
    /// A response was written and the chain must stop here.
    Handled(Rcode),
    /// Not handled; the next stage gets a turn.
    Declined,
}

/// One stage of a request-processing chain.
///
/// Stages that only need to answer or decline ignore `next`. Wrapping
/// stages (cache, metrics) call [`Next::run`] to drive the remainder of the
/// chain themselves; once they do, their result stands for the whole tail.
///
/// A stage that answers while only observers remain after it writes its
/// reply and declines (see [`Next::answered`]), so those observers still run
/// and the dispatcher sends the written reply.
#[async_trait]
pub trait Middleware: Send + Sync {
    fn name(&self) -> &'static str;

    /// True for stages that never answer and only record what the rest of
    /// the chain did.
    fn observes_only(&self) -> bool {
        false
    }

    async fn serve(
        &self,
        ctx: &RequestContext,
        writer: &mut dyn ResponseWriter,
        query: &DnsQuery,
        next: Next<'_>,
    ) -> Result<Served, DomainError>;
}

/// Handle to the stages after the current one.
pub struct Next<'a> {
    rest: &'a [Arc<dyn Middleware>],
    taken: &'a AtomicBool,
}

impl<'a> Next<'a> {
    /// Number of stages left in the chain.
    pub fn len(&self) -> usize {
        self.rest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rest.is_empty()
    }

    /// Whether every remaining stage is an observer. False when none remain.
    pub fn only_observers_left(&self) -> bool {
        !self.rest.is_empty() && self.rest.iter().all(|s| s.observes_only())
    }

    /// Result for a stage that has just written a reply with `rcode`.
    ///
    /// Declines while observers remain so they see the written reply,
    /// otherwise claims the request.
    pub fn answered(&self, rcode: Rcode) -> Served {
        if self.only_observers_left() {
            Served::Declined
        } else {
            Served::Handled(rcode)
        }
    }

    /// Run the remainder of the chain.
    pub async fn run(
        self,
        ctx: &RequestContext,
        writer: &mut dyn ResponseWriter,
        query: &DnsQuery,
    ) -> Result<Served, DomainError> {
        self.taken.store(true, Ordering::Relaxed);
        walk(self.rest, ctx, writer, query).await
    }
}

/// Invoke `stages` in order until one handles, fails, or takes over the tail.
pub(crate) async fn walk(
    stages: &[Arc<dyn Middleware>],
    ctx: &RequestContext,
    writer: &mut dyn ResponseWriter,
    query: &DnsQuery,
) -> Result<Served, DomainError> {
    for (idx, stage) in stages.iter().enumerate() {
        let taken = AtomicBool::new(false);
        let next = Next {
            rest: &stages[idx + 1..],
            taken: &taken,
        };

        match stage.serve(ctx, writer, query, next).await? {
            Served::Handled(rcode) => return Ok(Served::Handled(rcode)),
            // The stage already drove the tail; do not walk it twice.
            Served::Declined if taken.load(Ordering::Relaxed) => return Ok(Served::Declined),
            Served::Declined => continue,
        }
    }
    Ok(Served::Declined)
}
