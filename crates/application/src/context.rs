use std::sync::Arc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Per-request state shared by every stage of a chain.
///
/// Carries the zone label used for metrics and the signals that abort the
/// request: an explicit cancellation token and an optional deadline.
#[derive(Debug, Clone)]
pub struct RequestContext {
    zone: Arc<str>,
    cancel: CancellationToken,
    deadline: Option<Instant>,
    started: Instant,
}

impl RequestContext {
    pub fn new(zone: impl Into<Arc<str>>) -> Self {
        Self {
            zone: zone.into(),
            cancel: CancellationToken::new(),
            deadline: None,
            started: Instant::now(),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_zone(mut self, zone: Arc<str>) -> Self {
        self.zone = zone;
        self
    }

    pub fn zone(&self) -> &str {
        &self.zone
    }

    pub fn started(&self) -> Instant {
        self.started
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Resolves once the request is cancelled or its deadline passes.
    pub async fn cancelled(&self) {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.cancel.cancelled() => {}
                    _ = tokio::time::sleep_until(deadline) => {}
                }
            }
            None => self.cancel.cancelled().await,
        }
    }
}
