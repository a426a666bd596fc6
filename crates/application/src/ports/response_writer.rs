use ferrous_chain_domain::DnsMessage;
use tracing::warn;

/// Sink for the one terminal response of a request.
///
/// Owned by the transport. Stages write at most once; wrapping stages may
/// interpose their own writer that forwards to this one.
pub trait ResponseWriter: Send {
    fn write(&mut self, msg: DnsMessage);

    /// The response written so far, if any.
    fn written(&self) -> Option<&DnsMessage>;
}

/// Plain in-memory writer used by the transport and in tests.
#[derive(Debug, Default)]
pub struct ResponseBuffer {
    message: Option<DnsMessage>,
    overwrites: u32,
}

impl ResponseBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_message(self) -> Option<DnsMessage> {
        self.message
    }

    /// Number of writes that replaced an earlier one.
    pub fn overwrites(&self) -> u32 {
        self.overwrites
    }
}

impl ResponseWriter for ResponseBuffer {
    fn write(&mut self, msg: DnsMessage) {
        if let Some(previous) = &self.message {
            debug_assert!(false, "response written twice");
            warn!(
                id = previous.header.id,
                previous = %previous.rcode(),
                replacement = %msg.rcode(),
                "Response written twice, keeping the last write"
            );
            self.overwrites += 1;
        }
        self.message = Some(msg);
    }

    fn written(&self) -> Option<&DnsMessage> {
        self.message.as_ref()
    }
}
