use thiserror::Error;

/// Internal faults raised while serving a request.
///
/// These never reach the client as-is: the dispatcher turns any of them into
/// a SERVFAIL response.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Invalid DNS message: {0}")]
    InvalidMessage(String),

    #[error("Wire format error: {0}")]
    Wire(String),

    #[error("Upstream {server} failed: {reason}")]
    Upstream { server: String, reason: String },

    #[error("Upstream {0} timed out")]
    UpstreamTimeout(String),

    #[error("No upstream servers configured")]
    NoUpstreams,

    #[error("Request cancelled")]
    Cancelled,

    #[error("Stage {stage} fault: {reason}")]
    StageFault { stage: &'static str, reason: String },

    #[error("I/O error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for DomainError {
    fn from(e: std::io::Error) -> Self {
        DomainError::IoError(e.to_string())
    }
}
