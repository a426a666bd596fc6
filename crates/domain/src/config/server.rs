use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_dns_port")]
    pub dns_port: u16,

    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Upper bound for serving one request, in milliseconds.
    /// When it elapses the request is answered with SERVFAIL.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Idle TCP connections are closed after this many seconds.
    #[serde(default = "default_tcp_idle_timeout_secs")]
    pub tcp_idle_timeout_secs: u64,
}

fn default_dns_port() -> u16 {
    53
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_request_timeout_ms() -> u64 {
    5000
}

fn default_tcp_idle_timeout_secs() -> u64 {
    10
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            dns_port: default_dns_port(),
            bind_address: default_bind_address(),
            request_timeout_ms: default_request_timeout_ms(),
            tcp_idle_timeout_secs: default_tcp_idle_timeout_secs(),
        }
    }
}
