use serde::{Deserialize, Serialize};

use super::errors::ConfigError;
use super::local_records::AuthoritativeZoneConfig;
use crate::Rcode;

/// One served zone and the ordered stages its queries run through.
///
/// Order matters: stages listed first run first. A metrics stage is usually
/// listed first so it sees every answer; a cache stage is listed before the
/// stages whose answers it should memoize.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ZoneConfig {
    /// Zone origin, e.g. "example.org." or "." for everything
    pub zone: String,

    /// Rcode written when no stage handles a query: "REFUSED" or "SERVFAIL"
    #[serde(default = "default_fallback_rcode")]
    pub fallback_rcode: String,

    #[serde(default)]
    pub stages: Vec<StageConfig>,
}

impl ZoneConfig {
    pub fn fallback(&self) -> Result<Rcode, ConfigError> {
        match self.fallback_rcode.parse::<Rcode>() {
            Ok(rcode @ (Rcode::Refused | Rcode::ServFail)) => Ok(rcode),
            _ => Err(ConfigError::Validation(format!(
                "Zone '{}': fallback_rcode must be REFUSED or SERVFAIL, got '{}'",
                self.zone, self.fallback_rcode
            ))),
        }
    }
}

fn default_fallback_rcode() -> String {
    "REFUSED".to_string()
}

/// A middleware stage as written in the config file.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StageConfig {
    /// Request metrics, observing everything downstream
    Prometheus,

    /// Response cache for everything downstream; sized by `[cache]`
    /// unless `capacity` overrides it
    Cache {
        #[serde(default)]
        capacity: Option<usize>,
    },

    /// CH-class TXT answers about the server itself
    Chaos {
        #[serde(default = "default_chaos_version")]
        version: String,
        #[serde(default)]
        authors: Vec<String>,
        #[serde(default)]
        hostname: Option<String>,
    },

    /// Forward to upstream resolvers
    Proxy {
        upstreams: Vec<String>,
        #[serde(default = "default_proxy_timeout_ms")]
        timeout_ms: u64,
    },

    /// Authoritative answers from in-memory zones
    Auto {
        #[serde(default)]
        zones: Vec<AuthoritativeZoneConfig>,
    },
}

impl StageConfig {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Prometheus => "prometheus",
            Self::Cache { .. } => "cache",
            Self::Chaos { .. } => "chaos",
            Self::Proxy { .. } => "proxy",
            Self::Auto { .. } => "auto",
        }
    }
}

fn default_chaos_version() -> String {
    concat!("ferrous-chain-", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_proxy_timeout_ms() -> u64 {
    2000
}
