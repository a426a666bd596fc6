use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use super::cache::CacheConfig;
use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::server::ServerConfig;
use super::zone::{StageConfig, ZoneConfig};

/// Main configuration structure for Ferrous Chain
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Listener configuration (port, bind address, limits)
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Response cache sizing and TTL policy
    #[serde(default)]
    pub cache: CacheConfig,

    /// Served zones, each with its own middleware chain
    #[serde(default = "default_zones")]
    pub zones: Vec<ZoneConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            cache: CacheConfig::default(),
            zones: default_zones(),
        }
    }
}

/// A forwarding resolver for everything: metrics, cache, proxy.
fn default_zones() -> Vec<ZoneConfig> {
    vec![ZoneConfig {
        zone: ".".to_string(),
        fallback_rcode: "REFUSED".to_string(),
        stages: vec![
            StageConfig::Prometheus,
            StageConfig::Cache { capacity: None },
            StageConfig::Proxy {
                upstreams: vec!["8.8.8.8:53".to_string(), "1.1.1.1:53".to_string()],
                timeout_ms: 2000,
            },
        ],
    }]
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. ferrous-chain.toml in current directory
    /// 3. /etc/ferrous-chain/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if std::path::Path::new("ferrous-chain.toml").exists() {
            Self::from_file("ferrous-chain.toml")?
        } else if std::path::Path::new("/etc/ferrous-chain/config.toml").exists() {
            Self::from_file("/etc/ferrous-chain/config.toml")?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    /// Load configuration from a specific file
    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply command-line overrides to configuration
    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(port) = overrides.dns_port {
            self.server.dns_port = port;
        }
        if let Some(bind) = overrides.bind_address {
            self.server.bind_address = bind;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.dns_port == 0 {
            return Err(ConfigError::Validation("DNS port cannot be 0".to_string()));
        }

        if self.cache.capacity == 0 {
            return Err(ConfigError::Validation(
                "Cache capacity must be at least 1".to_string(),
            ));
        }

        if self.cache.shards == 0 {
            return Err(ConfigError::Validation(
                "Cache shard count must be at least 1".to_string(),
            ));
        }

        if !matches!(self.cache.eviction.as_str(), "lru" | "expired-first") {
            return Err(ConfigError::Validation(format!(
                "Unknown cache eviction policy '{}'",
                self.cache.eviction
            )));
        }

        if self.zones.is_empty() {
            return Err(ConfigError::Validation("No zones configured".to_string()));
        }

        for zone in &self.zones {
            zone.fallback()?;
            for stage in &zone.stages {
                Self::validate_stage(&zone.zone, stage)?;
            }
        }

        Ok(())
    }

    fn validate_stage(zone: &str, stage: &StageConfig) -> Result<(), ConfigError> {
        match stage {
            StageConfig::Proxy { upstreams, .. } => {
                if upstreams.is_empty() {
                    return Err(ConfigError::Validation(format!(
                        "Zone '{zone}': proxy has no upstreams"
                    )));
                }
                for upstream in upstreams {
                    upstream.parse::<SocketAddr>().map_err(|e| {
                        ConfigError::Validation(format!(
                            "Zone '{zone}': invalid upstream '{upstream}': {e}"
                        ))
                    })?;
                }
            }
            StageConfig::Cache {
                capacity: Some(0),
            } => {
                return Err(ConfigError::Validation(format!(
                    "Zone '{zone}': cache capacity must be at least 1"
                )));
            }
            StageConfig::Auto { zones } => {
                for auth in zones {
                    for record in &auth.records {
                        record.to_record(&auth.origin)?;
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<(), ConfigError> {
        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, toml_string)
            .map_err(|e| ConfigError::FileWrite(path.to_string(), e.to_string()))?;
        Ok(())
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub dns_port: Option<u16>,
    pub bind_address: Option<String>,
    pub log_level: Option<String>,
}
