//! Configuration module for Ferrous Chain
//!
//! This module contains all configuration structures organized by concern:
//! - `root`: Main configuration and CLI overrides
//! - `server`: Listener ports and request limits
//! - `cache`: Response cache sizing and TTL policy
//! - `zone`: Zone blocks and their ordered middleware stages
//! - `local_records`: Inline records for authoritative zones
//! - `logging`: Logging settings
//! - `errors`: Configuration errors

pub mod cache;
pub mod errors;
pub mod local_records;
pub mod logging;
pub mod root;
pub mod server;
pub mod zone;

pub use cache::CacheConfig;
pub use errors::ConfigError;
pub use local_records::{AuthoritativeZoneConfig, ZoneRecord};
pub use logging::LoggingConfig;
pub use root::{CliOverrides, Config};
pub use server::ServerConfig;
pub use zone::{StageConfig, ZoneConfig};
