//! Ferrous Chain Domain Layer
pub mod config;
pub mod dns_protocol;
pub mod dns_query;
pub mod dns_record;
pub mod errors;
pub mod message;
pub mod name;

pub use config::{CliOverrides, Config, ConfigError};
pub use dns_protocol::DnsProtocol;
pub use dns_query::DnsQuery;
pub use dns_record::{DnsRecord, RData, RecordClass, RecordType};
pub use errors::DomainError;
pub use message::{DnsMessage, Header, Question, Rcode};
