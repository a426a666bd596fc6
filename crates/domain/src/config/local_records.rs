use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use super::errors::ConfigError;
use crate::dns_record::{DnsRecord, RData, RecordType, Soa};
use crate::name::fqdn;

/// In-memory authoritative zone served by an `auto` stage.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthoritativeZoneConfig {
    /// Zone origin (e.g. "example.org.")
    pub origin: String,

    /// Zone contents; must contain the SOA record at the origin
    #[serde(default)]
    pub records: Vec<ZoneRecord>,
}

/// One record of an authoritative zone, in presentation form.
///
/// `name` is relative to the zone origin unless it ends with a dot;
/// `@` stands for the origin itself.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ZoneRecord {
    pub name: String,

    /// "A", "AAAA", "CNAME", "NS", "PTR", "MX", "TXT" or "SOA"
    pub record_type: String,

    /// Examples: "192.0.2.1", "mail.example.org.", "10 mail",
    /// "ns1 hostmaster 1 3600 900 604800 60"
    pub value: String,

    /// Time-to-live in seconds (optional, default 300)
    #[serde(default)]
    pub ttl: Option<u32>,
}

impl ZoneRecord {
    /// Get TTL with default fallback
    pub fn ttl_or_default(&self) -> u32 {
        self.ttl.unwrap_or(300)
    }

    /// Build the owner name relative to `origin`.
    ///
    /// # Examples
    /// ```
    /// use ferrous_chain_domain::config::ZoneRecord;
    ///
    /// let record = ZoneRecord {
    ///     name: "www".into(),
    ///     record_type: "A".into(),
    ///     value: "192.0.2.1".into(),
    ///     ttl: None,
    /// };
    /// assert_eq!(record.owner("example.org."), "www.example.org.");
    /// ```
    pub fn owner(&self, origin: &str) -> String {
        qualify(&self.name, origin)
    }

    /// Turn this entry into a typed record owned by `origin`.
    pub fn to_record(&self, origin: &str) -> Result<DnsRecord, ConfigError> {
        let owner = self.owner(origin);
        let record_type: RecordType = self
            .record_type
            .parse()
            .map_err(|e: String| ConfigError::Validation(format!("{owner}: {e}")))?;
        let invalid = |what: &str| {
            ConfigError::Validation(format!(
                "{owner} {record_type}: invalid {what} '{}'",
                self.value
            ))
        };
        let value = self.value.trim();

        let data = match record_type {
            RecordType::A => match value.parse::<IpAddr>() {
                Ok(IpAddr::V4(v4)) => RData::A(v4),
                _ => return Err(invalid("IPv4 address")),
            },
            RecordType::AAAA => match value.parse::<IpAddr>() {
                Ok(IpAddr::V6(v6)) => RData::Aaaa(v6),
                _ => return Err(invalid("IPv6 address")),
            },
            RecordType::CNAME => RData::Cname(qualify(value, origin)),
            RecordType::NS => RData::Ns(qualify(value, origin)),
            RecordType::PTR => RData::Ptr(qualify(value, origin)),
            RecordType::MX => {
                let (pref, exchange) = value
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| invalid("MX"))?;
                RData::Mx {
                    preference: pref.parse().map_err(|_| invalid("MX preference"))?,
                    exchange: qualify(exchange.trim(), origin),
                }
            }
            RecordType::TXT => RData::Txt(vec![value.trim_matches('"').to_string()]),
            RecordType::SOA => {
                let fields: Vec<&str> = value.split_whitespace().collect();
                if fields.len() != 7 {
                    return Err(invalid("SOA"));
                }
                let num = |i: usize| fields[i].parse::<u32>().map_err(|_| invalid("SOA timer"));
                RData::Soa(Soa {
                    mname: qualify(fields[0], origin),
                    rname: qualify(fields[1], origin),
                    serial: num(2)?,
                    refresh: num(3)?,
                    retry: num(4)?,
                    expire: num(5)?,
                    minimum: num(6)?,
                })
            }
            other => {
                return Err(ConfigError::Validation(format!(
                    "{owner}: record type {other} not supported in zone config"
                )))
            }
        };

        Ok(DnsRecord::new(&owner, self.ttl_or_default(), data))
    }
}

fn qualify(name: &str, origin: &str) -> String {
    if name == "@" {
        fqdn(origin)
    } else if name.ends_with('.') {
        fqdn(name)
    } else {
        fqdn(&format!("{}.{}", name, origin.trim_end_matches('.')))
    }
}
