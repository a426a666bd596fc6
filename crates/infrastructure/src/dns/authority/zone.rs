use ferrous_chain_domain::config::{AuthoritativeZoneConfig, ConfigError};
use ferrous_chain_domain::name::{fqdn, is_subdomain};
use ferrous_chain_domain::{DnsRecord, Rcode, RecordType};
use rustc_hash::FxHashMap;

/// Longest CNAME chain followed inside one zone.
const MAX_CNAME_HOPS: usize = 8;

/// Records of one zone, indexed by owner name.
#[derive(Debug, Clone)]
pub struct Zone {
    origin: String,
    soa: DnsRecord,
    names: FxHashMap<String, Vec<DnsRecord>>,
}

/// Sections of an authoritative reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneAnswer {
    pub rcode: Rcode,
    pub answers: Vec<DnsRecord>,
    pub authority: Vec<DnsRecord>,
}

impl Zone {
    /// Build a zone from its records. Exactly one SOA at the origin is
    /// required; records outside the origin are rejected.
    pub fn new(origin: &str, records: Vec<DnsRecord>) -> Result<Self, ConfigError> {
        let origin = fqdn(origin);
        let mut soa = None;
        let mut names: FxHashMap<String, Vec<DnsRecord>> = FxHashMap::default();

        for record in records {
            if !is_subdomain(&record.name, &origin) {
                return Err(ConfigError::Validation(format!(
                    "Zone '{origin}': record '{}' is outside the zone",
                    record.name
                )));
            }
            if record.record_type == RecordType::SOA {
                if record.name != origin || soa.is_some() {
                    return Err(ConfigError::Validation(format!(
                        "Zone '{origin}': exactly one SOA at the origin is allowed"
                    )));
                }
                soa = Some(record.clone());
            }
            names.entry(record.name.clone()).or_default().push(record);
        }

        let soa = soa.ok_or_else(|| {
            ConfigError::Validation(format!("Zone '{origin}': missing SOA record"))
        })?;

        Ok(Self { origin, soa, names })
    }

    pub fn from_config(config: &AuthoritativeZoneConfig) -> Result<Self, ConfigError> {
        let records = config
            .records
            .iter()
            .map(|r| r.to_record(&config.origin))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(&config.origin, records)
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn soa(&self) -> &DnsRecord {
        &self.soa
    }

    pub fn contains(&self, qname: &str) -> bool {
        is_subdomain(qname, &self.origin)
    }

    pub fn record_count(&self) -> usize {
        self.names.values().map(Vec::len).sum()
    }

    /// Answer `qtype` at `qname`, which must already be normalized.
    ///
    /// In-zone CNAMEs are followed; negative answers carry the SOA in the
    /// authority section.
    pub fn lookup(&self, qname: &str, qtype: RecordType) -> ZoneAnswer {
        let mut answer = ZoneAnswer::default();
        let mut current = qname.to_string();

        for _ in 0..=MAX_CNAME_HOPS {
            let Some(rrset) = self.find(&current) else {
                answer.rcode = if self.has_descendants(&current) {
                    Rcode::NoError
                } else {
                    Rcode::NXDomain
                };
                answer.authority.push(self.soa.clone());
                return answer;
            };

            let matching: Vec<DnsRecord> = rrset
                .iter()
                .filter(|r| r.record_type == qtype || qtype == RecordType::ANY)
                .cloned()
                .collect();
            if !matching.is_empty() {
                answer.answers.extend(matching);
                return answer;
            }

            let cname = rrset
                .iter()
                .find(|r| r.record_type == RecordType::CNAME)
                .filter(|_| qtype != RecordType::CNAME);
            let Some(cname) = cname else {
                // NODATA
                answer.authority.push(self.soa.clone());
                return answer;
            };

            answer.answers.push(cname.clone());
            let target = cname.data.as_cname().map(fqdn).unwrap_or_default();
            if !self.contains(&target) {
                return answer;
            }
            current = target;
        }

        answer
    }

    /// Records owned by `qname`, synthesized from a wildcard when the name
    /// itself does not exist.
    fn find(&self, qname: &str) -> Option<Vec<DnsRecord>> {
        if let Some(records) = self.names.get(qname) {
            return Some(records.clone());
        }

        let mut parent = qname;
        while let Some((_, rest)) = parent.split_once('.') {
            if rest.is_empty() || !is_subdomain(rest, &self.origin) {
                break;
            }
            let wildcard = format!("*.{rest}");
            if let Some(records) = self.names.get(&wildcard) {
                return Some(
                    records
                        .iter()
                        .map(|r| DnsRecord {
                            name: qname.to_string(),
                            ..r.clone()
                        })
                        .collect(),
                );
            }
            // The closest existing ancestor blocks wildcards above it.
            if self.names.contains_key(rest) {
                break;
            }
            parent = rest;
        }
        None
    }

    /// Whether some owner sits below `qname` (an empty non-terminal).
    fn has_descendants(&self, qname: &str) -> bool {
        self.names
            .keys()
            .any(|name| name != qname && is_subdomain(name, qname))
    }
}
