use std::fmt;
use std::str::FromStr;

/// DNS resource record type (RFC 1035 §3.2.2 and successors).
///
/// Types the server has behaviour for get their own variant; everything else
/// round-trips through [`RecordType::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordType {
    A,
    NS,
    CNAME,
    SOA,
    PTR,
    HINFO,
    MX,
    TXT,
    AAAA,
    SRV,
    NAPTR,
    OPT,
    DS,
    RRSIG,
    NSEC,
    DNSKEY,
    SVCB,
    HTTPS,
    IXFR,
    AXFR,
    ANY,
    CAA,
    Unknown(u16),
}

impl RecordType {
    pub fn to_u16(self) -> u16 {
        match self {
            Self::A => 1,
            Self::NS => 2,
            Self::CNAME => 5,
            Self::SOA => 6,
            Self::PTR => 12,
            Self::HINFO => 13,
            Self::MX => 15,
            Self::TXT => 16,
            Self::AAAA => 28,
            Self::SRV => 33,
            Self::NAPTR => 35,
            Self::OPT => 41,
            Self::DS => 43,
            Self::RRSIG => 46,
            Self::NSEC => 47,
            Self::DNSKEY => 48,
            Self::SVCB => 64,
            Self::HTTPS => 65,
            Self::IXFR => 251,
            Self::AXFR => 252,
            Self::ANY => 255,
            Self::CAA => 257,
            Self::Unknown(code) => code,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::NS => "NS",
            Self::CNAME => "CNAME",
            Self::SOA => "SOA",
            Self::PTR => "PTR",
            Self::HINFO => "HINFO",
            Self::MX => "MX",
            Self::TXT => "TXT",
            Self::AAAA => "AAAA",
            Self::SRV => "SRV",
            Self::NAPTR => "NAPTR",
            Self::OPT => "OPT",
            Self::DS => "DS",
            Self::RRSIG => "RRSIG",
            Self::NSEC => "NSEC",
            Self::DNSKEY => "DNSKEY",
            Self::SVCB => "SVCB",
            Self::HTTPS => "HTTPS",
            Self::IXFR => "IXFR",
            Self::AXFR => "AXFR",
            Self::ANY => "ANY",
            Self::CAA => "CAA",
            Self::Unknown(_) => "UNKNOWN",
        }
    }

    /// Zone-transfer types are administrative and never cached.
    pub fn is_transfer(&self) -> bool {
        matches!(self, Self::AXFR | Self::IXFR)
    }

    pub fn is_dnssec(&self) -> bool {
        matches!(self, Self::DS | Self::RRSIG | Self::NSEC | Self::DNSKEY)
    }
}

impl From<u16> for RecordType {
    fn from(code: u16) -> Self {
        match code {
            1 => Self::A,
            2 => Self::NS,
            5 => Self::CNAME,
            6 => Self::SOA,
            12 => Self::PTR,
            13 => Self::HINFO,
            15 => Self::MX,
            16 => Self::TXT,
            28 => Self::AAAA,
            33 => Self::SRV,
            35 => Self::NAPTR,
            41 => Self::OPT,
            43 => Self::DS,
            46 => Self::RRSIG,
            47 => Self::NSEC,
            48 => Self::DNSKEY,
            64 => Self::SVCB,
            65 => Self::HTTPS,
            251 => Self::IXFR,
            252 => Self::AXFR,
            255 => Self::ANY,
            257 => Self::CAA,
            other => Self::Unknown(other),
        }
    }
}

impl From<RecordType> for u16 {
    fn from(rt: RecordType) -> Self {
        rt.to_u16()
    }
}

impl FromStr for RecordType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let parsed = match upper.as_str() {
            "A" => Self::A,
            "NS" => Self::NS,
            "CNAME" => Self::CNAME,
            "SOA" => Self::SOA,
            "PTR" => Self::PTR,
            "HINFO" => Self::HINFO,
            "MX" => Self::MX,
            "TXT" => Self::TXT,
            "AAAA" => Self::AAAA,
            "SRV" => Self::SRV,
            "NAPTR" => Self::NAPTR,
            "OPT" => Self::OPT,
            "DS" => Self::DS,
            "RRSIG" => Self::RRSIG,
            "NSEC" => Self::NSEC,
            "DNSKEY" => Self::DNSKEY,
            "SVCB" => Self::SVCB,
            "HTTPS" => Self::HTTPS,
            "IXFR" => Self::IXFR,
            "AXFR" => Self::AXFR,
            "ANY" => Self::ANY,
            "CAA" => Self::CAA,
            other => match other.strip_prefix("TYPE").map(str::parse::<u16>) {
                Some(Ok(code)) => Self::from(code),
                _ => return Err(format!("unknown record type: {s}")),
            },
        };
        Ok(parsed)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(code) => write!(f, "TYPE{code}"),
            other => f.write_str(other.as_str()),
        }
    }
}
