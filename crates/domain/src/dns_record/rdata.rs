use super::RecordType;
use std::net::{Ipv4Addr, Ipv6Addr};

/// Start-of-authority data. Its `minimum` drives negative caching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Soa {
    pub mname: String,
    pub rname: String,
    pub serial: u32,
    pub refresh: u32,
    pub retry: u32,
    pub expire: u32,
    pub minimum: u32,
}

/// Record data for the types the server understands.
///
/// Anything else is kept as opaque wire bytes so that proxied answers pass
/// through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RData {
    A(Ipv4Addr),
    Aaaa(Ipv6Addr),
    Cname(String),
    Ns(String),
    Ptr(String),
    Mx { preference: u16, exchange: String },
    Txt(Vec<String>),
    Soa(Soa),
    Opaque(Vec<u8>),
}

impl RData {
    /// The record type implied by this data, if it implies one.
    pub fn record_type(&self) -> Option<RecordType> {
        match self {
            Self::A(_) => Some(RecordType::A),
            Self::Aaaa(_) => Some(RecordType::AAAA),
            Self::Cname(_) => Some(RecordType::CNAME),
            Self::Ns(_) => Some(RecordType::NS),
            Self::Ptr(_) => Some(RecordType::PTR),
            Self::Mx { .. } => Some(RecordType::MX),
            Self::Txt(_) => Some(RecordType::TXT),
            Self::Soa(_) => Some(RecordType::SOA),
            Self::Opaque(_) => None,
        }
    }

    pub fn as_soa(&self) -> Option<&Soa> {
        match self {
            Self::Soa(soa) => Some(soa),
            _ => None,
        }
    }

    pub fn as_cname(&self) -> Option<&str> {
        match self {
            Self::Cname(target) => Some(target),
            _ => None,
        }
    }
}
