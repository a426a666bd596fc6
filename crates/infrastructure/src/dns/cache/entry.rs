use ferrous_chain_domain::{DnsMessage, DnsQuery, DnsRecord, Question, Rcode};
use tokio::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Positive,
    /// NXDOMAIN or NODATA
    Negative,
}

impl EntryKind {
    pub fn of(msg: &DnsMessage) -> Self {
        if msg.is_negative() {
            Self::Negative
        } else {
            Self::Positive
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
        }
    }
}

/// Frozen copy of a response, shared read-only between lookups.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub answers: Vec<DnsRecord>,
    pub authority: Vec<DnsRecord>,
    pub additional: Vec<DnsRecord>,
    pub rcode: Rcode,
    pub recursion_available: bool,
    pub kind: EntryKind,
    pub stored_at: Instant,
    /// TTL chosen at store time (seconds)
    pub ttl: u32,
    pub expires_at: Instant,
}

impl CacheEntry {
    pub fn new(msg: &DnsMessage, kind: EntryKind, ttl: u32, now: Instant) -> Self {
        Self {
            answers: msg.answers.clone(),
            authority: msg.authority.clone(),
            additional: msg.additional.clone(),
            rcode: msg.rcode(),
            recursion_available: msg.header.recursion_available,
            kind,
            stored_at: now,
            ttl,
            expires_at: now + Duration::from_secs(u64::from(ttl)),
        }
    }

    #[inline]
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    /// `ttl - elapsed`, never below zero.
    #[inline]
    pub fn remaining_ttl(&self, now: Instant) -> u32 {
        let elapsed = now.saturating_duration_since(self.stored_at).as_secs();
        u64::from(self.ttl).saturating_sub(elapsed) as u32
    }

    /// Build the reply to `query` from this entry.
    ///
    /// Every TTL is rewritten to the remaining TTL, AA is cleared and the
    /// message is marked as coming from the cache.
    pub fn to_response(&self, query: &DnsQuery, now: Instant) -> DnsMessage {
        let mut msg = DnsMessage::response_to(query);
        msg.header.rcode = self.rcode;
        msg.header.authoritative = false;
        msg.header.recursion_available = self.recursion_available;
        msg.question = Some(Question::from_query(query));
        msg.answers = self.answers.clone();
        msg.authority = self.authority.clone();
        msg.additional = self.additional.clone();
        msg.set_ttl(self.remaining_ttl(now));
        msg.from_cache = true;
        msg
    }
}
