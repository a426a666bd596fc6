use async_trait::async_trait;
use ferrous_chain_application::ports::{Middleware, Next, ResponseWriter, Served};
use ferrous_chain_application::RequestContext;
use ferrous_chain_domain::{
    DnsMessage, DnsQuery, DnsRecord, DomainError, RData, RecordClass, RecordType,
};
use tracing::debug;

/// Answers CH-class TXT questions about the server itself.
pub struct ChaosStage {
    version: String,
    authors: Vec<String>,
    hostname: String,
}

impl ChaosStage {
    /// `hostname` falls back to the machine's host name.
    pub fn new(version: String, authors: Vec<String>, hostname: Option<String>) -> Self {
        let hostname = hostname.unwrap_or_else(|| {
            hostname::get()
                .ok()
                .and_then(|h| h.into_string().ok())
                .unwrap_or_else(|| "localhost".to_string())
        });
        Self {
            version,
            authors,
            hostname,
        }
    }

    fn texts(&self, qname: &str) -> Option<Vec<&str>> {
        match qname {
            "version.bind." | "version.server." => Some(vec![self.version.as_str()]),
            "authors.bind." => Some(self.authors.iter().map(String::as_str).collect()),
            "hostname.bind." | "id.server." => Some(vec![self.hostname.as_str()]),
            _ => None,
        }
    }
}

#[async_trait]
impl Middleware for ChaosStage {
    fn name(&self) -> &'static str {
        "chaos"
    }

    async fn serve(
        &self,
        _ctx: &RequestContext,
        writer: &mut dyn ResponseWriter,
        query: &DnsQuery,
        next: Next<'_>,
    ) -> Result<Served, DomainError> {
        if query.class != RecordClass::CH || query.record_type != RecordType::TXT {
            return Ok(Served::Declined);
        }
        let Some(texts) = self.texts(&query.qname) else {
            return Ok(Served::Declined);
        };

        let mut response = DnsMessage::response_to(query);
        response.header.authoritative = true;
        response.answers = texts
            .into_iter()
            .map(|text| {
                DnsRecord::new(&query.qname, 0, RData::Txt(vec![text.to_string()]))
                    .in_class(RecordClass::CH)
            })
            .collect();

        debug!(domain = %query.qname, answers = response.answers.len(), "Chaos answer");
        let rcode = response.rcode();
        writer.write(response);
        Ok(next.answered(rcode))
    }
}
