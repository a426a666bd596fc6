pub mod rdata;
pub mod record;
pub mod record_class;
pub mod record_type;

pub use rdata::{RData, Soa};
pub use record::DnsRecord;
pub use record_class::RecordClass;
pub use record_type::RecordType;
