use ferrous_chain_domain::{RecordClass, RecordType};
use hickory_proto::rr::{DNSClass, RecordType as HickoryRecordType};

/// Conversions between the domain's type/class codes and hickory's.
///
/// Both sides agree on the IANA numbers, so every conversion goes through
/// the numeric code and unknown values survive the trip unchanged.
pub struct RecordTypeMapper;

impl RecordTypeMapper {
    #[inline]
    pub fn to_hickory(record_type: RecordType) -> HickoryRecordType {
        HickoryRecordType::from(record_type.to_u16())
    }

    #[inline]
    pub fn from_hickory(hickory_type: HickoryRecordType) -> RecordType {
        RecordType::from(u16::from(hickory_type))
    }

    #[inline]
    pub fn class_to_hickory(class: RecordClass) -> DNSClass {
        DNSClass::from(class.to_u16())
    }

    #[inline]
    pub fn class_from_hickory(class: DNSClass) -> RecordClass {
        RecordClass::from(u16::from(class))
    }
}
