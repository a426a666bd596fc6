pub mod message_builder;
pub mod record_type_map;
pub mod response_parser;
pub mod upstream;

pub use message_builder::MessageBuilder;
pub use record_type_map::RecordTypeMapper;
pub use response_parser::ResponseParser;
pub use upstream::ForwardingUpstream;
