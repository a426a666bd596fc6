pub mod dns;
pub mod handler;

pub use dns::start_dns_server;
pub use handler::QueryHandler;
