//! Ferrous Chain Infrastructure Layer
//!
//! Concrete middleware stages, the response cache, the wire codec and the
//! upstream transports behind the application ports.

pub mod dns;
