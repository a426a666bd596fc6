//! Ferrous Chain Application Layer
//!
//! Ports every middleware stage and collaborator implements, plus the
//! services that compose stages into per-zone chains and dispatch requests.
pub mod context;
pub mod ports;
pub mod services;

pub use context::RequestContext;
