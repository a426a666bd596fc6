pub mod chain;
pub mod zone_router;

pub use chain::{Chain, ChainBuilder};
pub use zone_router::{ZoneRouter, DROPPED_ZONE};
