pub mod zone;

pub use zone::{Zone, ZoneAnswer};
