pub mod compaction;
pub mod entry;
pub mod eviction;
pub mod key;
pub mod stats;
pub mod storage;
pub mod ttl;

pub use entry::{CacheEntry, EntryKind};
pub use eviction::EvictionStrategy;
pub use key::CacheKey;
pub use stats::CacheStats;
pub use storage::{is_cacheable, ResponseCache};
pub use ttl::TtlPolicy;
