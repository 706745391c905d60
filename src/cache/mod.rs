//! Cache Module
//!
//! Provides in-memory caching with TTL expiration, LRU/FIFO eviction and
//! approximate memory accounting.

mod entry;
mod eviction;
mod pattern;
mod size;
mod stats;
mod store;


// Re-export public types
pub use entry::{ttl_from_millis, CacheEntry};
pub use eviction::{EvictionPolicy, EvictionTracker};
pub use pattern::GlobPattern;
pub use size::{
    utf16_bytes, FixedSizeEstimator, JsonSizeEstimator, SizeEstimator, ENTRY_OVERHEAD_BYTES,
    UNESTIMABLE_VALUE_BYTES,
};
pub use stats::{CacheStats, StatsSnapshot};
pub use store::CacheStore;
