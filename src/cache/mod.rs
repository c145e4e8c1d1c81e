//! Cache Module
//!
//! The cache engine: key construction, size estimation, entry lifecycle,
//! insertion-ordered storage with composable eviction policies, and
//! per-computation statistics.

pub mod entry;
pub mod key;
pub mod size;
pub mod stats;
pub mod store;
pub mod write_order;


// Re-export public types
pub use entry::CacheEntry;
pub use key::{build_key, ArgValue, CacheKey, CallArgs, KeyAtom};
pub use size::EstimateSize;
pub use stats::{StatsCounter, StatsSnapshot};
pub use store::MemoStore;
pub use write_order::WriteOrderTracker;
