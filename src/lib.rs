//! Memocache - a configurable memoizing cache
//!
//! Wraps an arbitrary computation, keys results by call arguments, and
//! evicts stored results under composable policies: capacity bound, byte
//! bound, time-to-live, and null-suppression. Caches can be scoped globally
//! or per owning instance, statistics are tracked per computation, and the
//! get-or-compute sequence can optionally be fully serialized for
//! single-flight behavior.
//!
//! Expiration is lazy: an expired entry is detected and removed only when
//! read. Eviction order is write recency (oldest write first); reads never
//! reorder entries.

pub mod cache;
pub mod config;
pub mod error;
pub mod memo;
pub mod registry;

pub use cache::{ArgValue, CallArgs, EstimateSize, StatsSnapshot};
pub use config::{expire_after, MemoConfig, Scope, TtlFn};
pub use error::{MemoError, Result};
pub use memo::{MemoBuilder, Memoized};
pub use registry::Registry;
