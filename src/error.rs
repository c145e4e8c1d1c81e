//! Error types for the memoizing cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Memo Error Enum ==
/// Unified error type for the memoizing cache.
#[derive(Error, Debug)]
pub enum MemoError {
    /// Unrecognized or contradictory configuration option at wrap-construction time
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A call argument cannot form part of a cache key
    #[error("Unhashable argument: {0}")]
    UnhashableArgument(String),

    /// PerOwner scope requested but the call carried no positional arguments
    #[error("Missing owner argument: {0}")]
    MissingOwnerArgument(String),

    /// Failure raised by the wrapped computation itself; propagated unchanged,
    /// never cached and never retried
    #[error(transparent)]
    Computation(#[from] anyhow::Error),
}

// == Result Type Alias ==
/// Convenience Result type for the memoizing cache.
pub type Result<T> = std::result::Result<T, MemoError>;
