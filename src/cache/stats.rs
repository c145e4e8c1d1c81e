//! Cache Statistics Module
//!
//! Tracks per-computation call and miss counters.
//!
//! One counter exists per memoized computation for the process lifetime,
//! shared by every store of that computation (a per-owner computation has
//! one store per owner but a single counter). Increments are atomic so
//! concurrent callers and per-owner stores can share one counter without
//! coordination.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Stats Counter ==
/// Thread-safe call/miss counter for one memoized computation.
///
/// Hits are derived as `calls - misses`, never stored independently.
#[derive(Debug, Default)]
pub struct StatsCounter {
    /// Total invocations of the memoized wrapper
    calls: AtomicU64,
    /// Invocations that executed the wrapped computation's body
    misses: AtomicU64,
}

impl StatsCounter {
    // == Constructor ==
    /// Creates a new counter with both counts at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Record Call ==
    /// Increments the call counter. Called exactly once per wrapper
    /// invocation, hit or miss.
    pub fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::Relaxed);
    }

    // == Record Miss ==
    /// Increments the miss counter. Called exactly once per execution of
    /// the wrapped computation's body, never on a cache hit, and always
    /// paired with a `record_call` on the same invocation.
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    // == Snapshot ==
    /// Returns a point-in-time copy of the counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        let calls = self.calls.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);

        StatsSnapshot {
            calls,
            // Saturating: hits must never go negative even if the two loads
            // race with concurrent increments
            hits: calls.saturating_sub(misses),
            misses,
        }
    }

    // == Clear ==
    /// Resets both counters to zero. Independent of any store clearing.
    pub fn clear(&self) {
        self.calls.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}

// == Stats Snapshot ==
/// Point-in-time statistics for one memoized computation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Total invocations
    pub calls: u64,
    /// Invocations served from the cache
    pub hits: u64,
    /// Invocations that executed the computation
    pub misses: u64,
}

impl StatsSnapshot {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / calls, or 0.0 if no calls have been made.
    pub fn hit_rate(&self) -> f64 {
        if self.calls == 0 {
            0.0
        } else {
            self.hits as f64 / self.calls as f64
        }
    }
}
