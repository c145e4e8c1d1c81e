//! Memoizing Wrapper Module
//!
//! The externally visible entry point: wraps an arbitrary computation and
//! transparently caches its results.
//!
//! One call flows: resolve the serving store (scope) -> count the call ->
//! build the key -> guarded read (hit returns the stored value) -> on miss,
//! count the miss, run the computation, store the result, return it.
//! Computation failures propagate unchanged and are never cached.

use std::sync::Arc;

use tracing::trace;

use crate::cache::key::{build_key, ArgValue, CallArgs};
use crate::cache::size::EstimateSize;
use crate::cache::stats::{StatsCounter, StatsSnapshot};
use crate::config::MemoConfig;
use crate::error::Result;
use crate::memo::guard::StoreGuard;
use crate::memo::scope::ScopeResolver;

// == Memoized ==
/// A memoized computation.
///
/// Behaviorally transparent to the wrapped computation's own contract except
/// for the caching side effects configured at build time. Shared freely
/// across threads (wrap in an `Arc`); without the `serialize` option,
/// concurrent calls may duplicate computation but never corrupt the store.
pub struct Memoized<V, F> {
    /// Computation name (stats identity in the registry)
    name: String,
    /// Build-time configuration
    config: MemoConfig,
    /// Store placement
    scope: ScopeResolver<V>,
    /// Shared process-wide counter for this computation
    stats: Arc<StatsCounter>,
    /// The wrapped computation
    func: F,
}

impl<V, F> Memoized<V, F>
where
    V: Clone + EstimateSize,
    F: Fn(&CallArgs) -> anyhow::Result<Option<V>>,
{
    // == Constructor ==
    /// Assembled by [`crate::MemoBuilder::try_build`].
    pub(crate) fn new(
        name: String,
        config: MemoConfig,
        scope: ScopeResolver<V>,
        stats: Arc<StatsCounter>,
        func: F,
    ) -> Self {
        Self {
            name,
            config,
            scope,
            stats,
            func,
        }
    }

    // == Call ==
    /// Invokes the memoized computation.
    ///
    /// Returns the cached value on a hit; on a miss (including a miss by
    /// expiration) runs the wrapped computation, stores the successful
    /// result subject to the eviction policies, and returns it.
    ///
    /// # Errors
    /// - [`MemoError::MissingOwnerArgument`] under per-owner scope with no
    ///   positional arguments
    /// - [`MemoError::UnhashableArgument`] when an argument cannot form part
    ///   of the key; the computation is never invoked
    /// - [`MemoError::Computation`] carrying the computation's own failure,
    ///   propagated unchanged and never cached
    ///
    /// [`MemoError::MissingOwnerArgument`]: crate::MemoError::MissingOwnerArgument
    /// [`MemoError::UnhashableArgument`]: crate::MemoError::UnhashableArgument
    /// [`MemoError::Computation`]: crate::MemoError::Computation
    pub fn call(&self, args: &CallArgs) -> Result<Option<V>> {
        let store = self.scope.resolve(args)?;
        self.stats.record_call();
        let key = build_key(args, self.config.include_named_args)?;

        let mut guard = StoreGuard::acquire(&store, self.config.serialize);
        if let Some(value) = guard.get(&key) {
            trace!(name = %self.name, "cache hit");
            return Ok(value);
        }

        // Miss: run the computation under whatever exclusivity the guard
        // holds. A failure propagates here without touching the store.
        self.stats.record_miss();
        trace!(name = %self.name, "cache miss, computing");
        let value = (self.func)(args)?;
        guard.put(key, value.clone());
        Ok(value)
    }

    // == Name ==
    /// The computation's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    // == Stats ==
    /// Point-in-time statistics for this computation (shared across all of
    /// its stores, including per-owner ones).
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    // == Clear ==
    /// Clears every store this computation owns. Statistics are untouched.
    pub fn clear(&self) {
        self.scope.clear();
    }

    // == Clear Owner ==
    /// Releases one owner's store under per-owner scope.
    ///
    /// Returns true if the owner had a store.
    pub fn clear_owner(&self, owner: &ArgValue) -> Result<bool> {
        self.scope.release_owner(owner)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MemoError;
    use crate::registry::Registry;
    use crate::MemoBuilder;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn registry() -> Arc<Registry> {
        Arc::new(Registry::new())
    }

    /// Computation that counts its own executions.
    fn counting_fn(
        executions: Arc<AtomicU64>,
    ) -> impl Fn(&CallArgs) -> anyhow::Result<Option<u64>> {
        move |args: &CallArgs| {
            executions.fetch_add(1, Ordering::SeqCst);
            match args.positional().first() {
                Some(ArgValue::Int(n)) => Ok(Some(*n as u64 * 10)),
                _ => Ok(None),
            }
        }
    }

    #[test]
    fn test_call_computes_once_per_key() {
        let registry = registry();
        let executions = Arc::new(AtomicU64::new(0));
        let memo = MemoBuilder::new("f")
            .try_build(&registry, counting_fn(Arc::clone(&executions)))
            .unwrap();

        let args = CallArgs::new().pos(4);
        assert_eq!(memo.call(&args).unwrap(), Some(40));
        assert_eq!(memo.call(&args).unwrap(), Some(40));
        assert_eq!(memo.call(&args).unwrap(), Some(40));

        assert_eq!(executions.load(Ordering::SeqCst), 1);
        let stats = memo.stats();
        assert_eq!(stats.calls, 3);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 2);
    }

    #[test]
    fn test_call_distinct_keys_compute_separately() {
        let registry = registry();
        let executions = Arc::new(AtomicU64::new(0));
        let memo = MemoBuilder::new("f")
            .try_build(&registry, counting_fn(Arc::clone(&executions)))
            .unwrap();

        assert_eq!(memo.call(&CallArgs::new().pos(1)).unwrap(), Some(10));
        assert_eq!(memo.call(&CallArgs::new().pos(2)).unwrap(), Some(20));

        assert_eq!(executions.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_call_named_arg_order_shares_entry() {
        let registry = registry();
        let executions = Arc::new(AtomicU64::new(0));
        let memo = MemoBuilder::new("f")
            .try_build(&registry, counting_fn(Arc::clone(&executions)))
            .unwrap();

        let a = CallArgs::new().pos(1).named("x", 1).named("y", 2);
        let b = CallArgs::new().pos(1).named("y", 2).named("x", 1);

        memo.call(&a).unwrap();
        memo.call(&b).unwrap();

        assert_eq!(executions.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_call_named_args_excluded_from_key() {
        let registry = registry();
        let executions = Arc::new(AtomicU64::new(0));
        let memo = MemoBuilder::new("f")
            .include_named_args(false)
            .try_build(&registry, counting_fn(Arc::clone(&executions)))
            .unwrap();

        memo.call(&CallArgs::new().pos(1).named("a", 1)).unwrap();
        memo.call(&CallArgs::new().pos(1).named("b", 2)).unwrap();

        // Same positional tuple, named args ignored: one computation
        assert_eq!(executions.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_call_unhashable_argument_never_computes() {
        let registry = registry();
        let executions = Arc::new(AtomicU64::new(0));
        let memo = MemoBuilder::new("f")
            .try_build(&registry, counting_fn(Arc::clone(&executions)))
            .unwrap();

        let result = memo.call(&CallArgs::new().pos(1.5));
        assert!(matches!(result, Err(MemoError::UnhashableArgument(_))));
        assert_eq!(executions.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_call_computation_error_propagates_and_is_not_cached() {
        let registry = registry();
        let executions = Arc::new(AtomicU64::new(0));
        let memo = {
            let executions = Arc::clone(&executions);
            MemoBuilder::new("f")
                .try_build(&registry, move |_: &CallArgs| -> anyhow::Result<Option<u64>> {
                    executions.fetch_add(1, Ordering::SeqCst);
                    anyhow::bail!("flaky dependency")
                })
                .unwrap()
        };

        let args = CallArgs::new().pos(1);
        assert!(matches!(memo.call(&args), Err(MemoError::Computation(_))));

        // Failures are not cached: the next call executes again
        assert!(memo.call(&args).is_err());
        assert_eq!(executions.load(Ordering::SeqCst), 2);
        assert_eq!(memo.stats().misses, 2);
    }

    #[test]
    fn test_call_null_result_cached_by_default() {
        let registry = registry();
        let executions = Arc::new(AtomicU64::new(0));
        let memo = memo_returning_none(&registry, Arc::clone(&executions), false);

        assert_eq!(memo.call(&CallArgs::new().pos(1)).unwrap(), None);
        assert_eq!(memo.call(&CallArgs::new().pos(1)).unwrap(), None);

        // The absent result was stored; only one execution
        assert_eq!(executions.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_call_null_result_suppressed_recomputes() {
        let registry = registry();
        let executions = Arc::new(AtomicU64::new(0));
        let memo = memo_returning_none(&registry, Arc::clone(&executions), true);

        assert_eq!(memo.call(&CallArgs::new().pos(1)).unwrap(), None);
        assert_eq!(memo.call(&CallArgs::new().pos(1)).unwrap(), None);

        // Nothing stored, every call recomputes and counts as a miss
        assert_eq!(executions.load(Ordering::SeqCst), 2);
        assert_eq!(memo.stats().misses, 2);
    }

    fn memo_returning_none(
        registry: &Arc<Registry>,
        executions: Arc<AtomicU64>,
        ignore_nulls: bool,
    ) -> Memoized<u64, impl Fn(&CallArgs) -> anyhow::Result<Option<u64>>> {
        MemoBuilder::new("f")
            .ignore_nulls(ignore_nulls)
            .try_build(registry, move |_: &CallArgs| {
                executions.fetch_add(1, Ordering::SeqCst);
                Ok(None)
            })
            .unwrap()
    }

    #[test]
    fn test_call_ttl_expiry_recomputes() {
        use chrono::Duration;
        use std::thread::sleep;

        let registry = registry();
        let executions = Arc::new(AtomicU64::new(0));
        let memo = MemoBuilder::new("f")
            .ttl_after(Duration::milliseconds(30))
            .try_build(&registry, counting_fn(Arc::clone(&executions)))
            .unwrap();

        let args = CallArgs::new().pos(1);
        memo.call(&args).unwrap();
        memo.call(&args).unwrap(); // hit before expiry
        assert_eq!(executions.load(Ordering::SeqCst), 1);

        sleep(std::time::Duration::from_millis(50));

        // Expired read behaves exactly like an absent key
        memo.call(&args).unwrap();
        assert_eq!(executions.load(Ordering::SeqCst), 2);

        let stats = memo.stats();
        assert_eq!(stats.calls, 3);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.hits, 1);
    }

    #[test]
    fn test_call_per_owner_isolation_shared_stats() {
        let registry = registry();
        let executions = Arc::new(AtomicU64::new(0));
        let memo = {
            let executions = Arc::clone(&executions);
            MemoBuilder::new("method")
                .per_owner()
                .try_build(&registry, move |args: &CallArgs| {
                    executions.fetch_add(1, Ordering::SeqCst);
                    match args.positional().get(1) {
                        Some(ArgValue::Int(n)) => Ok(Some(*n as u64)),
                        _ => Ok(None),
                    }
                })
                .unwrap()
        };

        // Identical non-owner arguments, two distinct owners
        memo.call(&CallArgs::new().pos("owner-a").pos(7)).unwrap();
        memo.call(&CallArgs::new().pos("owner-b").pos(7)).unwrap();
        memo.call(&CallArgs::new().pos("owner-a").pos(7)).unwrap();

        // Each owner computed once; the single counter sums both
        assert_eq!(executions.load(Ordering::SeqCst), 2);
        let stats = memo.stats();
        assert_eq!(stats.calls, 3);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.hits, 1);
    }

    #[test]
    fn test_call_per_owner_missing_owner() {
        let registry = registry();
        let memo = MemoBuilder::new("method")
            .per_owner()
            .try_build(&registry, |_: &CallArgs| -> anyhow::Result<Option<u64>> {
                Ok(Some(1))
            })
            .unwrap();

        let result = memo.call(&CallArgs::new());
        assert!(matches!(result, Err(MemoError::MissingOwnerArgument(_))));
    }

    #[test]
    fn test_clear_forces_recompute() {
        let registry = registry();
        let executions = Arc::new(AtomicU64::new(0));
        let memo = MemoBuilder::new("f")
            .try_build(&registry, counting_fn(Arc::clone(&executions)))
            .unwrap();

        let args = CallArgs::new().pos(1);
        memo.call(&args).unwrap();
        memo.clear();
        memo.call(&args).unwrap();

        assert_eq!(executions.load(Ordering::SeqCst), 2);
        // Clearing the cache leaves the stats alone
        assert_eq!(memo.stats().calls, 2);
    }

    #[test]
    fn test_clear_owner_releases_one_store() {
        let registry = registry();
        let executions = Arc::new(AtomicU64::new(0));
        let memo = {
            let executions = Arc::clone(&executions);
            MemoBuilder::new("method")
                .per_owner()
                .try_build(&registry, move |_: &CallArgs| {
                    executions.fetch_add(1, Ordering::SeqCst);
                    Ok(Some(1u64))
                })
                .unwrap()
        };

        memo.call(&CallArgs::new().pos("owner-a")).unwrap();
        memo.call(&CallArgs::new().pos("owner-b")).unwrap();

        assert!(memo.clear_owner(&ArgValue::from("owner-a")).unwrap());

        // Owner A recomputes, owner B still hits
        memo.call(&CallArgs::new().pos("owner-a")).unwrap();
        memo.call(&CallArgs::new().pos("owner-b")).unwrap();
        assert_eq!(executions.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_eviction_scenario_through_wrapper() {
        // max_entries = 2; A, B, C then A again
        let registry = registry();
        let executions = Arc::new(AtomicU64::new(0));
        let memo = MemoBuilder::new("f")
            .max_entries(2)
            .try_build(&registry, counting_fn(Arc::clone(&executions)))
            .unwrap();

        memo.call(&CallArgs::new().pos(1)).unwrap(); // A: miss
        memo.call(&CallArgs::new().pos(2)).unwrap(); // B: miss
        memo.call(&CallArgs::new().pos(3)).unwrap(); // C: miss, evicts A
        memo.call(&CallArgs::new().pos(1)).unwrap(); // A: miss again, evicts B
        memo.call(&CallArgs::new().pos(3)).unwrap(); // C: still cached
        memo.call(&CallArgs::new().pos(2)).unwrap(); // B: miss, was evicted

        assert_eq!(executions.load(Ordering::SeqCst), 5);
        let stats = memo.stats();
        assert_eq!(stats.calls, 6);
        assert_eq!(stats.misses, 5);
        assert_eq!(stats.hits, 1);
    }
}
