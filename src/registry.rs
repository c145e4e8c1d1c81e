//! Registry Module
//!
//! Process-wide introspection and bulk clearing for memoized computations.
//!
//! A registry is an explicit handle (`Arc<Registry>`) injected at build
//! time, not ambient global state: tests construct isolated instances and
//! several registries may coexist. It is initialized by the first
//! registration and torn down explicitly via [`Registry::clear_all`] /
//! [`Registry::clear_stats`].
//!
//! The registry holds each computation's shared [`StatsCounter`] and, for
//! globally-scoped computations, a type-erased handle to the store so
//! `clear_all` can reach it. Per-owner stores are never registered; they
//! belong to their owners.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::cache::size::EstimateSize;
use crate::cache::stats::{StatsCounter, StatsSnapshot};
use crate::cache::store::MemoStore;

// == Clearable Store ==
/// Type-erased handle to a store the registry can clear.
pub trait ClearableStore: Send + Sync {
    /// Removes every entry from the store.
    fn clear_store(&self);
}

impl<V> ClearableStore for Mutex<MemoStore<V>>
where
    V: Clone + EstimateSize + Send,
{
    fn clear_store(&self) {
        self.lock().clear();
    }
}

// == Registration ==
/// Everything the registry tracks for one computation.
struct Registration {
    /// Shared call/miss counter
    stats: Arc<StatsCounter>,
    /// Registered (global) stores for this computation
    stores: Vec<Arc<dyn ClearableStore>>,
}

// == Registry ==
/// Process-wide registry of memoized computations.
#[derive(Default)]
pub struct Registry {
    /// Computation name -> registration
    inner: Mutex<HashMap<String, Registration>>,
}

impl Registry {
    // == Constructor ==
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // == Register ==
    /// Registers a computation and returns its shared stats counter.
    ///
    /// Registering the same name again returns the existing counter: the
    /// name is the counter's process-wide identity.
    pub fn register(&self, name: &str) -> Arc<StatsCounter> {
        let mut inner = self.inner.lock();
        let registration = inner.entry(name.to_string()).or_insert_with(|| {
            debug!(name, "registered memoized computation");
            Registration {
                stats: Arc::new(StatsCounter::new()),
                stores: Vec::new(),
            }
        });
        Arc::clone(&registration.stats)
    }

    // == Register Store ==
    /// Attaches a store handle to a registered computation so
    /// [`Registry::clear_all`] can reach it.
    pub fn register_store(&self, name: &str, store: Arc<dyn ClearableStore>) {
        let mut inner = self.inner.lock();
        let registration = inner.entry(name.to_string()).or_insert_with(|| Registration {
            stats: Arc::new(StatsCounter::new()),
            stores: Vec::new(),
        });
        registration.stores.push(store);
    }

    // == Stats Snapshot ==
    /// Point-in-time statistics for one computation, if registered.
    pub fn stats_snapshot(&self, name: &str) -> Option<StatsSnapshot> {
        self.inner.lock().get(name).map(|r| r.stats.snapshot())
    }

    // == All Stats ==
    /// Statistics for every registered computation, sorted by name.
    pub fn all_stats(&self) -> Vec<(String, StatsSnapshot)> {
        let inner = self.inner.lock();
        let mut all: Vec<_> = inner
            .iter()
            .map(|(name, r)| (name.clone(), r.stats.snapshot()))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }

    // == Clear All ==
    /// Clears every registered store. Statistics are retained; clear them
    /// separately with [`Registry::clear_stats`]. Most useful in test
    /// teardowns.
    pub fn clear_all(&self) {
        let inner = self.inner.lock();
        for registration in inner.values() {
            for store in &registration.stores {
                store.clear_store();
            }
        }
        debug!("cleared all registered stores");
    }

    // == Clear Stats ==
    /// Resets every registered computation's counters to zero.
    pub fn clear_stats(&self) {
        let inner = self.inner.lock();
        for registration in inner.values() {
            registration.stats.clear();
        }
    }

    // == Length ==
    /// Number of registered computations.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    // == Is Empty ==
    /// Returns true if nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}
