//! Serialization Guard Module
//!
//! Controls how exclusively a call holds its store during get-or-compute.
//!
//! With serialization enabled the guard takes the store mutex once and holds
//! it across the whole sequence: every call sharing the store is totally
//! ordered, and a never-before-seen key is computed exactly once
//! (single-flight), at the cost of zero parallelism for that store. This is
//! a store-wide lock, not a per-key lock.
//!
//! With serialization disabled (the default) the guard locks only for the
//! individual read and write, so structural mutation stays memory-safe but
//! the read-then-compute-then-write sequence is not atomic: concurrent calls
//! racing on the same key may compute the value more than once. That race
//! is documented behavior, preserved on purpose.

use parking_lot::MutexGuard;

use crate::cache::key::CacheKey;
use crate::cache::size::EstimateSize;
use crate::cache::store::MemoStore;
use crate::memo::scope::SharedStore;

// == Store Guard ==
/// Access to a shared store for one get-or-compute sequence.
pub struct StoreGuard<'a, V> {
    /// The store being accessed
    store: &'a SharedStore<V>,
    /// Held for the guard's whole lifetime when serialization is on
    exclusive: Option<MutexGuard<'a, MemoStore<V>>>,
}

impl<'a, V> StoreGuard<'a, V>
where
    V: Clone + EstimateSize,
{
    // == Acquire ==
    /// Acquires access to a store.
    ///
    /// Blocks on the store mutex when `serialize` is true; otherwise returns
    /// immediately and locks per operation.
    pub fn acquire(store: &'a SharedStore<V>, serialize: bool) -> Self {
        let exclusive = if serialize { Some(store.lock()) } else { None };
        Self { store, exclusive }
    }

    // == Get ==
    /// Reads through the guard (lazy TTL check applies).
    pub fn get(&mut self, key: &CacheKey) -> Option<Option<V>> {
        match self.exclusive.as_mut() {
            Some(store) => store.get(key),
            None => self.store.lock().get(key),
        }
    }

    // == Put ==
    /// Writes through the guard (full policy chain applies).
    pub fn put(&mut self, key: CacheKey, value: Option<V>) {
        match self.exclusive.as_mut() {
            Some(store) => store.put(key, value),
            None => self.store.lock().put(key, value),
        }
    }

    /// Whether this guard holds the store exclusively.
    pub fn is_exclusive(&self) -> bool {
        self.exclusive.is_some()
    }
}
