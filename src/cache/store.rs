//! Memo Store Module
//!
//! The cache engine: an insertion-ordered key-to-entry mapping that applies
//! the eviction policy chain on write and the lazy TTL check on read.
//!
//! Stored values are `Option<V>`: `None` is the "absent" sentinel consumed
//! by the null-suppression policy. The policy chain on every `put`:
//!
//! 1. Remove any prior entry for the key (write-recency; happens even when
//!    null-suppression then skips the insert).
//! 2. Null-suppression: if enabled and the value is absent, stop.
//! 3. TTL stamping: invoke the configured TTL function, per write.
//! 4. Insert at the most-recently-written position, add the entry's weight.
//! 5. Bound enforcement: evict oldest-by-write-order while over the byte
//!    bound, then while over the capacity bound.
//!
//! Reads never reorder entries; expiration is checked only on read.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::cache::entry::CacheEntry;
use crate::cache::key::CacheKey;
use crate::cache::size::EstimateSize;
use crate::cache::write_order::WriteOrderTracker;
use crate::config::StoreConfig;

// == Memo Store ==
/// Insertion-ordered cache storage with composable eviction policies.
#[derive(Debug)]
pub struct MemoStore<V> {
    /// Key-entry storage
    entries: HashMap<CacheKey, CacheEntry<Option<V>>>,
    /// Write-recency tracker (oldest at front)
    write_order: WriteOrderTracker,
    /// Sum of live entry weights
    current_bytes: usize,
    /// Store configuration (bounds, TTL stamping, null handling)
    config: StoreConfig,
}

impl<V> MemoStore<V>
where
    V: Clone + EstimateSize,
{
    // == Constructor ==
    /// Creates an empty store with the given configuration.
    pub fn new(config: StoreConfig) -> Self {
        Self {
            entries: HashMap::new(),
            write_order: WriteOrderTracker::new(),
            current_bytes: 0,
            config,
        }
    }

    // == Get ==
    /// Retrieves the stored value for a key.
    ///
    /// Applies the lazy TTL check: an expired entry is deleted and the read
    /// reports a miss, indistinguishable from a never-cached key. Reads do
    /// not reorder entries.
    ///
    /// # Returns
    /// - `Some(value)` when a live entry exists (the value may itself be the
    ///   stored absent sentinel `None` if null-suppression is off)
    /// - `None` when the key is absent or its entry just expired
    pub fn get(&mut self, key: &CacheKey) -> Option<Option<V>> {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => return None,
        };

        if expired {
            self.remove_entry(key);
            debug!(name = %self.config.name, "expired entry removed on read");
            return None;
        }

        self.entries.get(key).map(|entry| entry.value.clone())
    }

    // == Put ==
    /// Stores a value under a key, applying the full policy chain.
    pub fn put(&mut self, key: CacheKey, value: Option<V>) {
        // 1. Write-recency: drop any prior entry for this key first. This
        //    happens even when null-suppression skips the insert below, so
        //    a null result leaves the key uncached.
        self.remove_entry(&key);

        // 2. Null-suppression
        if self.config.ignore_nulls && value.is_none() {
            trace!(name = %self.config.name, "null result suppressed");
            return;
        }

        // 3. TTL stamping, invoked per write
        let expires_at = self.config.ttl_fn.as_ref().map(|f| f());

        // 4. Insert as the most recent write
        let weight = value.estimate_bytes();
        self.entries
            .insert(key.clone(), CacheEntry::new(value, expires_at, weight));
        self.write_order.record_write(&key);
        self.current_bytes += weight;

        // 5. Bound enforcement, oldest-by-write-order first
        if self.config.max_bytes > 0 {
            while !self.entries.is_empty() && self.current_bytes > self.config.max_bytes {
                self.evict_oldest();
            }
        }
        if self.config.max_entries > 0 {
            while self.entries.len() > self.config.max_entries {
                self.evict_oldest();
            }
        }
    }

    // == Clear ==
    /// Removes all entries and resets the byte accounting. Always succeeds.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.write_order.clear();
        self.current_bytes = 0;
        debug!(name = %self.config.name, "store cleared");
    }

    // == Length ==
    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Current Bytes ==
    /// Returns the aggregate weight of all live entries.
    pub fn current_bytes(&self) -> usize {
        self.current_bytes
    }

    // == Contains Key ==
    /// Returns true if a (possibly expired) entry exists for the key.
    pub fn contains_key(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    // == Internal Helpers ==
    /// Removes one entry, keeping the write order and byte accounting in sync.
    fn remove_entry(&mut self, key: &CacheKey) {
        if let Some(entry) = self.entries.remove(key) {
            self.write_order.remove(key);
            self.current_bytes -= entry.weight;
        }
    }

    /// Evicts the oldest-written entry.
    fn evict_oldest(&mut self) {
        if let Some(oldest) = self.write_order.pop_oldest() {
            if let Some(entry) = self.entries.remove(&oldest) {
                self.current_bytes -= entry.weight;
                debug!(
                    name = %self.config.name,
                    remaining = self.entries.len(),
                    "evicted oldest entry"
                );
            }
        }
    }
}
