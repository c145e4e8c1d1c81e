//! Write Order Module
//!
//! Tracks insertion order for write-recency eviction.
//!
//! Eviction candidates are the oldest-written keys, not the oldest-read:
//! a read never reorders entries. Re-writing an existing key moves it to
//! the most-recently-written position.

use std::collections::VecDeque;

use crate::cache::key::CacheKey;

// == Write Order Tracker ==
/// Tracks keys by write recency.
///
/// Keys are stored in a VecDeque where:
/// - Front = Oldest write
/// - Back = Most recent write
#[derive(Debug, Default)]
pub struct WriteOrderTracker {
    /// Keys ordered by write time
    order: VecDeque<CacheKey>,
}

impl WriteOrderTracker {
    // == Constructor ==
    /// Creates a new empty tracker.
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    // == Record Write ==
    /// Marks a key as most recently written.
    ///
    /// If the key is already tracked, it is removed first and re-appended.
    pub fn record_write(&mut self, key: &CacheKey) {
        self.remove(key);
        self.order.push_back(key.clone());
    }

    // == Remove ==
    /// Removes a key from the tracker.
    pub fn remove(&mut self, key: &CacheKey) {
        self.order.retain(|k| k != key);
    }

    // == Pop Oldest ==
    /// Returns and removes the oldest-written key.
    ///
    /// Returns None if the tracker is empty.
    pub fn pop_oldest(&mut self) -> Option<CacheKey> {
        self.order.pop_front()
    }

    // == Peek Oldest ==
    /// Returns the oldest-written key without removing it.
    pub fn peek_oldest(&self) -> Option<&CacheKey> {
        self.order.front()
    }

    // == Length ==
    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    // == Clear ==
    /// Forgets all tracked keys.
    pub fn clear(&mut self) {
        self.order.clear();
    }
}
