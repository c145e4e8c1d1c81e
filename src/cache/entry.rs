//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use chrono::{DateTime, Utc};

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
///
/// Owned exclusively by the store that holds it; dropped on eviction,
/// expiration discovery, or explicit clear.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Write timestamp
    pub stored_at: DateTime<Utc>,
    /// Expiration timestamp, None = no expiration
    pub expires_at: Option<DateTime<Utc>>,
    /// Byte estimate captured at write time; fixed for the entry's lifetime
    /// so the store's aggregate size accounting stays exact
    pub weight: usize,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `expires_at` - Optional absolute expiration instant
    /// * `weight` - Byte estimate for the value at write time
    pub fn new(value: V, expires_at: Option<DateTime<Utc>>, weight: usize) -> Self {
        Self {
            value,
            stored_at: Utc::now(),
            expires_at,
            weight,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is expired once the current time is
    /// greater than or equal to the expiration time.
    ///
    /// # Returns
    /// - `true` if the entry has an expiration and it has been reached
    /// - `false` if the entry has no expiration or it lies in the future
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => Utc::now() >= expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, or None if no expiration is set.
    ///
    /// Useful for debugging and introspection.
    ///
    /// # Returns
    /// - `Some(0)` if the entry has expired
    /// - `Some(remaining_ms)` if the entry has an expiration in the future
    /// - `None` if the entry never expires
    pub fn ttl_remaining_ms(&self) -> Option<i64> {
        self.expires_at.map(|expires| {
            let remaining = (expires - Utc::now()).num_milliseconds();
            remaining.max(0)
        })
    }
}
