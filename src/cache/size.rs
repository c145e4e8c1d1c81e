//! Size Estimation Module
//!
//! Approximates the in-memory byte cost of stored values for the byte-bound
//! eviction policy.
//!
//! Estimates are shallow: the value's own footprint plus any directly owned
//! buffer capacity, with no deep traversal. Estimation must be pure and
//! stable (same value, same estimate); the store snapshots the estimate into
//! the entry at write time so aggregate accounting stays exact even if a
//! value's estimate would later change.

use std::mem;
use std::sync::Arc;

// == Estimate Size Trait ==
/// Shallow byte-cost estimate for a cached value.
pub trait EstimateSize {
    /// Returns an approximate number of bytes this value occupies.
    fn estimate_bytes(&self) -> usize;
}

// == Primitive Impls ==
macro_rules! impl_estimate_size_by_value {
    ($($t:ty),* $(,)?) => {
        $(
            impl EstimateSize for $t {
                fn estimate_bytes(&self) -> usize {
                    mem::size_of::<$t>()
                }
            }
        )*
    };
}

impl_estimate_size_by_value!(
    u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64, bool, char, ()
);

// == Container Impls ==
impl EstimateSize for String {
    fn estimate_bytes(&self) -> usize {
        mem::size_of::<String>() + self.capacity()
    }
}

impl<T> EstimateSize for Vec<T> {
    /// Shallow: counts the owned buffer, not the elements' own allocations.
    fn estimate_bytes(&self) -> usize {
        mem::size_of::<Vec<T>>() + self.capacity() * mem::size_of::<T>()
    }
}

impl<T: EstimateSize> EstimateSize for Option<T> {
    fn estimate_bytes(&self) -> usize {
        match self {
            Some(inner) => mem::size_of::<Option<T>>() + inner.estimate_bytes(),
            None => mem::size_of::<Option<T>>(),
        }
    }
}

impl<T: EstimateSize> EstimateSize for Box<T> {
    fn estimate_bytes(&self) -> usize {
        mem::size_of::<Box<T>>() + (**self).estimate_bytes()
    }
}

impl<T> EstimateSize for Arc<T> {
    /// Shared ownership: only the handle is attributed to this entry.
    fn estimate_bytes(&self) -> usize {
        mem::size_of::<Arc<T>>()
    }
}

impl<A: EstimateSize, B: EstimateSize> EstimateSize for (A, B) {
    fn estimate_bytes(&self) -> usize {
        self.0.estimate_bytes() + self.1.estimate_bytes()
    }
}
