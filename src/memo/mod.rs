//! Memoization Module
//!
//! The wrapper around an arbitrary computation: configuration surface,
//! scope resolution, optional call serialization, and the call path itself.

pub mod builder;
pub mod guard;
pub mod scope;
pub mod wrapper;

pub use builder::MemoBuilder;
pub use guard::StoreGuard;
pub use scope::{ScopeResolver, SharedStore};
pub use wrapper::Memoized;
