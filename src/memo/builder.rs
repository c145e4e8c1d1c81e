//! Memo Builder Module
//!
//! Construction-time configuration surface for a memoized computation.
//!
//! Options may be set through typed methods or through the dynamic
//! `option(name, value)` path; everything is validated eagerly when
//! [`MemoBuilder::try_build`] runs, and unrecognized options fail the build
//! with [`MemoError::InvalidConfiguration`] rather than being ignored.

use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::cache::key::{ArgValue, CallArgs};
use crate::cache::size::EstimateSize;
use crate::cache::stats::StatsCounter;
use crate::config::{MemoConfig, Scope, TtlFn};
use crate::error::Result;
use crate::memo::scope::ScopeResolver;
use crate::memo::wrapper::Memoized;
use crate::registry::Registry;

// == Memo Builder ==
/// Builder for a [`Memoized`] computation.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use memocache::{CallArgs, MemoBuilder, Registry};
///
/// let registry = Arc::new(Registry::new());
/// let double = MemoBuilder::new("double")
///     .max_entries(100)
///     .try_build(&registry, |args: &CallArgs| {
///         let n = match args.positional().first() {
///             Some(memocache::ArgValue::Int(n)) => *n,
///             _ => anyhow::bail!("expected an integer"),
///         };
///         Ok(Some(n * 2))
///     })
///     .unwrap();
///
/// let args = CallArgs::new().pos(21);
/// assert_eq!(double.call(&args).unwrap(), Some(42));
/// ```
#[derive(Debug)]
pub struct MemoBuilder {
    /// Computation name; identifies the stats counter in the registry
    name: String,
    /// Typed configuration assembled so far
    config: MemoConfig,
    /// Dynamic options, applied and validated at build time
    pending: Vec<(String, ArgValue)>,
}

impl MemoBuilder {
    // == Constructor ==
    /// Starts a builder for the named computation.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: MemoConfig::new(),
            pending: Vec::new(),
        }
    }

    // == Typed Options ==
    /// Sets cache placement.
    pub fn scope(mut self, scope: Scope) -> Self {
        self.config.scope = Some(scope);
        self
    }

    /// Shorthand for `scope(Scope::PerOwner)`: cache to the first positional
    /// argument (generally the owning instance) instead of globally.
    pub fn per_owner(self) -> Self {
        self.scope(Scope::PerOwner)
    }

    /// Capacity bound; entries beyond it are evicted oldest-write-first.
    /// Zero means unbounded.
    pub fn max_entries(mut self, n: usize) -> Self {
        self.config.max_entries = n;
        self
    }

    /// Byte bound over estimated value sizes; zero means unbounded.
    pub fn max_bytes(mut self, n: usize) -> Self {
        self.config.max_bytes = n;
        self
    }

    /// Expiration stamping function, invoked once per write to produce the
    /// entry's absolute expiry instant.
    pub fn ttl(mut self, f: TtlFn) -> Self {
        self.config.ttl_fn = Some(f);
        self
    }

    /// Convenience: expire entries a fixed duration after each write.
    pub fn ttl_after(self, duration: Duration) -> Self {
        self.ttl(Arc::new(move || Utc::now() + duration))
    }

    /// Do not store "absent" results. Later calls for the same key will
    /// recompute.
    pub fn ignore_nulls(mut self, yes: bool) -> Self {
        self.config.ignore_nulls = yes;
        self
    }

    /// Include sorted named arguments in the cache key (on by default);
    /// disabling it keys on positional arguments alone.
    pub fn include_named_args(mut self, yes: bool) -> Self {
        self.config.include_named_args = yes;
        self
    }

    /// Serialize the whole get-or-compute sequence per store (single-flight).
    pub fn serialize(mut self, yes: bool) -> Self {
        self.config.serialize = yes;
        self
    }

    // == Dynamic Options ==
    /// Queues a dynamically-named option. Validation happens at build time;
    /// unknown names or ill-typed values fail `try_build`.
    pub fn option(mut self, name: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.pending.push((name.into(), value.into()));
        self
    }

    // == Build ==
    /// Validates the configuration, registers the computation, and produces
    /// the memoizing wrapper.
    ///
    /// Registration gives the computation its process-wide stats counter
    /// (same name, same counter) and, under global scope, makes its store
    /// reachable from [`Registry::clear_all`].
    ///
    /// # Errors
    /// [`MemoError::InvalidConfiguration`] when a queued dynamic option is
    /// unrecognized, ill-typed, or out of range.
    ///
    /// [`MemoError::InvalidConfiguration`]: crate::MemoError::InvalidConfiguration
    pub fn try_build<V, F>(mut self, registry: &Arc<Registry>, func: F) -> Result<Memoized<V, F>>
    where
        V: Clone + EstimateSize + Send + 'static,
        F: Fn(&CallArgs) -> anyhow::Result<Option<V>>,
    {
        for (name, value) in self.pending.drain(..) {
            self.config.apply_option(&name, value)?;
        }

        let stats: Arc<StatsCounter> = registry.register(&self.name);
        let resolver = ScopeResolver::new(
            self.config.effective_scope(),
            self.config.store_config(&self.name),
        );
        if let Some(global) = resolver.global_store() {
            registry.register_store(&self.name, global);
        }

        Ok(Memoized::new(self.name, self.config, resolver, stats, func))
    }
}
