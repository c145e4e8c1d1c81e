//! Configuration Module
//!
//! Holds the memoization configuration surface and its validation.
//!
//! Options can be set through typed accessors on [`crate::MemoBuilder`] or
//! through the dynamic [`MemoConfig::apply_option`] path, which mirrors a
//! keyword-options surface: unrecognized names or ill-typed values fail with
//! [`MemoError::InvalidConfiguration`] and are never silently ignored.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::cache::key::ArgValue;
use crate::error::{MemoError, Result};

// == TTL Function ==
/// Produces the absolute expiration instant for an entry.
///
/// Invoked once per write (not per read), so the expiry horizon can vary
/// from write to write.
pub type TtlFn = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Builds a [`TtlFn`] that expires entries a fixed duration after each write.
///
/// # Example
/// ```
/// use chrono::Duration;
/// use memocache::config::expire_after;
///
/// let ttl = expire_after(Duration::hours(1));
/// ```
pub fn expire_after(duration: Duration) -> TtlFn {
    Arc::new(move || Utc::now() + duration)
}

// == Scope ==
/// Cache placement for a memoized computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// One store shared by all callers of the computation
    Global,
    /// One store per distinct first-argument owner, created lazily
    PerOwner,
}

// == Memo Config ==
/// Full configuration for one memoized computation.
///
/// Defaults: global scope, unbounded, no expiration, nulls stored, named
/// arguments included in the key, serialization off.
#[derive(Clone)]
pub struct MemoConfig {
    /// Cache placement
    pub scope: Option<Scope>,
    /// Capacity bound; 0 = unbounded
    pub max_entries: usize,
    /// Byte bound; 0 = unbounded
    pub max_bytes: usize,
    /// Expiration stamping function; None = no expiration
    pub ttl_fn: Option<TtlFn>,
    /// Skip storing "absent" results
    pub ignore_nulls: bool,
    /// Include sorted named arguments in the key
    pub include_named_args: bool,
    /// Serialize the full get-or-compute sequence per store
    pub serialize: bool,
}

impl MemoConfig {
    // == Constructor ==
    /// Creates a configuration with default settings.
    pub fn new() -> Self {
        Self {
            scope: None,
            max_entries: 0,
            max_bytes: 0,
            ttl_fn: None,
            ignore_nulls: false,
            include_named_args: true,
            serialize: false,
        }
    }

    /// Effective scope (defaults to [`Scope::Global`]).
    pub fn effective_scope(&self) -> Scope {
        self.scope.unwrap_or(Scope::Global)
    }

    // == Apply Option ==
    /// Applies a dynamically-named option.
    ///
    /// Recognized names: `scope` (`"global"` / `"per_owner"`),
    /// `max_entries`, `max_bytes` (non-negative integers), `ignore_nulls`,
    /// `include_named_args`, `serialize` (booleans). The TTL function has no
    /// dynamic form; use [`crate::MemoBuilder::ttl`].
    ///
    /// # Errors
    /// [`MemoError::InvalidConfiguration`] for an unrecognized name, a
    /// wrong-typed value, or an out-of-range value.
    pub fn apply_option(&mut self, name: &str, value: ArgValue) -> Result<()> {
        match name {
            "scope" => match value {
                ArgValue::Str(s) if s == "global" => self.scope = Some(Scope::Global),
                ArgValue::Str(s) if s == "per_owner" => self.scope = Some(Scope::PerOwner),
                other => {
                    return Err(MemoError::InvalidConfiguration(format!(
                        "option `scope` expects \"global\" or \"per_owner\", got {:?}",
                        other
                    )))
                }
            },
            "max_entries" => self.max_entries = expect_size(name, value)?,
            "max_bytes" => self.max_bytes = expect_size(name, value)?,
            "ignore_nulls" => self.ignore_nulls = expect_bool(name, value)?,
            "include_named_args" => self.include_named_args = expect_bool(name, value)?,
            "serialize" => self.serialize = expect_bool(name, value)?,
            unknown => {
                return Err(MemoError::InvalidConfiguration(format!(
                    "unrecognized option `{}`",
                    unknown
                )))
            }
        }
        Ok(())
    }

    /// Returns the subset of options the store itself needs.
    pub fn store_config(&self, name: &str) -> StoreConfig {
        StoreConfig {
            name: name.to_string(),
            max_entries: self.max_entries,
            max_bytes: self.max_bytes,
            ttl_fn: self.ttl_fn.clone(),
            ignore_nulls: self.ignore_nulls,
        }
    }
}

impl Default for MemoConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoConfig")
            .field("scope", &self.effective_scope())
            .field("max_entries", &self.max_entries)
            .field("max_bytes", &self.max_bytes)
            .field("ttl_fn", &self.ttl_fn.is_some())
            .field("ignore_nulls", &self.ignore_nulls)
            .field("include_named_args", &self.include_named_args)
            .field("serialize", &self.serialize)
            .finish()
    }
}

// == Store Config ==
/// The per-store slice of a [`MemoConfig`].
///
/// Cloned into every store the computation owns, so lazily-created
/// per-owner stores behave identically to the first one.
#[derive(Clone)]
pub struct StoreConfig {
    /// Computation name, for log context
    pub name: String,
    /// Capacity bound; 0 = unbounded
    pub max_entries: usize,
    /// Byte bound; 0 = unbounded
    pub max_bytes: usize,
    /// Expiration stamping function
    pub ttl_fn: Option<TtlFn>,
    /// Skip storing "absent" results
    pub ignore_nulls: bool,
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("name", &self.name)
            .field("max_entries", &self.max_entries)
            .field("max_bytes", &self.max_bytes)
            .field("ttl_fn", &self.ttl_fn.is_some())
            .field("ignore_nulls", &self.ignore_nulls)
            .finish()
    }
}

// == Option Coercion Helpers ==
fn expect_bool(name: &str, value: ArgValue) -> Result<bool> {
    match value {
        ArgValue::Bool(b) => Ok(b),
        other => Err(MemoError::InvalidConfiguration(format!(
            "option `{}` expects a boolean, got {:?}",
            name, other
        ))),
    }
}

fn expect_size(name: &str, value: ArgValue) -> Result<usize> {
    match value {
        ArgValue::Int(i) if i >= 0 => Ok(i as usize),
        other => Err(MemoError::InvalidConfiguration(format!(
            "option `{}` expects a non-negative integer, got {:?}",
            name, other
        ))),
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = MemoConfig::new();

        assert_eq!(config.effective_scope(), Scope::Global);
        assert_eq!(config.max_entries, 0);
        assert_eq!(config.max_bytes, 0);
        assert!(config.ttl_fn.is_none());
        assert!(!config.ignore_nulls);
        assert!(config.include_named_args);
        assert!(!config.serialize);
    }

    #[test]
    fn test_apply_option_recognized() {
        let mut config = MemoConfig::new();

        config
            .apply_option("scope", ArgValue::Str("per_owner".to_string()))
            .unwrap();
        config.apply_option("max_entries", ArgValue::Int(10)).unwrap();
        config.apply_option("max_bytes", ArgValue::Int(4096)).unwrap();
        config.apply_option("ignore_nulls", ArgValue::Bool(true)).unwrap();
        config
            .apply_option("include_named_args", ArgValue::Bool(false))
            .unwrap();
        config.apply_option("serialize", ArgValue::Bool(true)).unwrap();

        assert_eq!(config.effective_scope(), Scope::PerOwner);
        assert_eq!(config.max_entries, 10);
        assert_eq!(config.max_bytes, 4096);
        assert!(config.ignore_nulls);
        assert!(!config.include_named_args);
        assert!(config.serialize);
    }

    #[test]
    fn test_apply_option_unrecognized_name() {
        let mut config = MemoConfig::new();

        let result = config.apply_option("max_sizee", ArgValue::Int(10));
        assert!(matches!(result, Err(MemoError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_apply_option_wrong_type() {
        let mut config = MemoConfig::new();

        let result = config.apply_option("serialize", ArgValue::Int(1));
        assert!(matches!(result, Err(MemoError::InvalidConfiguration(_))));

        let result = config.apply_option("scope", ArgValue::Str("everywhere".to_string()));
        assert!(matches!(result, Err(MemoError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_apply_option_negative_size() {
        let mut config = MemoConfig::new();

        let result = config.apply_option("max_entries", ArgValue::Int(-1));
        assert!(matches!(result, Err(MemoError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_expire_after() {
        let ttl = expire_after(Duration::seconds(30));

        let before = Utc::now();
        let expiry = ttl();
        assert!(expiry > before + Duration::seconds(29));
        assert!(expiry <= Utc::now() + Duration::seconds(30));
    }

    #[test]
    fn test_store_config_carries_name() {
        let mut config = MemoConfig::new();
        config.max_entries = 5;

        let store_config = config.store_config("lookup_user");
        assert_eq!(store_config.name, "lookup_user");
        assert_eq!(store_config.max_entries, 5);
    }
}
