//! Scope Resolution Module
//!
//! Chooses which store serves a call: the computation's single global store,
//! or a per-owner store keyed by the call's first positional argument.
//!
//! Per-owner stores live in an explicit side-table (owner identity to store)
//! rather than being attached to owner objects dynamically; an owner's store
//! is released through [`ScopeResolver::release_owner`]. Distinct owners
//! never share cached entries but all contribute to the computation's one
//! shared [`crate::cache::StatsCounter`].

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::cache::key::{ArgValue, CallArgs, KeyAtom};
use crate::cache::size::EstimateSize;
use crate::cache::store::MemoStore;
use crate::config::{Scope, StoreConfig};
use crate::error::{MemoError, Result};

// == Shared Store ==
/// A store shared between callers. The mutex makes structural mutation safe
/// even when serialization is off; only semantic races remain unguarded.
pub type SharedStore<V> = Arc<Mutex<MemoStore<V>>>;

// == Scope Resolver ==
/// Resolves a call to the store that should serve it.
pub struct ScopeResolver<V> {
    /// Configured placement
    scope: Scope,
    /// Configuration cloned into every store this computation owns
    config: StoreConfig,
    /// The single shared store serving Global scope
    global: SharedStore<V>,
    /// Owner identity -> store side-table (PerOwner scope only)
    owners: RwLock<HashMap<KeyAtom, SharedStore<V>>>,
}

impl<V> ScopeResolver<V>
where
    V: Clone + EstimateSize,
{
    // == Constructor ==
    /// Creates a resolver. The global store is created up front; per-owner
    /// stores are created lazily on first use.
    pub fn new(scope: Scope, config: StoreConfig) -> Self {
        Self {
            scope,
            global: Arc::new(Mutex::new(MemoStore::new(config.clone()))),
            config,
            owners: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the global store handle when this computation is globally
    /// scoped (the handle the registry clears on `clear_all`). Per-owner
    /// stores belong to their owners and are deliberately not exposed here.
    pub fn global_store(&self) -> Option<SharedStore<V>> {
        match self.scope {
            Scope::Global => Some(Arc::clone(&self.global)),
            Scope::PerOwner => None,
        }
    }

    // == Resolve ==
    /// Returns the store serving this call.
    ///
    /// # Errors
    /// - [`MemoError::MissingOwnerArgument`] under [`Scope::PerOwner`] when
    ///   the call carries no positional arguments
    /// - [`MemoError::UnhashableArgument`] when the owner argument cannot
    ///   identify a store
    pub fn resolve(&self, args: &CallArgs) -> Result<SharedStore<V>> {
        match self.scope {
            Scope::Global => Ok(Arc::clone(&self.global)),
            Scope::PerOwner => {
                let owner = args.owner().ok_or_else(|| {
                    MemoError::MissingOwnerArgument(
                        "per-owner scope requires at least one positional argument".to_string(),
                    )
                })?;
                let owner_id = KeyAtom::from_arg(owner, "owner argument")?;

                if let Some(store) = self.owners.read().get(&owner_id) {
                    return Ok(Arc::clone(store));
                }

                let mut owners = self.owners.write();
                // A racing caller may have created the store between locks
                let store = owners.entry(owner_id).or_insert_with(|| {
                    debug!(name = %self.config.name, "created per-owner store");
                    Arc::new(Mutex::new(MemoStore::new(self.config.clone())))
                });
                Ok(Arc::clone(store))
            }
        }
    }

    // == Release Owner ==
    /// Drops an owner's store from the side-table, releasing its entries.
    ///
    /// Returns true if the owner had a store.
    pub fn release_owner(&self, owner: &ArgValue) -> Result<bool> {
        let owner_id = KeyAtom::from_arg(owner, "owner argument")?;
        Ok(self.owners.write().remove(&owner_id).is_some())
    }

    // == Clear ==
    /// Clears every store this computation owns (global and per-owner).
    pub fn clear(&self) {
        self.global.lock().clear();
        for store in self.owners.read().values() {
            store.lock().clear();
        }
    }

    /// Number of per-owner stores currently alive.
    pub fn owner_count(&self) -> usize {
        self.owners.read().len()
    }
}
