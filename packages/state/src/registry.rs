//! The scope registry: process-wide table of named scopes and stores.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;

use scopestack_persist::{
    Clock, MemoryStore, PersistError, SharedSnapshots, SnapshotStore, StoreKey, SystemClock,
};

use crate::config::StoreConfig;
use crate::error::StateError;
use crate::handle::StoreHandle;
use crate::store::StoreCell;

type ScopeTable = BTreeMap<String, BTreeMap<String, Arc<StoreCell>>>;

/// Owner of every scoped store in the process.
///
/// The registry is an explicitly constructed object, not a global: the
/// hook layer receives it by reference, and tests construct an isolated
/// registry per case.
///
/// Registration and disposal are serialized by the registry lock, so two
/// components mounting the same `(scope, name)` in the same tick receive
/// the same store, never duplicates.
///
/// # Example
///
/// ```rust
/// use scopestack_state::{ScopeRegistry, StoreConfig};
/// use serde_json::json;
///
/// let registry = ScopeRegistry::in_memory();
/// let handle = registry
///     .register(
///         "signup_flow",
///         "signup",
///         StoreConfig::new(json!({"email": ""}))
///             .method("set_email", |mut state, args| {
///                 if let (Some(obj), Some(email)) = (state.as_object_mut(), args.first()) {
///                     obj.insert("email".to_string(), email.clone());
///                 }
///                 state
///             }),
///     )
///     .unwrap();
///
/// handle.mutate("set_email", &[json!("ada@example.com")]).unwrap();
/// assert_eq!(handle.state()["email"], json!("ada@example.com"));
/// ```
pub struct ScopeRegistry {
    inner: Arc<RegistryInner>,
}

pub(crate) struct RegistryInner {
    scopes: Mutex<ScopeTable>,
    persistence: SharedSnapshots,
    clock: Arc<dyn Clock>,
}

impl ScopeRegistry {
    /// Create a registry over the given persistence backend and clock.
    pub fn new(persistence: Box<dyn SnapshotStore>, clock: Arc<dyn Clock>) -> Self {
        Self::with_shared(Arc::new(Mutex::new(persistence)), clock)
    }

    /// Create a registry sharing an existing backend, e.g. with the
    /// navigation layer.
    pub fn with_shared(persistence: SharedSnapshots, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                scopes: Mutex::new(BTreeMap::new()),
                persistence,
                clock,
            }),
        }
    }

    /// A registry over an in-memory backend and the system clock.
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::new()), Arc::new(SystemClock))
    }

    /// The shared persistence backend.
    pub fn snapshots(&self) -> SharedSnapshots {
        self.inner.persistence.clone()
    }

    /// Register with a store, creating it on first registration.
    ///
    /// The first caller's `config` wins: it fixes the initial value,
    /// methods and lifecycle policy. When the config enables persistence
    /// and a fresh snapshot exists (current version, within TTL), the
    /// store hydrates from it; otherwise it starts from `config.initial`.
    /// Later callers attach to the existing store and their configs are
    /// ignored, which keeps configurations from diverging for one key.
    pub fn register(
        &self,
        scope: &str,
        store: &str,
        config: StoreConfig,
    ) -> Result<StoreHandle, StateError> {
        let key = StoreKey::new(scope, store)?;
        let now_ms = self.inner.clock.now_ms();

        let mut scopes = self.inner.lock_scopes();
        RegistryInner::sweep_expired(&mut scopes, now_ms);

        let stores = scopes.entry(scope.to_string()).or_default();
        if let Some(cell) = stores.get(store) {
            cell.attach();
            return Ok(StoreHandle::new(cell.clone(), self.inner.clone()));
        }

        let hydrated = if config.persist {
            self.inner.hydrate(&key, &config, now_ms)
        } else {
            None
        };
        let value = hydrated.unwrap_or_else(|| config.initial.clone());

        let cell = Arc::new(StoreCell::new(
            key,
            config,
            value,
            now_ms,
            self.inner.persistence.clone(),
            self.inner.clock.clone(),
        ));
        cell.attach();
        stores.insert(store.to_string(), cell.clone());
        Ok(StoreHandle::new(cell, self.inner.clone()))
    }

    /// Delete every store under `scope`, in memory and persisted,
    /// regardless of subscriber count.
    ///
    /// Returns only after persistence deletion completed, so a caller
    /// awaiting it (the sign-out path) can rely on a clean slate.
    pub fn clear_scope(&self, scope: &str) -> Result<(), PersistError> {
        {
            let mut scopes = self.inner.lock_scopes();
            if let Some(stores) = scopes.remove(scope) {
                for cell in stores.values() {
                    cell.dispose();
                }
            }
        }
        let mut persistence = self.inner.lock_persistence();
        persistence.delete_scope(scope)
    }

    /// Whether a store currently exists in memory.
    pub fn contains(&self, scope: &str, store: &str) -> bool {
        self.inner
            .lock_scopes()
            .get(scope)
            .is_some_and(|stores| stores.contains_key(store))
    }

    /// Tear down every scope. In-memory only; persisted snapshots remain
    /// for the next session.
    pub fn dispose(&self) {
        let mut scopes = self.inner.lock_scopes();
        for stores in scopes.values() {
            for cell in stores.values() {
                cell.dispose();
            }
        }
        scopes.clear();
    }
}

impl RegistryInner {
    fn lock_scopes(&self) -> MutexGuard<'_, ScopeTable> {
        self.scopes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_persistence(&self) -> MutexGuard<'_, Box<dyn SnapshotStore>> {
        self.persistence.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn hydrate(&self, key: &StoreKey, config: &StoreConfig, now_ms: i64) -> Option<Value> {
        let mut persistence = self.lock_persistence();
        match persistence.load(key) {
            Ok(Some(snapshot)) if snapshot.is_fresh(now_ms, config.ttl) => Some(snapshot.value),
            Ok(Some(_)) => {
                tracing::debug!(store = %key, "discarding stale snapshot");
                None
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(store = %key, error = %e, "snapshot load failed");
                None
            }
        }
    }

    /// The lazy TTL sweep: runs on registration, not on timers, so an
    /// inactive process does no background work. A store past its TTL
    /// with no live handles is dropped and treated as absent.
    fn sweep_expired(scopes: &mut ScopeTable, now_ms: i64) {
        for stores in scopes.values_mut() {
            stores.retain(|_, cell| cell.handle_count() > 0 || !cell.is_expired(now_ms));
        }
        scopes.retain(|_, stores| !stores.is_empty());
    }

    /// Called by `StoreHandle::drop`.
    pub(crate) fn release(&self, cell: &Arc<StoreCell>) {
        let mut scopes = self.lock_scopes();
        let remaining = cell.detach();
        if remaining > 0 || !cell.clear_on_zero_subscribers() {
            return;
        }

        let key = cell.key().clone();
        if let Some(stores) = scopes.get_mut(key.scope()) {
            stores.remove(key.name());
            if stores.is_empty() {
                scopes.remove(key.scope());
            }
        }
        cell.dispose();
        drop(scopes);

        if cell.persist() {
            let mut persistence = self.lock_persistence();
            if let Err(e) = persistence.delete(&key) {
                tracing::warn!(store = %key, error = %e, "snapshot delete failed");
            }
        }
    }
}
