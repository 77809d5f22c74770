//! The runtime coordinator: one object owning the registry, the stack
//! table and the router.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::de::DeserializeOwned;
use serde::Serialize;

use scopestack_nav::{
    FakeHistory, HistoryMarker, HistorySync, NavError, StackConfig, StackController, StackPhase,
};
use scopestack_persist::{
    Clock, FileStore, MemoryStore, PersistError, SharedSnapshots, SnapshotStore, SystemClock,
};
use scopestack_router::{
    AwaitableRouter, FakeLocation, FakeNavigator, LocationSource, Navigator, RouterConfig,
};
use scopestack_state::{ScopeRegistry, StateError, StoreConfig, StoreHandle, TypedStoreHandle};

/// Which snapshot backend the runtime persists through.
#[derive(Debug, Clone, Default)]
pub enum PersistenceBackend {
    /// Session-scoped: snapshots live as long as the runtime.
    #[default]
    Memory,
    /// Durable: one JSON file per key under the root directory.
    File(PathBuf),
}

/// Configuration for the runtime.
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    pub persistence: PersistenceBackend,
    pub router: RouterConfig,
}

/// The platform collaborators the host wires in.
pub struct Platform {
    pub navigator: Arc<dyn Navigator>,
    pub location: Arc<dyn LocationSource>,
    pub history: Arc<dyn HistorySync>,
}

/// A platform made of the in-crate fakes, plus the fake history and
/// location for direct manipulation in tests and demos.
pub fn fake_platform() -> (Platform, Arc<FakeHistory>, FakeLocation) {
    let location = FakeLocation::new("/");
    let history = Arc::new(FakeHistory::new());
    let platform = Platform {
        navigator: Arc::new(FakeNavigator::new(location.clone())),
        location: Arc::new(location.clone()),
        history: history.clone(),
    };
    (platform, history, location)
}

/// Process-wide coordinator for scoped state and navigation stacks.
///
/// The runtime is an explicitly constructed object handed to the page
/// layer, never a global: tests build an isolated runtime per case, and
/// teardown is an explicit [`dispose`](Self::dispose) rather than
/// process exit.
///
/// The state registry, every navigation stack and the router share one
/// persistence backend and one clock.
pub struct Runtime {
    registry: ScopeRegistry,
    stacks: Mutex<BTreeMap<String, Arc<StackController>>>,
    router: AwaitableRouter,
    history: Arc<dyn HistorySync>,
    snapshots: SharedSnapshots,
    clock: Arc<dyn Clock>,
}

impl Runtime {
    /// Build a runtime over the given platform, with the system clock.
    pub fn new(config: RuntimeConfig, platform: Platform) -> Result<Self, PersistError> {
        Self::with_clock(config, platform, Arc::new(SystemClock))
    }

    /// Build a runtime with an explicit clock. Tests use this with a
    /// manual clock to step through TTL windows.
    pub fn with_clock(
        config: RuntimeConfig,
        platform: Platform,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, PersistError> {
        let backend: Box<dyn SnapshotStore> = match config.persistence {
            PersistenceBackend::Memory => Box::new(MemoryStore::new()),
            PersistenceBackend::File(root) => Box::new(FileStore::new(root)?),
        };
        Ok(Self::assemble(
            Arc::new(Mutex::new(backend)),
            platform,
            config.router,
            clock,
        ))
    }

    /// An in-memory runtime over fake platform collaborators, for tests
    /// and demos.
    pub fn in_memory() -> Self {
        let (platform, _, _) = fake_platform();
        let backend: Box<dyn SnapshotStore> = Box::new(MemoryStore::new());
        Self::assemble(
            Arc::new(Mutex::new(backend)),
            platform,
            RouterConfig::default(),
            Arc::new(SystemClock),
        )
    }

    fn assemble(
        snapshots: SharedSnapshots,
        platform: Platform,
        router: RouterConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry: ScopeRegistry::with_shared(snapshots.clone(), clock.clone()),
            stacks: Mutex::new(BTreeMap::new()),
            router: AwaitableRouter::with_config(platform.navigator, platform.location, router),
            history: platform.history,
            snapshots,
            clock,
        }
    }

    fn lock_stacks(&self) -> MutexGuard<'_, BTreeMap<String, Arc<StackController>>> {
        self.stacks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The hook surface for state: register with (or create) the store
    /// `store` in `scope`.
    pub fn use_stack(
        &self,
        scope: &str,
        store: &str,
        config: StoreConfig,
    ) -> Result<StoreHandle, StateError> {
        self.registry.register(scope, store, config)
    }

    /// Like [`use_stack`](Self::use_stack), wrapped with a serde type.
    pub fn use_stack_typed<T: Serialize + DeserializeOwned>(
        &self,
        scope: &str,
        store: &str,
        config: StoreConfig,
    ) -> Result<TypedStoreHandle<T>, StateError> {
        Ok(self.registry.register(scope, store, config)?.typed())
    }

    /// The hook surface for navigation: the controller for `id`,
    /// creating (and hydrating) it on first use. While mounted, every
    /// caller for the same id shares one controller.
    pub fn use_nav(&self, id: &str, config: StackConfig) -> Result<Arc<StackController>, NavError> {
        let mut stacks = self.lock_stacks();
        if let Some(existing) = stacks.get(id) {
            if existing.phase() != StackPhase::Disposed {
                return Ok(existing.clone());
            }
        }
        let persistence = config.persist.then(|| self.snapshots.clone());
        let history = config.sync_history.then(|| self.history.clone());
        let controller = Arc::new(StackController::create(
            id,
            config,
            persistence,
            history,
            self.clock.clone(),
        )?);
        stacks.insert(id.to_string(), controller.clone());
        Ok(controller)
    }

    /// Unmount the stack `id`. Its persisted sequence, if any, stays for
    /// the next mount.
    pub fn release_nav(&self, id: &str) {
        if let Some(controller) = self.lock_stacks().remove(id) {
            controller.dispose();
        }
    }

    /// Route a platform back signal to the stack its marker names.
    pub fn handle_history_pop(&self, marker: &HistoryMarker) {
        let controller = self.lock_stacks().get(&marker.stack_id).cloned();
        if let Some(controller) = controller {
            controller.handle_history_pop(marker);
        }
    }

    /// The awaitable router.
    pub fn router(&self) -> &AwaitableRouter {
        &self.router
    }

    /// The underlying scope registry.
    pub fn registry(&self) -> &ScopeRegistry {
        &self.registry
    }

    /// Purge every store under `scope`, in memory and persisted - the
    /// sign-out path. This is the one operation that bypasses
    /// subscriber-count protection.
    pub fn clear_scope(&self, scope: &str) -> Result<(), PersistError> {
        self.registry.clear_scope(scope)
    }

    /// Tear everything down: dispose every stack and every store.
    /// Persisted snapshots are left in place.
    pub fn dispose(&self) {
        let stacks: Vec<Arc<StackController>> = {
            let mut table = self.lock_stacks();
            let stacks = table.values().cloned().collect();
            table.clear();
            stacks
        };
        for controller in stacks {
            controller.dispose();
        }
        self.registry.dispose();
    }
}
