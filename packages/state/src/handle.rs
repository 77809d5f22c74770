//! Accessor/mutator handles over scoped stores.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::StateError;
use crate::registry::RegistryInner;
use crate::store::{StoreCell, SubscriptionId};

/// A reference-counted handle to one scoped store.
///
/// Handles are the only exposure of a store; the cell itself stays inside
/// the registry, so external code cannot bypass the mutation-function
/// contract. Dropping the handle decrements the store's subscriber count;
/// when the count reaches zero and the store was configured with
/// `clear_on_zero_subscribers`, the value and its persisted snapshot are
/// deleted, otherwise the value is retained for the TTL window.
pub struct StoreHandle {
    cell: Arc<StoreCell>,
    registry: Arc<RegistryInner>,
}

impl StoreHandle {
    pub(crate) fn new(cell: Arc<StoreCell>, registry: Arc<RegistryInner>) -> Self {
        Self { cell, registry }
    }

    /// The scope this store belongs to.
    pub fn scope(&self) -> &str {
        self.cell.key().scope()
    }

    /// The store's name within its scope.
    pub fn name(&self) -> &str {
        self.cell.key().name()
    }

    /// The current value. O(1) clone, no side effects.
    pub fn state(&self) -> Value {
        self.cell.current()
    }

    /// Apply the mutation method registered under `method`.
    ///
    /// Fails loudly with [`StateError::UnknownMethod`] for a method that
    /// was never registered - that is a programming error, not a runtime
    /// condition. Persistence failures do not surface here: the write-
    /// through is best-effort and logged.
    pub fn mutate(&self, method: &str, args: &[Value]) -> Result<(), StateError> {
        self.cell.mutate(method, args)
    }

    /// Return the store to its configured initial value.
    pub fn reset(&self) {
        self.cell.reset();
    }

    /// Step back one state in the rollback ring. Returns false when no
    /// past state is retained.
    pub fn rollback(&self) -> bool {
        self.cell.rollback()
    }

    /// Register a callback invoked after every committed mutation, in
    /// registration order, with the new value.
    pub fn subscribe(&self, f: impl Fn(&Value) + Send + Sync + 'static) -> SubscriptionId {
        self.cell.subscribe(Arc::new(f))
    }

    /// Remove a previously registered callback.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.cell.unsubscribe(id);
    }
}

impl Clone for StoreHandle {
    fn clone(&self) -> Self {
        self.cell.attach();
        Self {
            cell: self.cell.clone(),
            registry: self.registry.clone(),
        }
    }
}

impl Drop for StoreHandle {
    fn drop(&mut self) {
        self.registry.release(&self.cell);
    }
}

impl fmt::Debug for StoreHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreHandle")
            .field("key", &self.cell.key().to_string())
            .finish()
    }
}
