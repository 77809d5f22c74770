//! The `SnapshotStore` trait.

use std::sync::{Arc, Mutex};

use crate::{PersistError, Snapshot, StoreKey};

/// Shared handle to one persistence backend.
///
/// The state registry and the navigation controllers write through the
/// same backend; this is the type they share.
pub type SharedSnapshots = Arc<Mutex<Box<dyn SnapshotStore>>>;

/// Read, write and delete snapshots by key.
///
/// Implementations decide durability: in-memory for session-scoped state,
/// on-disk for state that survives the process. Higher layers treat both
/// uniformly and never depend on a particular backend.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Box<dyn SnapshotStore>`.
pub trait SnapshotStore: Send {
    /// Load the snapshot stored under `key`.
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - No snapshot, or an unreadable one (corruption is a
    ///   cache miss, never an error).
    /// * `Ok(Some(snapshot))` - The stored snapshot. Freshness is the
    ///   caller's judgement; expired snapshots are still returned.
    /// * `Err(PersistError)` - An I/O error occurred.
    fn load(&mut self, key: &StoreKey) -> Result<Option<Snapshot>, PersistError>;

    /// Store a snapshot under `key`, replacing any previous one.
    fn save(&mut self, key: &StoreKey, snapshot: &Snapshot) -> Result<(), PersistError>;

    /// Delete the snapshot under `key`. Deleting an absent key is not an
    /// error.
    fn delete(&mut self, key: &StoreKey) -> Result<(), PersistError>;

    /// Delete every snapshot whose key is under `scope`.
    fn delete_scope(&mut self, scope: &str) -> Result<(), PersistError>;

    /// Enumerate all stored keys.
    fn keys(&mut self) -> Result<Vec<StoreKey>, PersistError>;
}

// Blanket implementations for references and boxes

impl<T: SnapshotStore + ?Sized> SnapshotStore for &mut T {
    fn load(&mut self, key: &StoreKey) -> Result<Option<Snapshot>, PersistError> {
        (*self).load(key)
    }

    fn save(&mut self, key: &StoreKey, snapshot: &Snapshot) -> Result<(), PersistError> {
        (*self).save(key, snapshot)
    }

    fn delete(&mut self, key: &StoreKey) -> Result<(), PersistError> {
        (*self).delete(key)
    }

    fn delete_scope(&mut self, scope: &str) -> Result<(), PersistError> {
        (*self).delete_scope(scope)
    }

    fn keys(&mut self) -> Result<Vec<StoreKey>, PersistError> {
        (*self).keys()
    }
}

impl<T: SnapshotStore + ?Sized> SnapshotStore for Box<T> {
    fn load(&mut self, key: &StoreKey) -> Result<Option<Snapshot>, PersistError> {
        (**self).load(key)
    }

    fn save(&mut self, key: &StoreKey, snapshot: &Snapshot) -> Result<(), PersistError> {
        (**self).save(key, snapshot)
    }

    fn delete(&mut self, key: &StoreKey) -> Result<(), PersistError> {
        (**self).delete(key)
    }

    fn delete_scope(&mut self, scope: &str) -> Result<(), PersistError> {
        (**self).delete_scope(scope)
    }

    fn keys(&mut self) -> Result<Vec<StoreKey>, PersistError> {
        (**self).keys()
    }
}
