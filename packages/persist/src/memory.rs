//! In-memory snapshot store.

use std::collections::HashMap;

use crate::{PersistError, Snapshot, SnapshotStore, StoreKey};

/// A snapshot store backed by a process-local map.
///
/// This is the session-scoped backend: snapshots live exactly as long as
/// the store instance. Useful on its own for tests, and as the default
/// backend when durable storage is unavailable in a restricted context.
///
/// # Example
///
/// ```rust
/// use scopestack_persist::{MemoryStore, Snapshot, SnapshotStore, StoreKey};
///
/// let mut store = MemoryStore::new();
/// let key = StoreKey::new("signup_flow", "signup").unwrap();
///
/// store.save(&key, &Snapshot::new(serde_json::json!({"email": ""}), 0)).unwrap();
/// assert!(store.load(&key).unwrap().is_some());
///
/// store.delete_scope("signup_flow").unwrap();
/// assert!(store.load(&key).unwrap().is_none());
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<StoreKey, Snapshot>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored snapshots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no snapshots.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&mut self, key: &StoreKey) -> Result<Option<Snapshot>, PersistError> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &StoreKey, snapshot: &Snapshot) -> Result<(), PersistError> {
        self.entries.insert(key.clone(), snapshot.clone());
        Ok(())
    }

    fn delete(&mut self, key: &StoreKey) -> Result<(), PersistError> {
        self.entries.remove(key);
        Ok(())
    }

    fn delete_scope(&mut self, scope: &str) -> Result<(), PersistError> {
        self.entries.retain(|key, _| key.scope() != scope);
        Ok(())
    }

    fn keys(&mut self) -> Result<Vec<StoreKey>, PersistError> {
        let mut keys: Vec<StoreKey> = self.entries.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(scope: &str, name: &str) -> StoreKey {
        StoreKey::new(scope, name).unwrap()
    }

    #[test]
    fn save_then_load() {
        let mut store = MemoryStore::new();
        let k = key("signup_flow", "signup");
        let snap = Snapshot::new(serde_json::json!({"fullName": "Ada"}), 7);

        store.save(&k, &snap).unwrap();
        assert_eq!(store.load(&k).unwrap(), Some(snap));
    }

    #[test]
    fn load_absent_is_none() {
        let mut store = MemoryStore::new();
        assert_eq!(store.load(&key("a", "b")).unwrap(), None);
    }

    #[test]
    fn delete_is_idempotent() {
        let mut store = MemoryStore::new();
        let k = key("a", "b");
        store.save(&k, &Snapshot::new(serde_json::Value::Null, 0)).unwrap();
        store.delete(&k).unwrap();
        store.delete(&k).unwrap();
        assert_eq!(store.load(&k).unwrap(), None);
    }

    #[test]
    fn delete_scope_spares_other_scopes() {
        let mut store = MemoryStore::new();
        store
            .save(&key("mission_flow", "progress"), &Snapshot::new(serde_json::Value::Null, 0))
            .unwrap();
        store
            .save(&key("mission_flow", "rewards"), &Snapshot::new(serde_json::Value::Null, 0))
            .unwrap();
        store
            .save(&key("payment_flow", "checkout"), &Snapshot::new(serde_json::Value::Null, 0))
            .unwrap();

        store.delete_scope("mission_flow").unwrap();

        assert_eq!(store.load(&key("mission_flow", "progress")).unwrap(), None);
        assert_eq!(store.load(&key("mission_flow", "rewards")).unwrap(), None);
        assert!(store.load(&key("payment_flow", "checkout")).unwrap().is_some());
    }

    #[test]
    fn keys_are_sorted() {
        let mut store = MemoryStore::new();
        store.save(&key("b", "y"), &Snapshot::new(serde_json::Value::Null, 0)).unwrap();
        store.save(&key("a", "z"), &Snapshot::new(serde_json::Value::Null, 0)).unwrap();

        let keys = store.keys().unwrap();
        assert_eq!(keys, vec![key("a", "z"), key("b", "y")]);
    }
}
