//! Snapshot persistence for the scopestack runtime.
//!
//! This is the durability waist of the stack. Everything above it (scoped
//! state stores, navigation stacks) persists through the same narrow
//! interface: versioned, TTL-stamped JSON snapshots addressed by a
//! `"{scope}:{name}"` key.
//!
//! Two backends ship with the crate:
//!
//! - [`MemoryStore`] - process-local, session-scoped
//! - [`FileStore`] - one JSON file per key under a root directory
//!
//! Read failures are deliberately quiet: a snapshot that is missing,
//! corrupted, of an unknown version, or past its TTL hydrates as "absent",
//! and the owning store falls back to its configured initial value. Only
//! I/O and setup failures surface as [`PersistError`].
//!
//! # Example
//!
//! ```rust
//! use scopestack_persist::{MemoryStore, Snapshot, SnapshotStore, StoreKey};
//!
//! let mut store = MemoryStore::new();
//! let key = StoreKey::parse("signup_flow:signup").unwrap();
//!
//! store.save(&key, &Snapshot::new(serde_json::json!({"email": ""}), 0)).unwrap();
//! let snap = store.load(&key).unwrap().unwrap();
//! assert_eq!(snap.value, serde_json::json!({"email": ""}));
//! ```

mod clock;
mod error;
mod file;
mod key;
mod memory;
mod snapshot;
mod traits;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::PersistError;
pub use file::FileStore;
pub use key::{KeyError, StoreKey, NAV_SCOPE};
pub use memory::MemoryStore;
pub use snapshot::{Snapshot, SNAPSHOT_VERSION};
pub use traits::{SharedSnapshots, SnapshotStore};
