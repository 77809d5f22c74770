//! The versioned snapshot envelope.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Current snapshot envelope version.
///
/// Readers treat any other version as absent. There is no migration path:
/// a store that cannot hydrate falls back to its configured initial value.
pub const SNAPSHOT_VERSION: u32 = 1;

/// A persisted snapshot: the payload plus the metadata needed to judge it.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use scopestack_persist::{Snapshot, SNAPSHOT_VERSION};
///
/// let snap = Snapshot::new(serde_json::json!({"email": ""}), 1_000);
/// assert_eq!(snap.version, SNAPSHOT_VERSION);
/// assert!(snap.is_fresh(2_000, Duration::from_secs(60)));
/// assert!(!snap.is_fresh(2_000 + 60_001, Duration::from_secs(60)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Envelope version, compared against [`SNAPSHOT_VERSION`] on read.
    pub version: u32,
    /// The persisted payload.
    pub value: Value,
    /// Write time, milliseconds since the Unix epoch.
    pub written_at: i64,
}

impl Snapshot {
    /// Create a snapshot at the current envelope version.
    pub fn new(value: Value, written_at: i64) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            value,
            written_at,
        }
    }

    /// Whether this snapshot carries a version this reader understands.
    pub fn is_current_version(&self) -> bool {
        self.version == SNAPSHOT_VERSION
    }

    /// Whether the snapshot's age exceeds the TTL.
    ///
    /// Age is measured from `written_at`, not creation: a write-through
    /// refreshes the window.
    pub fn is_expired(&self, now_ms: i64, ttl: Duration) -> bool {
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        now_ms.saturating_sub(self.written_at) > ttl_ms
    }

    /// Usable snapshot: recognized version and within the TTL window.
    pub fn is_fresh(&self, now_ms: i64, ttl: Duration) -> bool {
        self.is_current_version() && !self.is_expired(now_ms, ttl)
    }
}
