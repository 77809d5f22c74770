//! The platform history boundary.

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

/// Marker attached to a synthetic platform history entry.
///
/// The depth lets the controller translate a platform back signal into
/// the right number of internal pops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryMarker {
    pub stack_id: String,
    /// Stack depth at the time the entry was pushed.
    pub depth: usize,
}

/// The platform's native history, as far as this crate is concerned.
///
/// A controller with `sync_history` mirrors every push/pop onto this
/// interface: `push` when an entry is added, `back` when one is popped,
/// so the platform back gesture and the in-memory stack stay aligned.
/// The host wires the real browser-style history here; tests and demos
/// use [`FakeHistory`].
pub trait HistorySync: Send + Sync {
    /// Push a synthetic history entry tagged with stack id and depth.
    fn push(&self, marker: HistoryMarker);

    /// Consume the current history entry (the platform "go back"
    /// primitive).
    fn back(&self);
}

/// In-memory history for tests and demos.
///
/// Mimics the platform: a stack of markers, where a user back gesture
/// removes the top entry and surfaces the one beneath it.
#[derive(Debug, Default)]
pub struct FakeHistory {
    entries: Mutex<Vec<HistoryMarker>>,
}

impl FakeHistory {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<HistoryMarker>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current marker stack, bottom first.
    pub fn markers(&self) -> Vec<HistoryMarker> {
        self.lock().clone()
    }

    /// Number of synthetic entries currently on the history.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Simulate the user's back gesture: the platform consumes the top
    /// entry and reports the marker now current. The entry the stack was
    /// mounted on carries no marker; it is modeled as depth 1.
    pub fn back_gesture(&self, stack_id: &str) -> HistoryMarker {
        let mut entries = self.lock();
        entries.pop();
        entries.last().cloned().unwrap_or(HistoryMarker {
            stack_id: stack_id.to_string(),
            depth: 1,
        })
    }
}

impl HistorySync for FakeHistory {
    fn push(&self, marker: HistoryMarker) {
        self.lock().push(marker);
    }

    fn back(&self) {
        self.lock().pop();
    }
}
