//! The store cell: one named, mutation-governed state container.
//!
//! Cells are owned by the [`ScopeRegistry`](crate::ScopeRegistry) and are
//! never handed to callers directly - all access goes through
//! [`StoreHandle`](crate::StoreHandle), which keeps the mutation-function
//! contract enforceable.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use uuid::Uuid;

use scopestack_persist::{Clock, SharedSnapshots, Snapshot, SnapshotStore, StoreKey};

use crate::config::{MutationFn, StoreConfig};
use crate::error::StateError;

/// Identifier of a registered subscriber callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    fn next() -> Self {
        Self(Uuid::new_v4())
    }
}

pub(crate) type SubscriberFn = Arc<dyn Fn(&Value) + Send + Sync>;

/// A mutation that has been looked up and is waiting its turn.
struct QueuedMutation {
    f: MutationFn,
    args: Vec<Value>,
}

struct CellState {
    value: Value,
    /// Past states, oldest first. Bounded by `config.history_depth`.
    past: VecDeque<Value>,
    subscribers: Vec<(SubscriptionId, SubscriberFn)>,
    last_write_ms: i64,
    /// Set while a notification cycle runs; re-entrant mutations queue.
    notifying: bool,
    queued: VecDeque<QueuedMutation>,
    disposed: bool,
}

pub(crate) struct StoreCell {
    key: StoreKey,
    config: StoreConfig,
    persistence: SharedSnapshots,
    clock: Arc<dyn Clock>,
    /// Number of live handles. Eviction policy runs when this hits zero.
    handles: AtomicUsize,
    state: Mutex<CellState>,
}

impl StoreCell {
    pub(crate) fn new(
        key: StoreKey,
        config: StoreConfig,
        value: Value,
        now_ms: i64,
        persistence: SharedSnapshots,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            key,
            config,
            persistence,
            clock,
            handles: AtomicUsize::new(0),
            state: Mutex::new(CellState {
                value,
                past: VecDeque::new(),
                subscribers: Vec::new(),
                last_write_ms: now_ms,
                notifying: false,
                queued: VecDeque::new(),
                disposed: false,
            }),
        }
    }

    // A panicking mutation function poisons the lock; recover the guard so
    // the registry stays usable for every other store.
    fn state(&self) -> MutexGuard<'_, CellState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_persistence(&self) -> MutexGuard<'_, Box<dyn SnapshotStore>> {
        self.persistence.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn key(&self) -> &StoreKey {
        &self.key
    }

    pub(crate) fn clear_on_zero_subscribers(&self) -> bool {
        self.config.clear_on_zero_subscribers
    }

    pub(crate) fn persist(&self) -> bool {
        self.config.persist
    }

    pub(crate) fn attach(&self) {
        self.handles.fetch_add(1, Ordering::SeqCst);
    }

    /// Detach one handle, returning the number still attached.
    pub(crate) fn detach(&self) -> usize {
        self.handles.fetch_sub(1, Ordering::SeqCst) - 1
    }

    pub(crate) fn handle_count(&self) -> usize {
        self.handles.load(Ordering::SeqCst)
    }

    pub(crate) fn is_expired(&self, now_ms: i64) -> bool {
        let ttl_ms = i64::try_from(self.config.ttl.as_millis()).unwrap_or(i64::MAX);
        now_ms.saturating_sub(self.state().last_write_ms) > ttl_ms
    }

    pub(crate) fn current(&self) -> Value {
        self.state().value.clone()
    }

    /// Apply a registered mutation method.
    ///
    /// The mutation and its subscriber notification complete before the
    /// next mutation is accepted: a subscriber that calls `mutate` again
    /// is queued and drained by the enclosing cycle, in call order.
    pub(crate) fn mutate(&self, method: &str, args: &[Value]) -> Result<(), StateError> {
        let Some(f) = self.config.methods.get(method) else {
            return Err(StateError::UnknownMethod {
                scope: self.key.scope().to_string(),
                store: self.key.name().to_string(),
                method: method.to_string(),
            });
        };
        let mutation = QueuedMutation {
            f: f.clone(),
            args: args.to_vec(),
        };
        {
            let mut st = self.state();
            if st.disposed {
                tracing::debug!(store = %self.key, method, "mutate on disposed store ignored");
                return Ok(());
            }
            st.queued.push_back(mutation);
            if st.notifying {
                return Ok(());
            }
            st.notifying = true;
        }
        self.drain_queue();
        Ok(())
    }

    fn drain_queue(&self) {
        loop {
            let mutation = {
                let mut st = self.state();
                match st.queued.pop_front() {
                    Some(m) => m,
                    None => {
                        st.notifying = false;
                        return;
                    }
                }
            };
            self.apply(&mutation);
        }
    }

    fn apply(&self, mutation: &QueuedMutation) {
        let (current, subscribers, persisted) = {
            let mut st = self.state();
            if self.config.history_depth > 0 {
                if st.past.len() >= self.config.history_depth {
                    st.past.pop_front();
                }
                let prev = st.value.clone();
                st.past.push_back(prev);
            }
            let prev = std::mem::take(&mut st.value);
            st.value = (mutation.f)(prev, &mutation.args);
            st.last_write_ms = self.clock.now_ms();
            self.committed(&st)
        };
        self.finish(current, subscribers, persisted);
    }

    /// Roll the value back one step in the ring. Returns false when the
    /// ring is empty or rollback is disabled.
    pub(crate) fn rollback(&self) -> bool {
        let (current, subscribers, persisted) = {
            let mut st = self.state();
            if st.disposed {
                return false;
            }
            let Some(prev) = st.past.pop_back() else {
                return false;
            };
            st.value = prev;
            st.last_write_ms = self.clock.now_ms();
            self.committed(&st)
        };
        self.finish(current, subscribers, persisted);
        true
    }

    /// Return to the configured initial value, clearing the ring.
    pub(crate) fn reset(&self) {
        let (current, subscribers, persisted) = {
            let mut st = self.state();
            if st.disposed {
                return;
            }
            st.value = self.config.initial.clone();
            st.past.clear();
            st.last_write_ms = self.clock.now_ms();
            self.committed(&st)
        };
        self.finish(current, subscribers, persisted);
    }

    fn committed(&self, st: &CellState) -> (Value, Vec<SubscriberFn>, Option<Value>) {
        (
            st.value.clone(),
            st.subscribers.iter().map(|(_, s)| s.clone()).collect(),
            self.config.persist.then(|| st.value.clone()),
        )
    }

    // Subscribers run outside the lock, in registration order. `notifying`
    // stays set for queued mutations, so re-entrant calls cannot recurse.
    fn finish(&self, current: Value, subscribers: Vec<SubscriberFn>, persisted: Option<Value>) {
        if let Some(value) = persisted {
            self.write_through(value);
        }
        for subscriber in &subscribers {
            subscriber(&current);
        }
    }

    // Write-through is best-effort: a failure is logged and the in-memory
    // value stays authoritative for the session.
    fn write_through(&self, value: Value) {
        let snapshot = Snapshot::new(value, self.clock.now_ms());
        let mut persistence = self.lock_persistence();
        if let Err(e) = persistence.save(&self.key, &snapshot) {
            tracing::warn!(store = %self.key, error = %e, "snapshot write failed");
        }
    }

    pub(crate) fn subscribe(&self, f: SubscriberFn) -> SubscriptionId {
        let id = SubscriptionId::next();
        self.state().subscribers.push((id, f));
        id
    }

    pub(crate) fn unsubscribe(&self, id: SubscriptionId) {
        self.state().subscribers.retain(|(sid, _)| *sid != id);
    }

    /// Freeze the cell. Outstanding handles become inert: mutations are
    /// ignored, reads return the last value.
    pub(crate) fn dispose(&self) {
        let mut st = self.state();
        st.disposed = true;
        st.subscribers.clear();
        st.queued.clear();
    }
}
