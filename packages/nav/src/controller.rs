//! The stack controller: one ordered sequence of screen entries.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::{Map, Value};
use uuid::Uuid;

use scopestack_persist::{Clock, SharedSnapshots, Snapshot, StoreKey};

use crate::config::StackConfig;
use crate::entry::{NavEntry, Transition};
use crate::error::NavError;
use crate::history::{HistoryMarker, HistorySync};

/// Lifecycle of a stack instance.
///
/// `Ready` is the only phase in which push/pop/peek mutate; a disposed
/// controller turns every call into a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackPhase {
    Initializing,
    Ready,
    Disposed,
}

/// Identifier of a registered stack subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StackSubscriptionId(Uuid);

impl StackSubscriptionId {
    fn next() -> Self {
        Self(Uuid::new_v4())
    }
}

type StackSubscriberFn = Arc<dyn Fn(&NavEntry, Transition) + Send + Sync>;

struct ControllerState {
    phase: StackPhase,
    /// Top of stack last. Never empty while the controller is mounted.
    entries: Vec<NavEntry>,
    subscribers: Vec<(StackSubscriptionId, StackSubscriberFn)>,
}

/// Manager of one navigation stack.
///
/// The controller exclusively owns its entry sequence: callers read the
/// top (`peek`) or request `push`/`pop`/`reset`, never touch the sequence
/// directly. Mutations on one instance are serialized - a rapid double
/// tap applies both operations, in call order, without interleaving.
///
/// With `sync_history`, every push mirrors a marker onto the platform
/// history and every pop consumes one, so the platform back gesture
/// (delivered via [`handle_history_pop`](Self::handle_history_pop)) and
/// the in-memory stack stay aligned. The history mutation happens before
/// subscribers observe the new top: from the caller's point of view both
/// representations move together.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use scopestack_nav::{StackConfig, StackController};
/// use scopestack_persist::SystemClock;
/// use serde_json::Map;
///
/// let stack = StackController::create(
///     "signup",
///     StackConfig::new("step1").screen("step2"),
///     None,
///     None,
///     Arc::new(SystemClock),
/// )
/// .unwrap();
///
/// stack.push("step2", Map::new()).unwrap();
/// assert_eq!(stack.peek().name, "step2");
/// let popped = stack.pop().unwrap();
/// assert_eq!(popped.name, "step2");
/// assert_eq!(stack.peek().name, "step1");
/// ```
pub struct StackController {
    id: String,
    key: StoreKey,
    config: StackConfig,
    persistence: Option<SharedSnapshots>,
    history: Option<Arc<dyn HistorySync>>,
    clock: Arc<dyn Clock>,
    state: Mutex<ControllerState>,
}

impl StackController {
    /// Create (mount) a stack.
    ///
    /// When `persist` is set and a fresh snapshot of the sequence exists,
    /// the stack restores it; otherwise it roots at a single
    /// `{config.entry}` entry. A snapshot naming screens that are no
    /// longer in `nav_link` is discarded wholesale.
    pub fn create(
        id: &str,
        config: StackConfig,
        persistence: Option<SharedSnapshots>,
        history: Option<Arc<dyn HistorySync>>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, NavError> {
        if !config.nav_link.contains(&config.entry) {
            return Err(NavError::UnknownScreen {
                stack_id: id.to_string(),
                name: config.entry.clone(),
            });
        }
        if config.sync_history && history.is_none() {
            return Err(NavError::MissingHistory {
                stack_id: id.to_string(),
            });
        }
        if config.persist && persistence.is_none() {
            return Err(NavError::MissingPersistence {
                stack_id: id.to_string(),
            });
        }
        let key = StoreKey::nav_stack(id)?;

        let controller = Self {
            id: id.to_string(),
            key,
            config,
            persistence,
            history,
            clock,
            state: Mutex::new(ControllerState {
                phase: StackPhase::Initializing,
                entries: Vec::new(),
                subscribers: Vec::new(),
            }),
        };

        let entries = controller.hydrate();
        {
            let mut st = controller.state();
            st.entries = entries;
            st.phase = StackPhase::Ready;
        }
        Ok(controller)
    }

    fn state(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn hydrate(&self) -> Vec<NavEntry> {
        let root = vec![NavEntry::new(&self.config.entry)];
        if !self.config.persist {
            return root;
        }
        let Some(persistence) = &self.persistence else {
            return root;
        };
        let now_ms = self.clock.now_ms();
        let mut persistence = persistence.lock().unwrap_or_else(PoisonError::into_inner);
        match persistence.load(&self.key) {
            Ok(Some(snapshot)) if snapshot.is_fresh(now_ms, self.config.ttl) => {
                match serde_json::from_value::<Vec<NavEntry>>(snapshot.value) {
                    Ok(entries)
                        if !entries.is_empty()
                            && entries.iter().all(|e| self.config.nav_link.contains(&e.name)) =>
                    {
                        entries
                    }
                    _ => {
                        tracing::debug!(stack = %self.id, "discarding unusable stack snapshot");
                        root
                    }
                }
            }
            Ok(Some(_)) => {
                tracing::debug!(stack = %self.id, "discarding stale stack snapshot");
                root
            }
            Ok(None) => root,
            Err(e) => {
                tracing::warn!(stack = %self.id, error = %e, "stack snapshot load failed");
                root
            }
        }
    }

    /// The stack id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> StackPhase {
        self.state().phase
    }

    /// Number of entries on the stack.
    pub fn depth(&self) -> usize {
        self.state().entries.len()
    }

    /// The full sequence, bottom first.
    pub fn entries(&self) -> Vec<NavEntry> {
        self.state().entries.clone()
    }

    /// The top entry, without mutation.
    pub fn peek(&self) -> NavEntry {
        let st = self.state();
        st.entries
            .last()
            .cloned()
            .unwrap_or_else(|| NavEntry::new(&self.config.entry))
    }

    /// Push a screen onto the stack.
    ///
    /// A name absent from `nav_link` is a programming error and fails
    /// loudly. On a disposed stack the call is a no-op.
    pub fn push(&self, name: &str, params: Map<String, Value>) -> Result<(), NavError> {
        let (top, subscribers, persisted) = {
            let mut st = self.state();
            if st.phase != StackPhase::Ready {
                tracing::debug!(stack = %self.id, name, "push on disposed stack ignored");
                return Ok(());
            }
            if !self.config.nav_link.contains(name) {
                return Err(NavError::UnknownScreen {
                    stack_id: self.id.clone(),
                    name: name.to_string(),
                });
            }
            st.entries.push(NavEntry::with_params(name, params));
            if self.config.sync_history {
                if let Some(history) = &self.history {
                    history.push(HistoryMarker {
                        stack_id: self.id.clone(),
                        depth: st.entries.len(),
                    });
                }
            }
            self.committed(&st)
        };
        self.finish(top, subscribers, persisted);
        Ok(())
    }

    /// Pop the top entry.
    ///
    /// Returns `None` and leaves the stack untouched when only the root
    /// remains: the root is never implicitly removed. Unmounting the
    /// whole stack is the caller's responsibility, not the controller's.
    pub fn pop(&self) -> Option<NavEntry> {
        let (entry, top, subscribers, persisted) = {
            let mut st = self.state();
            if st.phase != StackPhase::Ready {
                return None;
            }
            if st.entries.len() <= 1 {
                return None;
            }
            let Some(entry) = st.entries.pop() else {
                return None;
            };
            if self.config.sync_history {
                if let Some(history) = &self.history {
                    history.back();
                }
            }
            let (top, subscribers, persisted) = self.committed(&st);
            (entry, top, subscribers, persisted)
        };
        self.finish(top, subscribers, persisted);
        Some(entry)
    }

    /// Collapse the sequence to a single root entry and clear the
    /// persisted state for this stack.
    ///
    /// The root is `config.entry` unless an override (registered in
    /// `nav_link`) is given. Calling `reset` twice in a row yields the
    /// same single-root sequence both times.
    pub fn reset(&self, to: Option<&str>) -> Result<(), NavError> {
        let (top, subscribers) = {
            let mut st = self.state();
            if st.phase != StackPhase::Ready {
                return Ok(());
            }
            let root = to.unwrap_or(&self.config.entry);
            if !self.config.nav_link.contains(root) {
                return Err(NavError::UnknownScreen {
                    stack_id: self.id.clone(),
                    name: root.to_string(),
                });
            }
            if self.config.sync_history {
                if let Some(history) = &self.history {
                    // Rewind the mirrored entries before collapsing.
                    for _ in 1..st.entries.len() {
                        history.back();
                    }
                }
            }
            st.entries = vec![NavEntry::new(root)];
            let top = st.entries[0].clone();
            let subscribers: Vec<StackSubscriberFn> =
                st.subscribers.iter().map(|(_, s)| s.clone()).collect();
            (top, subscribers)
        };
        if self.config.persist {
            self.clear_snapshot();
        }
        for subscriber in &subscribers {
            subscriber(&top, self.config.transition);
        }
        Ok(())
    }

    /// Reconcile with a platform back signal.
    ///
    /// A marker below the current depth pops the stack down to it (the
    /// platform already consumed its entries, so no `back` is issued). A
    /// marker above the current depth should not occur; it is logged and
    /// clamped to the current top.
    pub fn handle_history_pop(&self, marker: &HistoryMarker) {
        if marker.stack_id != self.id {
            return;
        }
        let committed = {
            let mut st = self.state();
            if st.phase != StackPhase::Ready {
                return;
            }
            let depth = st.entries.len();
            if marker.depth > depth {
                tracing::warn!(
                    stack = %self.id,
                    marker_depth = marker.depth,
                    depth,
                    "history marker ahead of stack; clamping to current top"
                );
                return;
            }
            if marker.depth == depth {
                return;
            }
            let target = marker.depth.max(1);
            st.entries.truncate(target);
            self.committed(&st)
        };
        let (top, subscribers, persisted) = committed;
        self.finish(top, subscribers, persisted);
    }

    /// Register a callback invoked with the new top entry and the
    /// stack's transition tag after every committed mutation.
    pub fn subscribe(
        &self,
        f: impl Fn(&NavEntry, Transition) + Send + Sync + 'static,
    ) -> StackSubscriptionId {
        let id = StackSubscriptionId::next();
        self.state().subscribers.push((id, Arc::new(f)));
        id
    }

    /// Remove a previously registered callback.
    pub fn unsubscribe(&self, id: StackSubscriptionId) {
        self.state().subscribers.retain(|(sid, _)| *sid != id);
    }

    /// Unmount the stack. Further calls are no-ops; persisted state is
    /// left for the next mount.
    pub fn dispose(&self) {
        let mut st = self.state();
        st.phase = StackPhase::Disposed;
        st.subscribers.clear();
    }

    fn committed(
        &self,
        st: &ControllerState,
    ) -> (NavEntry, Vec<StackSubscriberFn>, Option<Value>) {
        let top = st
            .entries
            .last()
            .cloned()
            .unwrap_or_else(|| NavEntry::new(&self.config.entry));
        let subscribers = st.subscribers.iter().map(|(_, s)| s.clone()).collect();
        let persisted = self
            .config
            .persist
            .then(|| serde_json::to_value(&st.entries).ok())
            .flatten();
        (top, subscribers, persisted)
    }

    // Notifications run outside the lock, after the persistence write.
    fn finish(&self, top: NavEntry, subscribers: Vec<StackSubscriberFn>, persisted: Option<Value>) {
        if let Some(value) = persisted {
            self.write_through(value);
        }
        for subscriber in &subscribers {
            subscriber(&top, self.config.transition);
        }
    }

    // Best-effort, like every persistence write in this stack.
    fn write_through(&self, value: Value) {
        let Some(persistence) = &self.persistence else {
            return;
        };
        let snapshot = Snapshot::new(value, self.clock.now_ms());
        let mut persistence = persistence.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = persistence.save(&self.key, &snapshot) {
            tracing::warn!(stack = %self.id, error = %e, "stack snapshot write failed");
        }
    }

    fn clear_snapshot(&self) {
        let Some(persistence) = &self.persistence else {
            return;
        };
        let mut persistence = persistence.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = persistence.delete(&self.key) {
            tracing::warn!(stack = %self.id, error = %e, "stack snapshot delete failed");
        }
    }
}
