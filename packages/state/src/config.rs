//! Store configuration.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

/// A registered mutation: a pure function from the current value and call
/// arguments to the next value. Must not mutate in place; the store holds
/// exactly one current value at a time.
pub type MutationFn = Arc<dyn Fn(Value, &[Value]) -> Value + Send + Sync>;

/// Default TTL applied when a config does not set one.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

/// Fully-enumerated configuration for one store.
///
/// The first registration of a `(scope, name)` pair fixes the
/// configuration; later registrations attach to the existing store and
/// their configs are ignored.
///
/// # Example
///
/// ```rust
/// use scopestack_state::StoreConfig;
/// use serde_json::json;
///
/// let config = StoreConfig::new(json!({"fullName": "", "email": ""}))
///     .persist(true)
///     .ttl(std::time::Duration::from_secs(3600))
///     .method("set_field", |state, args| {
///         let mut state = state;
///         if let (Some(field), Some(value)) = (args.first(), args.get(1)) {
///             if let (Some(obj), Some(field)) = (state.as_object_mut(), field.as_str()) {
///                 obj.insert(field.to_string(), value.clone());
///             }
///         }
///         state
///     });
/// assert!(config.persist);
/// ```
#[derive(Clone)]
pub struct StoreConfig {
    /// Value a fresh store starts from, and the value `reset` returns to.
    pub initial: Value,
    /// Write snapshots through to the persistence layer.
    pub persist: bool,
    /// Maximum snapshot age, measured from the last write.
    pub ttl: Duration,
    /// Number of past states retained for rollback. Zero disables the ring.
    pub history_depth: usize,
    /// Drop the store (and its snapshot) when the last handle goes away.
    pub clear_on_zero_subscribers: bool,
    /// Named mutation methods.
    pub methods: BTreeMap<String, MutationFn>,
}

impl StoreConfig {
    /// A config with the given initial value and defaults everywhere else:
    /// no persistence, [`DEFAULT_TTL`], no rollback ring, retained at zero
    /// subscribers.
    pub fn new(initial: Value) -> Self {
        Self {
            initial,
            persist: false,
            ttl: DEFAULT_TTL,
            history_depth: 0,
            clear_on_zero_subscribers: false,
            methods: BTreeMap::new(),
        }
    }

    /// Enable or disable write-through persistence.
    pub fn persist(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }

    /// Set the TTL window.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Retain up to `depth` past states for rollback.
    pub fn history_depth(mut self, depth: usize) -> Self {
        self.history_depth = depth;
        self
    }

    /// Drop the store when its last handle is released.
    pub fn clear_on_zero_subscribers(mut self, clear: bool) -> Self {
        self.clear_on_zero_subscribers = clear;
        self
    }

    /// Register a mutation method under `name`.
    pub fn method(
        mut self,
        name: &str,
        f: impl Fn(Value, &[Value]) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.methods.insert(name.to_string(), Arc::new(f));
        self
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("initial", &self.initial)
            .field("persist", &self.persist)
            .field("ttl", &self.ttl)
            .field("history_depth", &self.history_depth)
            .field("clear_on_zero_subscribers", &self.clear_on_zero_subscribers)
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}
