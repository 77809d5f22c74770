//! Stack configuration.

use std::collections::BTreeSet;
use std::time::Duration;

use crate::entry::Transition;

/// Default TTL for persisted stack snapshots.
pub const DEFAULT_STACK_TTL: Duration = Duration::from_secs(30 * 60);

/// Configuration for one navigation stack.
///
/// `nav_link` is the set of screen names the stack may hold; the screen
/// components themselves are the host's concern. The root screen `entry`
/// is always part of the set.
///
/// # Example
///
/// ```rust
/// use scopestack_nav::StackConfig;
///
/// let config = StackConfig::new("step1")
///     .screen("step2")
///     .screen("confirm")
///     .sync_history(true);
/// assert!(config.nav_link.contains("step1"));
/// assert_eq!(config.entry, "step1");
/// ```
#[derive(Debug, Clone)]
pub struct StackConfig {
    /// Screen names this stack may navigate to.
    pub nav_link: BTreeSet<String>,
    /// Root screen the stack starts from (and collapses to on reset).
    pub entry: String,
    /// Mirror push/pop onto the platform history.
    pub sync_history: bool,
    /// Persist the entry sequence across mounts.
    pub persist: bool,
    /// Maximum age of a persisted sequence.
    pub ttl: Duration,
    /// Rendering hint forwarded with every notification.
    pub transition: Transition,
}

impl StackConfig {
    /// A config rooted at `entry`, with history sync and persistence off.
    pub fn new(entry: &str) -> Self {
        let mut nav_link = BTreeSet::new();
        nav_link.insert(entry.to_string());
        Self {
            nav_link,
            entry: entry.to_string(),
            sync_history: false,
            persist: false,
            ttl: DEFAULT_STACK_TTL,
            transition: Transition::default(),
        }
    }

    /// Register an additional screen name.
    pub fn screen(mut self, name: &str) -> Self {
        self.nav_link.insert(name.to_string());
        self
    }

    /// Mirror push/pop onto the platform history.
    pub fn sync_history(mut self, sync: bool) -> Self {
        self.sync_history = sync;
        self
    }

    /// Persist the entry sequence across mounts.
    pub fn persist(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }

    /// Set the snapshot TTL.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the transition tag.
    pub fn transition(mut self, transition: Transition) -> Self {
        self.transition = transition;
        self
    }
}
