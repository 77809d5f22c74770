//! The awaitable router.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::oneshot;

use crate::error::RouteError;
use crate::traits::{LocationSource, NavigateMode, Navigator};

/// Waiting policy for the router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// How long to wait for the target location before giving up.
    pub timeout: Duration,
    /// How often the location is polled.
    ///
    /// Polling, not change events: some navigation primitives do not
    /// reliably signal completion, and a short poll is robust against
    /// missed events.
    pub poll_interval: Duration,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(50),
        }
    }
}

/// The single in-flight navigation slot.
struct PendingNavigation {
    target: String,
    generation: u64,
    cancel: oneshot::Sender<()>,
}

/// Turns the fire-and-forget navigation primitive into a future that
/// resolves when the target location is actually observed.
///
/// At most one navigation is pending at a time: a new call supersedes the
/// previous one, whose future fails with [`RouteError::Cancelled`]. A
/// target equal to the current location resolves immediately without
/// issuing a navigation, and a target never observed within the timeout
/// fails with [`RouteError::Timeout`].
///
/// # Example
///
/// ```ignore
/// use scopestack_router::{AwaitableRouter, FakeLocation, FakeNavigator};
/// use std::sync::Arc;
///
/// let location = FakeLocation::new("/");
/// let navigator = Arc::new(FakeNavigator::new(location.clone()));
/// let router = AwaitableRouter::new(navigator, Arc::new(location));
///
/// router.push_and_wait("/missions").await?;
/// // The location now reads "/missions".
/// ```
pub struct AwaitableRouter {
    navigator: Arc<dyn Navigator>,
    location: Arc<dyn LocationSource>,
    config: RouterConfig,
    pending: Mutex<Option<PendingNavigation>>,
    generation: AtomicU64,
}

impl AwaitableRouter {
    /// A router with the default waiting policy.
    pub fn new(navigator: Arc<dyn Navigator>, location: Arc<dyn LocationSource>) -> Self {
        Self::with_config(navigator, location, RouterConfig::default())
    }

    pub fn with_config(
        navigator: Arc<dyn Navigator>,
        location: Arc<dyn LocationSource>,
        config: RouterConfig,
    ) -> Self {
        Self {
            navigator,
            location,
            config,
            pending: Mutex::new(None),
            generation: AtomicU64::new(0),
        }
    }

    fn lock_pending(&self) -> MutexGuard<'_, Option<PendingNavigation>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The target of the navigation currently in flight, if any.
    pub fn pending_target(&self) -> Option<String> {
        self.lock_pending().as_ref().map(|p| p.target.clone())
    }

    /// Push a navigation and wait for the location to reach `path`.
    pub async fn push_and_wait(&self, path: &str) -> Result<(), RouteError> {
        self.navigate_and_wait(NavigateMode::Push, path).await
    }

    /// Replace the current entry and wait for the location to reach
    /// `path`.
    pub async fn replace_and_wait(&self, path: &str) -> Result<(), RouteError> {
        self.navigate_and_wait(NavigateMode::Replace, path).await
    }

    async fn navigate_and_wait(&self, mode: NavigateMode, path: &str) -> Result<(), RouteError> {
        let target = normalize(path);
        if normalize(&self.location.current()) == target {
            return Ok(());
        }

        let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut pending = self.lock_pending();
            if let Some(previous) = pending.take() {
                // Last caller wins; the superseded waiter fails.
                let _ = previous.cancel.send(());
            }
            *pending = Some(PendingNavigation {
                target: target.clone(),
                generation,
                cancel: cancel_tx,
            });
        }

        self.navigator.navigate(mode, &target);
        tracing::debug!(path = %target, ?mode, "navigation issued");

        let deadline = tokio::time::Instant::now() + self.config.timeout;
        let mut poll = tokio::time::interval(self.config.poll_interval);
        loop {
            tokio::select! {
                _ = &mut cancel_rx => {
                    return Err(RouteError::Cancelled);
                }
                _ = poll.tick() => {
                    if normalize(&self.location.current()) == target {
                        self.release(generation);
                        return Ok(());
                    }
                    if tokio::time::Instant::now() >= deadline {
                        self.release(generation);
                        tracing::warn!(path = %target, "navigation never observed");
                        return Err(RouteError::Timeout {
                            path: target,
                            after: self.config.timeout,
                        });
                    }
                }
            }
        }
    }

    // Clear the slot, but only if it still belongs to this navigation;
    // a newer one may own it by now.
    fn release(&self, generation: u64) {
        let mut pending = self.lock_pending();
        if pending.as_ref().is_some_and(|p| p.generation == generation) {
            *pending = None;
        }
    }
}

/// Normalize trailing slashes so `/missions/` and `/missions` compare
/// equal. The bare root stays `/`.
fn normalize(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_trailing_slashes() {
        assert_eq!(normalize("/missions/"), "/missions");
        assert_eq!(normalize("/missions///"), "/missions");
        assert_eq!(normalize("/missions"), "/missions");
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize(""), "/");
    }
}
