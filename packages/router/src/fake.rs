//! In-memory platform doubles for tests and demos.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::traits::{LocationSource, NavigateMode, Navigator};

/// A shared, settable location.
#[derive(Debug, Clone, Default)]
pub struct FakeLocation {
    current: Arc<Mutex<String>>,
}

impl FakeLocation {
    pub fn new(initial: &str) -> Self {
        Self {
            current: Arc::new(Mutex::new(initial.to_string())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, String> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move the location, as the platform would after a navigation.
    pub fn set(&self, path: &str) {
        *self.lock() = path.to_string();
    }
}

impl LocationSource for FakeLocation {
    fn current(&self) -> String {
        self.lock().clone()
    }
}

enum Completion {
    Immediate,
    After(Duration),
    /// Issue but never complete, for exercising timeouts.
    Never,
}

/// A navigator that moves a [`FakeLocation`], immediately or after a
/// delay. Delayed completion runs on a tokio task, so delayed navigators
/// need an ambient runtime.
pub struct FakeNavigator {
    location: FakeLocation,
    completion: Completion,
    issued: Mutex<Vec<(NavigateMode, String)>>,
}

impl FakeNavigator {
    /// Completes navigations synchronously.
    pub fn new(location: FakeLocation) -> Self {
        Self {
            location,
            completion: Completion::Immediate,
            issued: Mutex::new(Vec::new()),
        }
    }

    /// Completes navigations after `delay`.
    pub fn with_delay(location: FakeLocation, delay: Duration) -> Self {
        Self {
            location,
            completion: Completion::After(delay),
            issued: Mutex::new(Vec::new()),
        }
    }

    /// Issues navigations that never complete.
    pub fn stalled(location: FakeLocation) -> Self {
        Self {
            location,
            completion: Completion::Never,
            issued: Mutex::new(Vec::new()),
        }
    }

    /// Every navigation issued so far, in order.
    pub fn issued(&self) -> Vec<(NavigateMode, String)> {
        self.issued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for FakeNavigator {
    fn navigate(&self, mode: NavigateMode, path: &str) {
        self.issued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((mode, path.to_string()));
        match self.completion {
            Completion::Immediate => self.location.set(path),
            Completion::After(delay) => {
                let location = self.location.clone();
                let path = path.to_string();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    location.set(&path);
                });
            }
            Completion::Never => {}
        }
    }
}
