//! Navigation stacks: push/pop screen sequences independent of the
//! platform's native history, optionally mirrored onto it.
//!
//! A stack is an ordered sequence of named screen entries with the most
//! recently pushed on top. The [`StackController`] owns the sequence;
//! page code pushes and pops by screen name, the rendering layer
//! subscribes to top-entry changes, and - when configured - the sequence
//! persists across mounts and mirrors onto the platform history so the
//! native back gesture pops the stack instead of leaving the page.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use scopestack_nav::{FakeHistory, StackConfig, StackController};
//! use scopestack_persist::SystemClock;
//! use serde_json::Map;
//!
//! let history = Arc::new(FakeHistory::new());
//! let stack = StackController::create(
//!     "signup",
//!     StackConfig::new("step1").screen("step2").sync_history(true),
//!     None,
//!     Some(history.clone()),
//!     Arc::new(SystemClock),
//! )
//! .unwrap();
//!
//! stack.push("step2", Map::new()).unwrap();
//! assert_eq!(history.len(), 1);
//!
//! // The platform back gesture travels through the history marker.
//! let marker = history.back_gesture("signup");
//! stack.handle_history_pop(&marker);
//! assert_eq!(stack.peek().name, "step1");
//! ```

mod config;
mod controller;
mod entry;
mod error;
mod history;

pub use config::{StackConfig, DEFAULT_STACK_TTL};
pub use controller::{StackController, StackPhase, StackSubscriptionId};
pub use entry::{NavEntry, Transition};
pub use error::NavError;
pub use history::{FakeHistory, HistoryMarker, HistorySync};
