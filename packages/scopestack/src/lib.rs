//! Scoped state and navigation stacks with TTL persistence and
//! awaitable routing.
//!
//! This crate is the single dependency surface over the layered stack:
//!
//! - [`scopestack-persist`](scopestack_persist) - snapshot keys, TTL
//!   envelopes, store backends
//! - [`scopestack-state`](scopestack_state) - the scope registry and
//!   mutation-governed stores
//! - [`scopestack-nav`](scopestack_nav) - navigation stacks and history
//!   mirroring
//! - [`scopestack-router`](scopestack_router) - awaitable navigation
//!
//! plus the [`Runtime`] coordinator, which owns one of each and exposes
//! the hook-boundary surface page code consumes: `use_stack`, `use_nav`,
//! `router`, `clear_scope`.
//!
//! # Example
//!
//! ```rust
//! use scopestack::{Runtime, StackConfig, StoreConfig};
//! use serde_json::json;
//!
//! let runtime = Runtime::in_memory();
//!
//! let signup = runtime
//!     .use_stack(
//!         "signup_flow",
//!         "signup",
//!         StoreConfig::new(json!({"fullName": ""})).method("set_name", |mut state, args| {
//!             if let (Some(obj), Some(name)) = (state.as_object_mut(), args.first()) {
//!                 obj.insert("fullName".to_string(), name.clone());
//!             }
//!             state
//!         }),
//!     )
//!     .unwrap();
//! signup.mutate("set_name", &[json!("Ada Lovelace")]).unwrap();
//!
//! let nav = runtime
//!     .use_nav("signup", StackConfig::new("step1").screen("step2"))
//!     .unwrap();
//! nav.push("step2", serde_json::Map::new()).unwrap();
//! assert_eq!(nav.peek().name, "step2");
//! ```

mod runtime;

pub use runtime::{
    fake_platform, PersistenceBackend, Platform, Runtime, RuntimeConfig,
};

pub use scopestack_persist::{
    Clock, FileStore, KeyError, ManualClock, MemoryStore, PersistError, SharedSnapshots, Snapshot,
    SnapshotStore, StoreKey, SystemClock, NAV_SCOPE, SNAPSHOT_VERSION,
};

pub use scopestack_state::{
    MutationFn, ScopeRegistry, StateError, StoreConfig, StoreHandle, SubscriptionId,
    TypedStoreHandle, DEFAULT_TTL,
};

pub use scopestack_nav::{
    FakeHistory, HistoryMarker, HistorySync, NavEntry, NavError, StackConfig, StackController,
    StackPhase, StackSubscriptionId, Transition, DEFAULT_STACK_TTL,
};

pub use scopestack_router::{
    AwaitableRouter, FakeLocation, FakeNavigator, LocationSource, NavigateMode, Navigator,
    RouteError, RouterConfig,
};
