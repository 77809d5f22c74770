//! Scoped state containers sharing one registry.
//!
//! A *scope* is a namespace grouping stores that share a clear/teardown
//! lifecycle - one signup flow, one mission flow. A *store* is a single
//! named piece of state inside a scope, governed by named pure mutation
//! functions, persisted (optionally) through
//! [`scopestack-persist`](scopestack_persist), and reference-counted so it
//! survives remounts but not abandonment.
//!
//! The [`ScopeRegistry`] owns every store; components hold
//! [`StoreHandle`]s. Handles are cheap, cloneable, and RAII: dropping the
//! last one triggers the store's configured eviction policy.
//!
//! # Example
//!
//! ```rust
//! use scopestack_state::{ScopeRegistry, StoreConfig};
//! use serde_json::json;
//!
//! let registry = ScopeRegistry::in_memory();
//!
//! let counter = registry
//!     .register(
//!         "mission_flow",
//!         "progress",
//!         StoreConfig::new(json!(0))
//!             .method("advance", |state, _| json!(state.as_i64().unwrap_or(0) + 1)),
//!     )
//!     .unwrap();
//!
//! counter.mutate("advance", &[]).unwrap();
//! counter.mutate("advance", &[]).unwrap();
//! assert_eq!(counter.state(), json!(2));
//!
//! // Unknown methods are a programming error and fail loudly.
//! assert!(counter.mutate("warp", &[]).is_err());
//! ```

mod config;
mod error;
mod handle;
mod registry;
mod store;
mod typed;

pub use config::{MutationFn, StoreConfig, DEFAULT_TTL};
pub use error::StateError;
pub use handle::StoreHandle;
pub use registry::ScopeRegistry;
pub use scopestack_persist::SharedSnapshots;
pub use store::SubscriptionId;
pub use typed::TypedStoreHandle;
