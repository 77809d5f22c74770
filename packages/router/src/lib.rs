//! Awaitable navigation over a fire-and-forget primitive.
//!
//! The platform's navigation call returns before the navigation lands,
//! and some primitives never reliably signal completion. This crate
//! wraps the primitive in an [`AwaitableRouter`] whose `push_and_wait` /
//! `replace_and_wait` resolve only once the ambient location is observed
//! to equal the target, with explicit supersede and timeout semantics:
//!
//! - at most one navigation is pending; a newer call cancels the older
//!   waiter ([`RouteError::Cancelled`]),
//! - a target never observed within the timeout fails
//!   ([`RouteError::Timeout`]) and the primitive is not retried,
//! - a target equal to the current location resolves immediately.
//!
//! The platform side is two small traits, [`Navigator`] and
//! [`LocationSource`]; [`FakeNavigator`] and [`FakeLocation`] ship for
//! tests and demos.

mod error;
mod fake;
mod router;
mod traits;

pub use error::RouteError;
pub use fake::{FakeLocation, FakeNavigator};
pub use router::{AwaitableRouter, RouterConfig};
pub use traits::{LocationSource, NavigateMode, Navigator};
