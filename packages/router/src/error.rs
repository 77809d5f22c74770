//! Error types for awaitable navigation.

use std::time::Duration;

use thiserror::Error;

/// Why an awaited navigation did not complete.
///
/// The two reasons are deliberately distinguishable: a caller retries a
/// timeout but gives up on a cancellation, which means a newer navigation
/// already took over.
#[derive(Debug, Error)]
pub enum RouteError {
    /// Superseded by a newer navigation - last caller wins.
    #[error("navigation cancelled by a newer navigation")]
    Cancelled,

    /// The target location was never observed. The primitive is not
    /// retried.
    #[error("navigation to '{path}' timed out after {after:?}")]
    Timeout { path: String, after: Duration },
}
