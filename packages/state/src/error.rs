//! Error types for the state registry.
//!
//! Only configuration errors (an unregistered mutation method, an invalid
//! key) are surfaced to callers. Data-level conditions - missing or stale
//! snapshots, decode failures during hydration - degrade to the configured
//! initial value, and persistence I/O failures are logged and swallowed.

use thiserror::Error;

use scopestack_persist::KeyError;

/// Errors from registry and store operations.
#[derive(Debug, Error)]
pub enum StateError {
    /// The mutation method was never registered in the store's config.
    /// This is a programming error and fails loudly.
    #[error("unknown mutation method '{method}' on store {scope}:{store}")]
    UnknownMethod {
        scope: String,
        store: String,
        method: String,
    },

    /// A typed read could not deserialize the current value.
    #[error("decode error: {0}")]
    Decode(String),

    /// A scope or store name failed validation.
    #[error(transparent)]
    Key(#[from] KeyError),
}
