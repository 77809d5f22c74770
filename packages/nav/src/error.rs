//! Error types for navigation stacks.

use thiserror::Error;

use scopestack_persist::KeyError;

/// Errors from stack creation and navigation.
///
/// Every variant is a configuration error - a programming mistake caught
/// synchronously. Runtime conditions (a missing or stale persisted
/// sequence, a history desync) degrade gracefully and never surface here.
#[derive(Debug, Error)]
pub enum NavError {
    /// The screen name is not registered in the stack's `nav_link`.
    #[error("unknown screen '{name}' on stack '{stack_id}'")]
    UnknownScreen { stack_id: String, name: String },

    /// The config enables `sync_history` but no history was provided.
    #[error("stack '{stack_id}' syncs history but no history sync was provided")]
    MissingHistory { stack_id: String },

    /// The config enables `persist` but no snapshot store was provided.
    #[error("stack '{stack_id}' persists but no snapshot store was provided")]
    MissingPersistence { stack_id: String },

    /// The stack id failed key validation.
    #[error(transparent)]
    Key(#[from] KeyError),
}
