//! Error types for the persistence layer.

use std::path::PathBuf;

use thiserror::Error;

use crate::key::KeyError;

/// Errors from snapshot store operations.
///
/// Reads never fail on bad payloads: a snapshot that cannot be parsed is
/// reported as absent. These errors cover I/O and setup failures only.
#[derive(Debug, Error)]
pub enum PersistError {
    /// The backing root path is missing, not a directory, or not writable.
    #[error("invalid store root {path}: {source}")]
    RootPathInvalid {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An I/O operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be serialized for writing.
    #[error("encode error: {0}")]
    Encode(String),

    /// A key failed validation.
    #[error("key error: {0}")]
    Key(#[from] KeyError),
}
