//! The platform navigation boundary.

/// How a navigation is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigateMode {
    /// Add an entry to the platform history.
    Push,
    /// Replace the current entry.
    Replace,
}

/// The platform's fire-and-forget navigation primitive.
///
/// Issuing a navigation signals nothing about completion - some
/// primitives do not reliably report it at all. The router compensates
/// by observing the location instead of trusting the primitive.
pub trait Navigator: Send + Sync {
    fn navigate(&self, mode: NavigateMode, path: &str);
}

/// Read the ambient location.
pub trait LocationSource: Send + Sync {
    fn current(&self) -> String;
}
