//! Navigation entries and transition tags.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One screen instance on a stack.
///
/// Immutable once pushed; an entry only leaves the stack by being popped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavEntry {
    /// Screen name, registered in the stack's `nav_link`.
    pub name: String,
    /// Parameters handed to the screen on mount.
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl NavEntry {
    /// An entry with no parameters.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            params: Map::new(),
        }
    }

    /// An entry carrying parameters.
    pub fn with_params(name: &str, params: Map<String, Value>) -> Self {
        Self {
            name: name.to_string(),
            params,
        }
    }
}

/// Rendering hint attached to stack notifications.
///
/// Purely presentational: the tag has no effect on stack contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    Slide,
    Fade,
    #[default]
    None,
}
