//! Store keys: validated `(scope, name)` pairs.

use std::fmt;

/// Errors related to key parsing and validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// A key component is not a valid identifier.
    InvalidComponent {
        component: String,
        message: String,
    },
    /// The key string is invalid.
    InvalidKey { message: String },
}

impl fmt::Display for KeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyError::InvalidComponent { component, message } => {
                write!(f, "invalid key component '{}': {}", component, message)
            }
            KeyError::InvalidKey { message } => {
                write!(f, "invalid key: {}", message)
            }
        }
    }
}

impl std::error::Error for KeyError {}

/// Scope under which navigation stack snapshots are persisted.
pub const NAV_SCOPE: &str = "navstack";

/// A validated snapshot key.
///
/// A key identifies one store within one scope and renders as
/// `"{scope}:{name}"` — the schema under which snapshots are persisted.
/// Both components must be identifiers: ASCII letters, digits and
/// underscores, not starting with a digit.
///
/// # Examples
///
/// ```rust
/// use scopestack_persist::StoreKey;
///
/// let key = StoreKey::new("signup_flow", "signup").unwrap();
/// assert_eq!(key.to_string(), "signup_flow:signup");
///
/// let parsed = StoreKey::parse("signup_flow:signup").unwrap();
/// assert_eq!(parsed, key);
/// ```
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct StoreKey {
    scope: String,
    name: String,
}

impl StoreKey {
    /// Create a key from scope and store name, validating both components.
    pub fn new(scope: &str, name: &str) -> Result<Self, KeyError> {
        Self::validate_component(scope)?;
        Self::validate_component(name)?;
        Ok(StoreKey {
            scope: scope.to_string(),
            name: name.to_string(),
        })
    }

    /// Parse a rendered key of the form `"{scope}:{name}"`.
    pub fn parse(s: &str) -> Result<Self, KeyError> {
        let Some((scope, name)) = s.split_once(':') else {
            return Err(KeyError::InvalidKey {
                message: format!("expected 'scope:name', got '{}'", s),
            });
        };
        if name.contains(':') {
            return Err(KeyError::InvalidKey {
                message: format!("more than one ':' in '{}'", s),
            });
        }
        Self::new(scope, name)
    }

    /// The key for a navigation stack snapshot: `"navstack:{id}"`.
    pub fn nav_stack(id: &str) -> Result<Self, KeyError> {
        Self::new(NAV_SCOPE, id)
    }

    /// The scope component.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// The store name component.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn validate_component(component: &str) -> Result<(), KeyError> {
        if component.is_empty() {
            return Err(KeyError::InvalidComponent {
                component: component.to_string(),
                message: "must not be empty".to_string(),
            });
        }
        let mut chars = component.chars();
        let first = chars.next().unwrap_or_default();
        if first.is_ascii_digit() {
            return Err(KeyError::InvalidComponent {
                component: component.to_string(),
                message: "must not start with a digit".to_string(),
            });
        }
        for c in component.chars() {
            if !c.is_ascii_alphanumeric() && c != '_' {
                return Err(KeyError::InvalidComponent {
                    component: component.to_string(),
                    message: format!("'{}' is not a letter, digit or underscore", c),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.scope, self.name)
    }
}
