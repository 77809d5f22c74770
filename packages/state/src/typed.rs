//! Typed access over store handles.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::StateError;
use crate::handle::StoreHandle;
use crate::store::SubscriptionId;

/// A serde-typed wrapper over [`StoreHandle`].
///
/// The underlying store still holds a JSON value; this wrapper
/// deserializes on read so page code works with its own record type.
///
/// # Example
///
/// ```rust
/// use scopestack_state::{ScopeRegistry, StoreConfig};
/// use serde::{Deserialize, Serialize};
/// use serde_json::json;
///
/// #[derive(Debug, PartialEq, Serialize, Deserialize)]
/// struct Signup {
///     full_name: String,
/// }
///
/// let registry = ScopeRegistry::in_memory();
/// let handle = registry
///     .register("signup_flow", "signup", StoreConfig::new(json!({"full_name": ""})))
///     .unwrap()
///     .typed::<Signup>();
///
/// assert_eq!(handle.state().unwrap(), Signup { full_name: String::new() });
/// ```
pub struct TypedStoreHandle<T> {
    inner: StoreHandle,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Serialize + DeserializeOwned> TypedStoreHandle<T> {
    pub fn new(inner: StoreHandle) -> Self {
        Self {
            inner,
            _marker: PhantomData,
        }
    }

    /// The current value, deserialized.
    ///
    /// A value that does not fit `T` is a [`StateError::Decode`]; this can
    /// only happen when the registered mutations produce a shape the type
    /// does not cover.
    pub fn state(&self) -> Result<T, StateError> {
        serde_json::from_value(self.inner.state()).map_err(|e| StateError::Decode(e.to_string()))
    }

    /// Apply a registered mutation method. See [`StoreHandle::mutate`].
    pub fn mutate(&self, method: &str, args: &[Value]) -> Result<(), StateError> {
        self.inner.mutate(method, args)
    }

    /// Return the store to its configured initial value.
    pub fn reset(&self) {
        self.inner.reset();
    }

    /// Step back one state in the rollback ring.
    pub fn rollback(&self) -> bool {
        self.inner.rollback()
    }

    /// Register a callback invoked with the new raw value after every
    /// committed mutation.
    pub fn subscribe(&self, f: impl Fn(&Value) + Send + Sync + 'static) -> SubscriptionId {
        self.inner.subscribe(f)
    }

    /// Remove a previously registered callback.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.inner.unsubscribe(id);
    }

    /// The untyped handle.
    pub fn inner(&self) -> &StoreHandle {
        &self.inner
    }

    /// Unwrap back to the untyped handle.
    pub fn into_inner(self) -> StoreHandle {
        self.inner
    }
}

impl StoreHandle {
    /// Wrap this handle with a serde type.
    pub fn typed<T: Serialize + DeserializeOwned>(self) -> TypedStoreHandle<T> {
        TypedStoreHandle::new(self)
    }
}
