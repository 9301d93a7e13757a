//! Host objects stored opaquely inside a container.

use std::fmt;
use std::sync::Arc;

use crate::error::HookError;
use crate::value::Value;

/// Conversion hooks consulted by the JSON encoder for opaque values.
///
/// The encoder tries [`to_value`](Encodable::to_value) first, then
/// [`to_json_string`](Encodable::to_json_string), then falls back to
/// [`repr`](Encodable::repr). A hook returning `Some(Err(_))` aborts the
/// encoding with an encode error.
pub trait Encodable: fmt::Debug + Send + Sync {
    /// Structured JSON form of the object.
    fn to_value(&self) -> Option<Result<Value, HookError>> {
        None
    }

    /// Pre-rendered text form, stored as a JSON string.
    fn to_json_string(&self) -> Option<Result<String, HookError>> {
        None
    }

    /// Last-resort textual representation.
    fn repr(&self) -> Result<String, HookError> {
        Ok(format!("{:?}", self))
    }
}

/// Shared handle to an [`Encodable`] object.
///
/// Two handles are equal only when they point at the same object.
#[derive(Clone)]
pub struct Opaque(Arc<dyn Encodable>);

impl Opaque {
    pub fn new(object: impl Encodable + 'static) -> Self {
        Opaque(Arc::new(object))
    }

    pub fn get(&self) -> &dyn Encodable {
        self.0.as_ref()
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl PartialEq for Opaque {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl From<Arc<dyn Encodable>> for Opaque {
    fn from(object: Arc<dyn Encodable>) -> Self {
        Opaque(object)
    }
}
