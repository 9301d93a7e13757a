//! The Value type held at every node of a [`DotMap`] tree.

use chrono::{DateTime, Utc};

use crate::dot_map::DotMap;
use crate::encodable::{Encodable, Opaque};

/// A value stored in a [`DotMap`].
///
/// JSON-native scalars and sequences map directly onto JSON. `Bytes`,
/// `Timestamp` and `Object` are carried as-is and only resolved when the
/// tree is encoded.
///
/// Equality is structural: nested containers compare by content, unlike
/// [`DotMap`] itself, which compares by instance.
#[derive(Clone, Debug, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    /// Raw payload; encoded as UTF-8 text.
    Bytes(Vec<u8>),
    /// Point in time; encoded as epoch seconds.
    Timestamp(DateTime<Utc>),
    Array(Vec<Value>),
    /// Nested container.
    Map(DotMap),
    /// Host object with encoder hooks.
    Object(Opaque),
}

impl Value {
    /// Create an empty nested container.
    pub fn map() -> Self {
        Value::Map(DotMap::new())
    }

    /// Wrap a host object.
    pub fn object(object: impl Encodable + 'static) -> Self {
        Value::Object(Opaque::new(object))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    pub fn as_map(&self) -> Option<&DotMap> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut DotMap> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Short name of the variant, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Timestamp(_) => "timestamp",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Object(_) => "object",
        }
    }
}

// Conversion from common types

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a.content_eq(b),
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl From<DotMap> for Value {
    fn from(v: DotMap) -> Self {
        Value::Map(v)
    }
}

impl From<Opaque> for Value {
    fn from(v: Opaque) -> Self {
        Value::Object(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_conversions() {
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(3i32), Value::Integer(3));
        assert_eq!(Value::from("x"), Value::String("x".to_string()));
        assert_eq!(Value::from(b"raw".to_vec()), Value::Bytes(b"raw".to_vec()));
        assert_eq!(Value::from(None::<i64>), Value::Null);
    }

    #[test]
    fn vec_conversion_builds_arrays() {
        assert_eq!(
            Value::from(vec![1i64, 2, 3]),
            Value::Array(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)])
        );
    }

    #[test]
    fn accessors() {
        assert_eq!(Value::from(2i64).as_f64(), Some(2.0));
        assert_eq!(Value::from("s").as_str(), Some("s"));
        assert_eq!(Value::from(1.5).as_i64(), None);
        assert!(Value::map().is_map());
        assert!(Value::Null.is_null());
    }

    #[test]
    fn maps_compare_by_content() {
        let mut a = DotMap::new();
        a.set("name", "a").unwrap();
        let mut b = DotMap::new();
        b.set("name", "a").unwrap();
        assert_ne!(a, b);

        assert_eq!(Value::from(a.clone()), Value::from(b.clone()));
        assert_eq!(
            Value::Array(vec![Value::from(a)]),
            Value::Array(vec![Value::from(b)])
        );

        let mut c = DotMap::new();
        c.set("name", "c").unwrap();
        assert_ne!(Value::map(), Value::from(c));
    }

    #[test]
    fn type_names() {
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::map().type_name(), "map");
        assert_eq!(Value::from(Utc::now()).type_name(), "timestamp");
    }
}
