//! Conversions between Value trees, serde_json and serde types.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;

use dotstore_core::{DotMap, Error, Result, Value};

use crate::codec::JsonCodec;

/// Convert a Rust type to a Value via serde.
pub fn to_value<T: Serialize>(data: &T) -> Result<Value> {
    let json = serde_json::to_value(data)
        .map_err(|e| Error::encode(e.to_string(), Some(e.into())))?;
    Ok(json_to_value(json))
}

/// Convert a Value to a Rust type via serde.
///
/// Non-JSON values go through the encoder fallbacks first, so a timestamp
/// deserializes as a number of seconds.
pub fn from_value<T: DeserializeOwned>(value: &Value) -> Result<T> {
    let json = JsonCodec.to_json(value)?;
    serde_json::from_value(json).map_err(|e| Error::decode(e.to_string()))
}

/// Convert serde_json::Value to our Value.
///
/// Objects become [`DotMap`]s: their keys are normalized and dotted keys are
/// expanded into nested containers, merging with siblings. Keys that cannot
/// be stored (empty or reserved) are dropped with a warning.
pub fn json_to_value(json: JsonValue) -> Value {
    match json {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(b),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                // Fallback for very large numbers
                Value::String(n.to_string())
            }
        }
        JsonValue::String(s) => Value::String(s),
        JsonValue::Array(arr) => Value::Array(arr.into_iter().map(json_to_value).collect()),
        JsonValue::Object(object) => Value::Map(object_to_map(object)),
    }
}

fn object_to_map(object: serde_json::Map<String, JsonValue>) -> DotMap {
    let mut map = DotMap::new();
    for (key, value) in object {
        if let Err(err) = map.update((key.as_str(), json_to_value(value))) {
            log::warn!("Dropping JSON member '{}': {}", key, err);
        }
    }
    map
}
