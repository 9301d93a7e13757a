//! JSON codec with an encoding fallback chain.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;

use dotstore_core::{DotMap, Encodable, Entries, Error, Result, Value};

use crate::convert::json_to_value;

const INDENT: &[u8] = b"    ";

/// A codec between [`Value`] trees and JSON text.
///
/// Output is pretty-printed with four-space indentation and sorted keys.
/// Values serde_json cannot represent go through a fallback chain:
///
/// 1. timestamps become epoch seconds (a float);
/// 2. bytes are decoded as UTF-8 and encoded as the resulting string;
/// 3. objects use their [`Encodable::to_value`] hook,
/// 4. else their [`Encodable::to_json_string`] hook,
/// 5. else their [`Encodable::repr`] string (non-finite floats too).
///
/// A failing step aborts the whole encoding with [`Error::Encode`].
///
/// # Example
///
/// ```rust
/// use dotstore_core::DotMap;
/// use dotstore_serde::JsonCodec;
///
/// let mut map = DotMap::new();
/// map.set("a.b", 1i64).unwrap();
///
/// let text = JsonCodec.encode_map(&map).unwrap();
/// assert_eq!(text, "{\n    \"a\": {\n        \"b\": 1\n    }\n}");
///
/// let back = JsonCodec.loads(&text).unwrap();
/// assert!(back.content_eq(&map));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl JsonCodec {
    /// Encode any value as JSON text.
    pub fn encode(&self, value: &Value) -> Result<String> {
        render(&self.to_json(value)?)
    }

    /// Encode a container as a JSON object.
    pub fn encode_map(&self, map: &DotMap) -> Result<String> {
        render(&JsonValue::Object(self.to_plain(map)?))
    }

    /// Encode an arbitrary serializable object graph.
    pub fn encode_serialize<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = serde_json::to_value(data)
            .map_err(|e| Error::encode(e.to_string(), Some(e.into())))?;
        self.encode(&json_to_value(json))
    }

    /// Convert a container into a plain JSON object.
    pub fn to_plain(&self, map: &DotMap) -> Result<serde_json::Map<String, JsonValue>> {
        map.iter()
            .map(|(key, value)| Ok::<_, Error>((key.clone(), self.to_json(value)?)))
            .collect()
    }

    /// Convert a value to serde_json, applying the fallback chain.
    pub fn to_json(&self, value: &Value) -> Result<JsonValue> {
        Ok(match value {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Integer(i) => JsonValue::from(*i),
            Value::Float(f) => match serde_json::Number::from_f64(*f) {
                Some(n) => JsonValue::Number(n),
                None => self.fallback(value)?,
            },
            Value::String(s) => JsonValue::String(s.clone()),
            Value::Array(items) => JsonValue::Array(
                items
                    .iter()
                    .map(|item| self.to_json(item))
                    .collect::<Result<_>>()?,
            ),
            Value::Map(map) => JsonValue::Object(self.to_plain(map)?),
            Value::Bytes(_) | Value::Timestamp(_) | Value::Object(_) => self.fallback(value)?,
        })
    }

    /// Parse JSON text into a value.
    pub fn decode(&self, text: &str) -> Result<Value> {
        let json: JsonValue =
            serde_json::from_str(text).map_err(|e| Error::decode(e.to_string()))?;
        Ok(json_to_value(json))
    }

    /// Parse JSON text into a container.
    ///
    /// The text must hold an object or an array of `[key, value]` pairs.
    pub fn loads(&self, text: &str) -> Result<DotMap> {
        DotMap::from_entries(Entries::try_from(self.decode(text)?)?)
    }

    fn fallback(&self, value: &Value) -> Result<JsonValue> {
        match value {
            Value::Timestamp(ts) => Ok(epoch_seconds(ts)),
            Value::Bytes(bytes) => {
                let text = std::str::from_utf8(bytes).map_err(|e| {
                    Error::encode(format!("bytes are not valid UTF-8: {}", e), Some(e.into()))
                })?;
                self.to_json(&Value::String(text.to_string()))
            }
            Value::Object(object) => self.encode_object(object.get()),
            other => Ok(JsonValue::String(repr(other))),
        }
    }

    fn encode_object(&self, object: &dyn Encodable) -> Result<JsonValue> {
        if let Some(result) = object.to_value() {
            let value = result.map_err(|e| {
                Error::encode(format!("to_value hook failed for {:?}: {}", object, e), Some(e))
            })?;
            return self.to_json(&value);
        }
        if let Some(result) = object.to_json_string() {
            let text = result.map_err(|e| {
                let message = format!("to_json_string hook failed for {:?}: {}", object, e);
                Error::encode(message, Some(e))
            })?;
            return Ok(JsonValue::String(text));
        }
        object
            .repr()
            .map(JsonValue::String)
            .map_err(|e| Error::encode(format!("repr failed: {}", e), Some(e)))
    }
}

fn epoch_seconds(ts: &DateTime<Utc>) -> JsonValue {
    let seconds = ts.timestamp() as f64 + f64::from(ts.timestamp_subsec_nanos()) / 1e9;
    JsonValue::from(seconds)
}

fn repr(value: &Value) -> String {
    match value {
        Value::Float(f) => f.to_string(),
        other => format!("{:?}", other),
    }
}

fn render(json: &JsonValue) -> Result<String> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    json.serialize(&mut serializer)
        .map_err(|e| Error::encode(e.to_string(), Some(e.into())))?;
    String::from_utf8(out).map_err(|e| Error::encode(e.to_string(), Some(e.into())))
}

/// Encode a value with [`JsonCodec`].
pub fn encode(value: &Value) -> Result<String> {
    JsonCodec.encode(value)
}

/// Parse JSON text into a container with [`JsonCodec`].
pub fn loads(text: &str) -> Result<DotMap> {
    JsonCodec.loads(text)
}

/// Update `map` from a saved state: JSON text or another container.
///
/// Anything else is rejected with [`Error::InvalidState`].
pub fn restore(map: &mut DotMap, state: Value) -> Result<()> {
    match state {
        Value::String(text) => map.update(loads(&text)?),
        Value::Map(other) => map.update(other),
        other => Err(Error::InvalidState {
            message: format!(
                "value is not a JSON string or mapping: type -> {}",
                other.type_name()
            ),
        }),
    }
}

/// JSON helpers on [`DotMap`].
pub trait DotMapJson {
    /// Plain JSON object mirroring the container.
    fn to_plain(&self) -> Result<serde_json::Map<String, JsonValue>>;

    /// Pretty-printed JSON text of the container.
    fn to_json_string(&self) -> Result<String>;
}

impl DotMapJson for DotMap {
    fn to_plain(&self) -> Result<serde_json::Map<String, JsonValue>> {
        JsonCodec.to_plain(self)
    }

    fn to_json_string(&self) -> Result<String> {
        JsonCodec.encode_map(self)
    }
}
