//! KV record shape and payload decoding.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

use dotstore_core::{DotMap, Key, Value};
use dotstore_serde::json_to_value;

/// Field names of a KV listing entry.
pub const SIGNATURE: [&str; 7] = [
    "CreateIndex",
    "Flags",
    "Key",
    "LockIndex",
    "ModifyIndex",
    "Session",
    "Value",
];

pub const KEY_FIELD: &str = "Key";
pub const VALUE_FIELD: &str = "Value";

/// How many signature fields a record may omit.
const SIGNATURE_SLACK: usize = 2;

/// Decoding switches for record payloads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KvOptions {
    /// Treat textual payloads as base64, the way the Consul HTTP API returns
    /// them. Text that is not valid base64 is decoded as-is.
    pub decode_base64: bool,
}

impl KvOptions {
    pub fn base64() -> Self {
        Self {
            decode_base64: true,
        }
    }
}

/// One entry of a KV listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KvRecord {
    #[serde(default)]
    pub create_index: u64,
    #[serde(default)]
    pub modify_index: u64,
    #[serde(default)]
    pub lock_index: u64,
    #[serde(default)]
    pub flags: u64,
    pub key: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
}

impl KvRecord {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
            ..Default::default()
        }
    }

    /// The record's key as a dotted path.
    pub fn path(&self) -> Key {
        Key::hierarchical(&self.key)
    }

    /// The record's payload before decoding.
    pub fn raw_value(&self) -> Value {
        self.value.clone().map(Value::String).unwrap_or_default()
    }
}

/// Whether `map` looks like a KV listing entry.
///
/// At most two of the signature fields may be missing, and `Key` and `Value`
/// must both be present.
pub fn is_record(map: &DotMap) -> bool {
    let present = SIGNATURE.iter().filter(|name| map.contains(**name)).count();
    present >= SIGNATURE.len() - SIGNATURE_SLACK
        && map.contains(KEY_FIELD)
        && map.contains(VALUE_FIELD)
}

/// Turn a record's `Key` field into a dotted path.
pub fn record_key(value: &Value) -> Option<Key> {
    match value {
        Value::String(s) => Some(Key::hierarchical(s)),
        Value::Bytes(b) => Some(Key::hierarchical(String::from_utf8_lossy(b))),
        Value::Integer(i) => Some(Key::hierarchical(i.to_string())),
        _ => None,
    }
}

/// Decode a record payload.
///
/// Text and bytes are parsed as JSON, so `"\"1.2.3.4\""` becomes the string
/// `1.2.3.4` and `{"port": 80}` becomes a container. Text that is not JSON is
/// kept as it is. Bytes that are not UTF-8 stay bytes. Payloads rendered as a
/// byte literal (`b'"..."'`) are unwrapped first. Other values pass through.
pub fn decode_value(value: Value, options: &KvOptions) -> Value {
    match value {
        Value::String(text) => {
            if options.decode_base64 {
                match STANDARD.decode(text.as_bytes()) {
                    Ok(bytes) => return decode_bytes(bytes),
                    Err(err) => log::debug!("Payload is not base64 ({}), decoding as text", err),
                }
            }
            decode_text(text)
        }
        Value::Bytes(bytes) => decode_bytes(bytes),
        other => other,
    }
}

fn decode_bytes(bytes: Vec<u8>) -> Value {
    match String::from_utf8(bytes) {
        Ok(text) => decode_text(text),
        Err(err) => Value::Bytes(err.into_bytes()),
    }
}

fn decode_text(text: String) -> Value {
    let payload = unwrap_byte_literal(&text).unwrap_or(&text);
    match serde_json::from_str(payload) {
        Ok(json) => json_to_value(json),
        Err(_) => Value::String(text),
    }
}

/// `b'"x"'` -> `"x"`
fn unwrap_byte_literal(text: &str) -> Option<&str> {
    text.strip_prefix("b'")
        .and_then(|rest| rest.strip_suffix('\''))
        .filter(|inner| inner.starts_with('"'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_map(fields: &[&str]) -> DotMap {
        let mut map = DotMap::new();
        for field in fields {
            map.set(*field, 0i64).unwrap();
        }
        map
    }

    #[test]
    fn full_signature_is_record() {
        assert!(is_record(&record_map(&SIGNATURE)));
    }

    #[test]
    fn two_missing_fields_are_tolerated() {
        let map = record_map(&["Key", "Value", "CreateIndex", "ModifyIndex", "Flags"]);
        assert!(is_record(&map));

        let map = record_map(&["Key", "Value", "CreateIndex", "Flags"]);
        assert!(!is_record(&map));
    }

    #[test]
    fn key_and_value_are_required() {
        let map = record_map(&[
            "Key",
            "CreateIndex",
            "ModifyIndex",
            "LockIndex",
            "Flags",
            "Session",
        ]);
        assert!(!is_record(&map));
    }

    #[test]
    fn record_keys_are_hierarchical() {
        assert_eq!(
            record_key(&Value::from("svc/1/addr")).unwrap().as_str(),
            "svc.1.addr"
        );
        assert_eq!(
            record_key(&Value::Bytes(b"/a//b/".to_vec())).unwrap().as_str(),
            "a.b"
        );
        assert_eq!(record_key(&Value::Integer(7)).unwrap().as_str(), "7");
        assert!(record_key(&Value::Null).is_none());
    }

    #[test]
    fn quoted_string_unwraps() {
        let options = KvOptions::default();
        assert_eq!(
            decode_value(Value::from("\"1.2.3.4\""), &options),
            Value::from("1.2.3.4")
        );
    }

    #[test]
    fn json_payloads_decode() {
        let options = KvOptions::default();
        assert_eq!(decode_value(Value::from("42"), &options), Value::Integer(42));
        assert_eq!(decode_value(Value::from("true"), &options), Value::Bool(true));

        let decoded = decode_value(Value::from(r#"{"port": 8080}"#), &options);
        assert_eq!(decoded.as_map().unwrap().get("port"), Some(&Value::Integer(8080)));
    }

    #[test]
    fn plain_text_is_kept() {
        let options = KvOptions::default();
        assert_eq!(
            decode_value(Value::from("not json"), &options),
            Value::from("not json")
        );
        assert_eq!(decode_value(Value::from(""), &options), Value::from(""));
    }

    #[test]
    fn byte_payloads_decode() {
        let options = KvOptions::default();
        assert_eq!(
            decode_value(Value::Bytes(b"\"x\"".to_vec()), &options),
            Value::from("x")
        );
        assert_eq!(
            decode_value(Value::Bytes(b"raw".to_vec()), &options),
            Value::from("raw")
        );
        assert_eq!(
            decode_value(Value::Bytes(vec![0xff, 0xfe]), &options),
            Value::Bytes(vec![0xff, 0xfe])
        );
    }

    #[test]
    fn byte_literal_is_unwrapped() {
        let options = KvOptions::default();
        assert_eq!(
            decode_value(Value::from("b'\"hello\"'"), &options),
            Value::from("hello")
        );
        assert_eq!(
            decode_value(Value::from("b'plain'"), &options),
            Value::from("b'plain'")
        );
    }

    #[test]
    fn base64_payloads_decode_when_enabled() {
        let options = KvOptions::base64();
        assert_eq!(
            decode_value(Value::from("IjEuMi4zLjQi"), &options),
            Value::from("1.2.3.4")
        );
        assert_eq!(
            decode_value(Value::from("cGxhaW4gdGV4dA=="), &options),
            Value::from("plain text")
        );
        assert_eq!(
            decode_value(Value::from("not base64!"), &options),
            Value::from("not base64!")
        );

        let plain = KvOptions::default();
        assert_eq!(
            decode_value(Value::from("IjEuMi4zLjQi"), &plain),
            Value::from("IjEuMi4zLjQi")
        );
    }

    #[test]
    fn other_values_pass_through() {
        let options = KvOptions::base64();
        assert_eq!(decode_value(Value::Null, &options), Value::Null);
        assert_eq!(decode_value(Value::Integer(3), &options), Value::Integer(3));
    }

    #[test]
    fn record_deserializes_from_listing() {
        let record: KvRecord = serde_json::from_str(
            r#"{"Key": "svc/1/addr", "Value": "IjEuMi4zLjQi", "CreateIndex": 1,
                "ModifyIndex": 2, "LockIndex": 0, "Flags": 0, "Session": ""}"#,
        )
        .unwrap();

        assert_eq!(record.path().as_str(), "svc.1.addr");
        assert_eq!(record.modify_index, 2);
        assert_eq!(record.session.as_deref(), Some(""));
        assert_eq!(record.raw_value(), Value::from("IjEuMi4zLjQi"));
    }

    #[test]
    fn folder_records_have_no_value() {
        let record: KvRecord =
            serde_json::from_str(r#"{"Key": "svc/", "Value": null, "Flags": 0}"#).unwrap();
        assert_eq!(record.raw_value(), Value::Null);
        assert_eq!(record.path().as_str(), "svc");
    }
}
