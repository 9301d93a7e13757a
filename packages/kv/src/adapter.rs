//! A container that ingests KV listings.

use std::ops::{AddAssign, Deref, DerefMut};

use serde_json::Value as JsonValue;

use dotstore_core::{DotMap, Error, Key, Result, Value};
use dotstore_serde::json_to_value;

use crate::record::{
    decode_value, is_record, record_key, KvOptions, KvRecord, KEY_FIELD, VALUE_FIELD,
};

/// Outcome of an ingestion call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Items written into the container.
    pub applied: usize,
    /// Items that were not recognized or could not be stored.
    pub skipped: usize,
}

impl IngestReport {
    pub fn is_clean(&self) -> bool {
        self.skipped == 0
    }
}

impl AddAssign for IngestReport {
    fn add_assign(&mut self, other: IngestReport) {
        self.applied += other.applied;
        self.skipped += other.skipped;
    }
}

/// Something [`KvAdapter::ingest`] accepts.
#[derive(Debug)]
pub enum Ingest {
    /// A listing, a single record, or any other mapping.
    Value(Value),
    /// A single key/value pair, applied with [`DotMap::update`].
    Pair(Key, Value),
    /// Typed listing entries.
    Records(Vec<KvRecord>),
}

impl From<Value> for Ingest {
    fn from(value: Value) -> Self {
        Ingest::Value(value)
    }
}

impl From<JsonValue> for Ingest {
    fn from(json: JsonValue) -> Self {
        Ingest::Value(json_to_value(json))
    }
}

impl From<DotMap> for Ingest {
    fn from(map: DotMap) -> Self {
        Ingest::Value(Value::Map(map))
    }
}

impl<K: Into<Key>, V: Into<Value>> From<(K, V)> for Ingest {
    fn from((key, value): (K, V)) -> Self {
        Ingest::Pair(key.into(), value.into())
    }
}

impl From<KvRecord> for Ingest {
    fn from(record: KvRecord) -> Self {
        Ingest::Records(vec![record])
    }
}

impl From<Vec<KvRecord>> for Ingest {
    fn from(records: Vec<KvRecord>) -> Self {
        Ingest::Records(records)
    }
}

/// A [`DotMap`] that understands KV listings.
///
/// Listing entries carry a `/`-delimited `Key` and an encoded `Value`. Each
/// entry is stored at its path with the payload decoded, replacing whatever
/// was there. Anything else is merged like [`DotMap::update`].
///
/// # Example
///
/// ```rust
/// use dotstore_kv::KvAdapter;
/// use serde_json::json;
///
/// let mut kv = KvAdapter::new();
/// let report = kv.ingest(json!([
///     {"Key": "svc/1/addr", "Value": "\"1.2.3.4\"", "CreateIndex": 1,
///      "ModifyIndex": 2, "LockIndex": 0, "Flags": 0, "Session": ""}
/// ]));
///
/// assert_eq!(report.applied, 1);
/// assert_eq!(kv.get("svc.1.addr").and_then(|v| v.as_str()), Some("1.2.3.4"));
/// ```
#[derive(Debug, Default)]
pub struct KvAdapter {
    map: DotMap,
    options: KvOptions,
}

impl KvAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: KvOptions) -> Self {
        Self {
            map: DotMap::new(),
            options,
        }
    }

    pub fn from_map(map: DotMap, options: KvOptions) -> Self {
        Self { map, options }
    }

    pub fn options(&self) -> &KvOptions {
        &self.options
    }

    pub fn into_inner(self) -> DotMap {
        self.map
    }

    /// Apply an item to the container.
    ///
    /// Unrecognized items and items that cannot be stored are logged and
    /// counted as skipped; the rest of a listing is still applied.
    pub fn ingest(&mut self, item: impl Into<Ingest>) -> IngestReport {
        let mut report = IngestReport::default();
        match item.into() {
            Ingest::Value(value) => self.ingest_value(value, &mut report),
            Ingest::Pair(key, value) => {
                let result = self.map.update((key, value));
                tally(result, "pair", &mut report);
            }
            Ingest::Records(records) => {
                for record in records {
                    let path = record.path();
                    let value = record.raw_value();
                    self.apply_record(path, value, &mut report);
                }
            }
        }
        report
    }

    /// Parse `text` as JSON and ingest it.
    pub fn ingest_json_str(&mut self, text: &str) -> Result<IngestReport> {
        let json: JsonValue =
            serde_json::from_str(text).map_err(|e| Error::decode(e.to_string()))?;
        Ok(self.ingest(json))
    }

    fn ingest_value(&mut self, value: Value, report: &mut IngestReport) {
        match value {
            Value::Array(items) if items.iter().all(Value::is_map) => {
                for item in items {
                    self.ingest_value(item, report);
                }
            }
            Value::Map(mut map) if is_record(&map) => {
                let raw_key = map.remove(KEY_FIELD).unwrap_or_default();
                let raw_value = map.remove(VALUE_FIELD).unwrap_or_default();
                match record_key(&raw_key) {
                    Some(path) => self.apply_record(path, raw_value, report),
                    None => {
                        log::warn!("Skipping record with a {} key", raw_key.type_name());
                        report.skipped += 1;
                    }
                }
            }
            Value::Map(map) => {
                let result = self.map.update(map);
                tally(result, "mapping", report);
            }
            other => {
                log::warn!("Cannot process item: {:?}", other);
                report.skipped += 1;
            }
        }
    }

    fn apply_record(&mut self, path: Key, raw_value: Value, report: &mut IngestReport) {
        let value = decode_value(raw_value, &self.options);
        let result = self.map.set(path, value);
        tally(result, "record", report);
    }
}

fn tally(result: Result<()>, kind: &str, report: &mut IngestReport) {
    match result {
        Ok(()) => report.applied += 1,
        Err(err) => {
            log::warn!("Skipping {}: {}", kind, err);
            report.skipped += 1;
        }
    }
}

impl Deref for KvAdapter {
    type Target = DotMap;

    fn deref(&self) -> &DotMap {
        &self.map
    }
}

impl DerefMut for KvAdapter {
    fn deref_mut(&mut self) -> &mut DotMap {
        &mut self.map
    }
}

/// Decode a tree that may hold listing entries anywhere inside it.
///
/// Mappings that look like records are replaced by a container holding the
/// record at its path. Other mapping keys are read as `/`-delimited paths.
/// Leaves are decoded with [`decode_value`].
pub fn decode_tree(value: Value, options: &KvOptions) -> Value {
    match value {
        Value::Map(map) if is_record(&map) => {
            let mut adapter = KvAdapter::with_options(options.clone());
            adapter.ingest(Value::Map(map));
            Value::Map(adapter.into_inner())
        }
        Value::Map(map) => {
            let mut tree = DotMap::new();
            for (key, child) in map {
                if let Err(err) = tree.set(Key::hierarchical(&key), decode_tree(child, options)) {
                    log::warn!("Dropping '{}': {}", key, err);
                }
            }
            Value::Map(tree)
        }
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| decode_tree(item, options))
                .collect(),
        ),
        other => decode_value(other, options),
    }
}
