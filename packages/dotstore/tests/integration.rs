use std::fs;

use chrono::{TimeZone, Utc};
use serde_json::json;

use dotstore::{
    encode, load, loads, normalize, normalize_hierarchical, DotMap, DotMapJson, Encodable,
    Error, HookError, KvAdapter, KvOptions, PersistentMap, Value,
};

#[derive(Debug)]
struct Point {
    x: i64,
    y: i64,
}

impl Point {
    fn as_map(&self) -> dotstore::Result<DotMap> {
        let mut map = DotMap::new();
        map.set("x", self.x)?;
        map.set("y", self.y)?;
        Ok(map)
    }
}

impl Encodable for Point {
    fn to_value(&self) -> Option<Result<Value, HookError>> {
        Some(self.as_map().map(Value::Map).map_err(HookError::from))
    }
}

fn sample() -> DotMap {
    let mut map = DotMap::new();
    map.set("svc.web.port", 8080i64).unwrap();
    map.set("svc.web.hosts", vec!["a", "b"]).unwrap();
    map.set("svc.db.primary", true).unwrap();
    map.set("ratio", 0.5).unwrap();
    map.set("name", "demo").unwrap();
    map
}

#[test]
fn round_trip_through_text() {
    let original = sample();
    let text = original.to_json_string().unwrap();
    let copy = loads(&text).unwrap();

    assert!(copy.content_eq(&original));
    assert_eq!(copy.deep_items(), original.deep_items());
    assert_ne!(copy, original);
}

#[test]
fn round_trip_keeps_objects_inside_arrays() {
    let original = loads(r#"{"svc": {"hosts": [{"name": "a"}, {"name": "b"}]}}"#).unwrap();
    let copy = loads(&original.to_json_string().unwrap()).unwrap();

    assert_eq!(copy.deep_items(), original.deep_items());
    assert_eq!(copy.get("svc.hosts"), original.get("svc.hosts"));
}

#[test]
fn dotted_set_and_get() {
    let mut map = DotMap::new();
    map.set("a.b.c", 1i64).unwrap();

    assert_eq!(map.get("a.b.c"), Some(&Value::Integer(1)));
    assert!(map.get("a").unwrap().is_map());
    assert_eq!(map.deep_keys(), vec!["a.b.c"]);
    assert!(map.contains("a.b.c"));
    assert!(!map.contains("a.b"));
}

#[test]
fn normalization_rules() {
    assert_eq!(normalize("..a..b.."), "a.b");
    assert_eq!(normalize_hierarchical("a//b"), "a.b");

    let mut map = DotMap::new();
    map.set("..a..b..", 1i64).unwrap();
    assert_eq!(map.get("a.b"), Some(&Value::Integer(1)));
}

#[test]
fn merge_versus_overwrite() {
    let mut map = DotMap::new();
    map.update(("a", DotMap::from_entries(("x", 1i64)).unwrap()))
        .unwrap();
    map.update(("a", DotMap::from_entries(("y", 2i64)).unwrap()))
        .unwrap();
    assert_eq!(map.get("a.x"), Some(&Value::Integer(1)));
    assert_eq!(map.get("a.y"), Some(&Value::Integer(2)));

    let mut map = DotMap::new();
    map.set("a", 5i64).unwrap();
    map.set("a.b", 1i64).unwrap();
    assert_eq!(map.deep_keys(), vec!["a.b"]);
}

#[test]
fn permissive_and_strict_lookups() {
    let map = sample();

    assert_eq!(map.get("nonexistent.path"), None);
    assert_eq!(map.get("name.deeper"), None);
    assert_eq!(map.get(""), None);
    assert!(matches!(
        map.try_get("nonexistent.path"),
        Err(Error::KeyNotFound { .. })
    ));
}

#[test]
fn encoder_fallbacks() {
    let when = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    assert_eq!(encode(&Value::from(when)).unwrap(), "1577836800.0");

    let mut map = DotMap::new();
    map.set("point", Value::object(Point { x: 1, y: 2 })).unwrap();
    map.set("raw", b"bytes".to_vec()).unwrap();

    let text = map.to_json_string().unwrap();
    let copy = loads(&text).unwrap();
    assert_eq!(copy.get("point.x"), Some(&Value::Integer(1)));
    assert_eq!(copy.get("point.y"), Some(&Value::Integer(2)));
    assert_eq!(copy.get("raw"), Some(&Value::from("bytes")));
}

#[test]
fn persistence_bind_sync_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state/app.json");

    let mut state = PersistentMap::from_map(sample());
    state.bind(&path, false).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "{}");

    state.sync().unwrap();
    let expected: Vec<(String, Value)> = state
        .deep_items()
        .into_iter()
        .map(|(key, value)| (key, value.clone()))
        .collect();

    state.set("svc.web.port", 9090i64).unwrap();

    let saved = load(&path).unwrap();
    let items: Vec<(String, Value)> = saved
        .deep_items()
        .into_iter()
        .map(|(key, value)| (key, value.clone()))
        .collect();
    assert_eq!(items, expected);

    let reopened = PersistentMap::open(&path, false).unwrap();
    assert_eq!(reopened.get("svc.web.port"), Some(&Value::Integer(8080)));
}

#[test]
fn kv_listing_ingestion() {
    let mut kv = KvAdapter::new();
    let report = kv.ingest(json!([{
        "Key": "svc/1/addr",
        "Value": "\"1.2.3.4\"",
        "CreateIndex": 1,
        "ModifyIndex": 2,
        "LockIndex": 0,
        "Flags": 0,
        "Session": ""
    }]));

    assert_eq!(report.applied, 1);
    assert_eq!(kv.get("svc.1.addr"), Some(&Value::from("1.2.3.4")));
}

#[test]
fn kv_ingestion_then_persist() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("consul.json");

    let mut kv = KvAdapter::with_options(KvOptions::base64());
    kv.ingest_json_str(
        r#"[
            {"Key": "svc/web/conf", "Value": "eyJwb3J0IjogODA4MH0=", "CreateIndex": 1,
             "ModifyIndex": 1, "LockIndex": 0, "Flags": 0, "Session": ""},
            {"Key": "svc/web/addr", "Value": "IjEuMi4zLjQi", "CreateIndex": 2,
             "ModifyIndex": 2, "LockIndex": 0, "Flags": 0, "Session": ""}
        ]"#,
    )
    .unwrap();

    let mut state = PersistentMap::from_map(kv.into_inner());
    state.bind(&path, false).unwrap();
    state.sync().unwrap();

    let saved = load(&path).unwrap();
    assert_eq!(saved.deep_keys(), vec!["svc.web.addr", "svc.web.conf.port"]);
    assert_eq!(saved.get("svc.web.conf.port"), Some(&Value::Integer(8080)));
}
