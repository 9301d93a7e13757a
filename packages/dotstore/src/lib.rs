//! dotstore: nested key-value containers addressed by dotted paths.
//!
//! A [`DotMap`] stores values in a tree where `a.b.c` names a leaf three
//! levels down. On top of the container sit a JSON codec with fallbacks for
//! values JSON cannot express natively, file persistence through
//! [`PersistentMap`], and ingestion of Consul-style KV listings through
//! [`KvAdapter`].
//!
//! # Crates
//!
//! - `dotstore-core`: keys, values, [`DotMap`] and the shared [`Error`]
//! - `dotstore-serde`: [`JsonCodec`], [`loads`], [`restore`] and serde conversions
//! - `dotstore-json-store`: [`PersistentMap`], [`Binding`] and [`load`]
//! - `dotstore-kv`: [`KvAdapter`], [`KvRecord`] and payload decoding
//!
//! # Example
//!
//! ```rust
//! use dotstore::{loads, DotMap, DotMapJson, Value};
//!
//! let mut config = DotMap::new();
//! config.set("db.primary.host", "10.0.0.1").unwrap();
//! config.set("db.primary.port", 5432i64).unwrap();
//!
//! let text = config.to_json_string().unwrap();
//! let copy = loads(&text).unwrap();
//! assert_eq!(copy.get("db.primary.port"), Some(&Value::Integer(5432)));
//! assert_eq!(copy.get_or("db.replica.port", &Value::Null), &Value::Null);
//! ```

pub use dotstore_core::{
    chrono, normalize, normalize_hierarchical, DotMap, Encodable, Entries, Error, HookError,
    Key, MapId, Opaque, Result, Value, RESERVED_SEGMENT, SEPARATOR,
};
pub use dotstore_json_store::{load, Binding, PersistentMap};
pub use dotstore_kv::{
    decode_tree, decode_value, Ingest, IngestReport, KvAdapter, KvOptions, KvRecord,
};
pub use dotstore_serde::{
    encode, from_value, json_to_value, loads, restore, to_value, DotMapJson, JsonCodec,
};
