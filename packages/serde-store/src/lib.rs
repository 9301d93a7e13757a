//! Serde integration for dotstore.
//!
//! This layer turns [`DotMap`](dotstore_core::DotMap) trees into JSON text and
//! back:
//! - `JsonCodec`: pretty, key-sorted JSON with a fallback chain for values
//!   JSON cannot hold natively (timestamps, bytes, host objects)
//! - `loads` / `restore`: build or update containers from JSON text
//! - Value <-> serde conversions for typed access
//!
//! # Example
//!
//! ```rust
//! use dotstore_serde::{loads, DotMapJson};
//!
//! let map = loads(r#"{"db": {"host": "localhost", "port": 5432}}"#).unwrap();
//! assert_eq!(map.deep_keys(), vec!["db.host", "db.port"]);
//!
//! let text = map.to_json_string().unwrap();
//! assert!(loads(&text).unwrap().content_eq(&map));
//! ```

mod codec;
mod convert;

pub use codec::{encode, loads, restore, DotMapJson, JsonCodec};
pub use convert::{from_value, json_to_value, to_value};

// Re-export core types for convenience
pub use dotstore_core::{DotMap, Error, Result, Value};
