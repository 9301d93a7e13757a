//! dotstore core: nested containers addressed by dotted keys.
//!
//! - `Key`: a normalized dotted path (`a.b.c`)
//! - `Value`: what a node holds (scalars, sequences, nested containers,
//!   and a few non-JSON kinds resolved at encode time)
//! - `DotMap`: the container itself, with strict and permissive lookups,
//!   deep merge, and flattened key/item enumeration
//!
//! # Example
//!
//! ```rust
//! use dotstore_core::{DotMap, Value};
//!
//! let mut config = DotMap::new();
//! config.set("server.port", 8080i64).unwrap();
//! config.set("server.host", "localhost").unwrap();
//!
//! assert_eq!(config.get("server.port"), Some(&Value::Integer(8080)));
//! assert_eq!(config.deep_keys(), vec!["server.host", "server.port"]);
//! ```

mod dot_map;
mod encodable;
mod error;
mod key;
mod value;

pub use dot_map::{DotMap, Entries, MapId};
pub use encodable::{Encodable, Opaque};
pub use error::{Error, HookError, Result};
pub use key::{normalize, normalize_hierarchical, Key, RESERVED_SEGMENT, SEPARATOR};
pub use value::Value;

pub use chrono;
