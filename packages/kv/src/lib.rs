//! Consul-style KV listings for dotstore.
//!
//! A KV listing is a JSON array of flat records, each with a `/`-delimited
//! `Key` and an encoded `Value`. [`KvAdapter`] turns such a listing into a
//! nested [`DotMap`](dotstore_core::DotMap).

pub mod adapter;
pub mod record;

pub use adapter::{decode_tree, Ingest, IngestReport, KvAdapter};
pub use record::{decode_value, is_record, record_key, KvOptions, KvRecord, SIGNATURE};
