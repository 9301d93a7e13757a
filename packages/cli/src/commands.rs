//! Subcommands and their execution.
//!
//! Queries read the state file as it is. Edits open it, creating it when
//! missing, and sync it back.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Subcommand;
use serde_json::Value as JsonValue;

use dotstore_core::{DotMap, Value};
use dotstore_json_store::{load, PersistentMap};
use dotstore_kv::{KvAdapter, KvOptions};
use dotstore_serde::{json_to_value, JsonCodec};

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Store(#[from] dotstore_core::Error),

    #[error("Could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Print the value at a dotted key
    Get { key: String },

    /// Store a value at a dotted key (JSON, or plain text)
    Set { key: String, value: String },

    /// Delete a key and everything below it
    Del { key: String },

    /// List every leaf key
    Keys,

    /// List every leaf key with its value
    Items,

    /// Print the first top-level value whose key matches a regex at its start
    Find {
        pattern: String,

        /// Print every match, keyed, instead of the first value
        #[arg(long)]
        all: bool,
    },

    /// Deep-merge another state file into this one
    Merge { source: PathBuf },

    /// Apply a KV listing export (a JSON array of Key/Value records)
    Ingest {
        source: PathBuf,

        /// Record values are base64 encoded
        #[arg(long)]
        base64: bool,
    },
}

impl Command {
    /// Whether the command leaves the state file untouched.
    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            Command::Get { .. } | Command::Keys | Command::Items | Command::Find { .. }
        )
    }
}

/// Run `command` against the state file at `file`.
///
/// Read-only commands load the file and fail when it is missing. The others
/// open it, creating it when needed, and sync it afterwards. Returns the text
/// to print, if any.
pub fn execute(command: &Command, file: &Path) -> Result<Option<String>, CliError> {
    if command.is_read_only() {
        let state = load(file)?;
        query(command, &state)
    } else {
        let mut state = PersistentMap::open(file, false)?;
        let output = modify(command, &mut state)?;
        state.sync()?;
        Ok(output)
    }
}

fn query(command: &Command, state: &DotMap) -> Result<Option<String>, CliError> {
    match command {
        Command::Get { key } => {
            let value = state.try_get(key.as_str())?;
            Ok(Some(JsonCodec.encode(value)?))
        }
        Command::Keys => Ok(Some(state.deep_keys().join("\n"))),
        Command::Items => {
            let mut lines = Vec::new();
            for (key, value) in state.deep_items() {
                lines.push(format!("{} = {}", key, compact(value)?));
            }
            Ok(Some(lines.join("\n")))
        }
        Command::Find { pattern, all: true } => {
            let mut found = DotMap::new();
            for (key, value) in state.find_all(pattern)? {
                found.set(key, value.clone())?;
            }
            Ok(Some(JsonCodec.encode_map(&found)?))
        }
        Command::Find { pattern, all: false } => match state.find(pattern)? {
            Some(value) => Ok(Some(JsonCodec.encode(value)?)),
            None => Ok(None),
        },
        _ => Ok(None),
    }
}

fn modify(command: &Command, state: &mut PersistentMap) -> Result<Option<String>, CliError> {
    match command {
        Command::Set { key, value } => {
            state.set(key.as_str(), parse_value(value))?;
            Ok(None)
        }
        Command::Del { key } => {
            state.delete(key.as_str())?;
            Ok(None)
        }
        Command::Merge { source } => {
            state.merge(load(source)?);
            Ok(None)
        }
        Command::Ingest { source, base64 } => {
            let text = fs::read_to_string(source).map_err(|source_err| CliError::Read {
                path: source.clone(),
                source: source_err,
            })?;
            let options = KvOptions {
                decode_base64: *base64,
            };

            let mut adapter = KvAdapter::from_map(std::mem::take(state.map_mut()), options);
            let report = adapter.ingest_json_str(&text);
            *state.map_mut() = adapter.into_inner();
            let report = report?;

            Ok(Some(format!(
                "applied {}, skipped {}",
                report.applied, report.skipped
            )))
        }
        _ => Ok(None),
    }
}

/// JSON if it parses, otherwise the text itself.
fn parse_value(text: &str) -> Value {
    match serde_json::from_str::<JsonValue>(text) {
        Ok(json) => json_to_value(json),
        Err(_) => Value::from(text),
    }
}

fn compact(value: &Value) -> Result<String, CliError> {
    let json = JsonCodec.to_json(value)?;
    Ok(json.to_string())
}
