//! # dotstore-cli
//!
//! Command-line access to dotstore state files.
//!
//! ## Usage
//!
//! ```bash
//! dotstore --file state.json set svc.web.port 8080
//! dotstore --file state.json get svc.web
//! dotstore --file state.json ingest consul-export.json --base64
//! DOTSTORE_FILE=state.json dotstore keys
//! ```

pub mod commands;

pub use commands::{execute, CliError, Command};
