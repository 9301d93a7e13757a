//! Error types shared by every dotstore crate.

use std::io;
use std::path::PathBuf;

/// Boxed error returned by [`Encodable`](crate::Encodable) hooks.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Result alias used throughout dotstore.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by containers, codecs and persistence.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A dotted path could not be resolved by a strict lookup.
    #[error("key not found: {key}")]
    KeyNotFound { key: String },

    /// The key cannot be written (empty after normalization, or reserved).
    #[error("invalid key '{key}': {message}")]
    InvalidKey { key: String, message: String },

    /// A container was restored from something that is neither JSON text nor a mapping.
    #[error("invalid state: {message}")]
    InvalidState { message: String },

    /// Every fallback of the JSON encoder failed for a value.
    #[error("JSON encoder error: {message}")]
    Encode {
        message: String,
        #[source]
        source: Option<HookError>,
    },

    /// JSON text could not be parsed.
    #[error("decode error: {message}")]
    Decode { message: String },

    /// A lookup pattern failed to compile.
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// A file that was expected to exist does not.
    #[error("path does not exist: {}", path.display())]
    NotFound { path: PathBuf },

    /// Filesystem failure while reading or writing a backing file.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub fn key_not_found(key: impl Into<String>) -> Self {
        Error::KeyNotFound { key: key.into() }
    }

    pub fn invalid_key(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidKey {
            key: key.into(),
            message: message.into(),
        }
    }

    pub fn encode(message: impl Into<String>, source: Option<HookError>) -> Self {
        Error::Encode {
            message: message.into(),
            source,
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Error::Decode {
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn key_not_found_display() {
        let e = Error::key_not_found("a.b.c");
        assert_eq!(format!("{}", e), "key not found: a.b.c");
    }

    #[test]
    fn invalid_key_display() {
        let e = Error::invalid_key("", "empty key");
        let display = format!("{}", e);
        assert!(display.contains("invalid key"));
        assert!(display.contains("empty key"));
    }

    #[test]
    fn encode_error_keeps_source() {
        let cause: HookError = "hook exploded".into();
        let e = Error::encode("to_value hook failed", Some(cause));
        assert!(format!("{}", e).contains("JSON encoder error"));
        assert_eq!(StdError::source(&e).unwrap().to_string(), "hook exploded");
    }

    #[test]
    fn encode_error_without_source() {
        let e = Error::encode("bytes are not valid UTF-8", None);
        assert!(StdError::source(&e).is_none());
    }

    #[test]
    fn not_found_display() {
        let e = Error::NotFound {
            path: PathBuf::from("/tmp/missing.json"),
        };
        assert!(format!("{}", e).contains("/tmp/missing.json"));
    }

    #[test]
    fn io_error_source() {
        let e = Error::io("/x", io::Error::other("disk full"));
        assert!(format!("{}", e).contains("disk full"));
        assert!(StdError::source(&e).is_some());
    }

    #[test]
    fn pattern_error_conversion() {
        let err = regex::Regex::new("(").unwrap_err();
        let e: Error = err.into();
        assert!(matches!(e, Error::Pattern(_)));
    }
}
