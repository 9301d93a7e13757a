//! Dotted keys and key normalization.

use std::borrow::Borrow;
use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

/// Separator between key segments.
pub const SEPARATOR: char = '.';

/// Segment name reserved for container bookkeeping. Never a visible key.
pub const RESERVED_SEGMENT: &str = "__dict__";

lazy_static! {
    static ref SEPARATOR_RUN: Regex = Regex::new(r"\.{2,}").unwrap();
}

/// Canonicalize a raw key into a dotted path.
///
/// Runs of separators collapse to one, then a single leading and a single
/// trailing separator are stripped. Already-normalized input is returned
/// unchanged.
///
/// ```rust
/// use dotstore_core::normalize;
///
/// assert_eq!(normalize("..a..b.."), "a.b");
/// assert_eq!(normalize("a.b"), "a.b");
/// ```
pub fn normalize(raw: &str) -> String {
    let collapsed = SEPARATOR_RUN.replace_all(raw, ".");
    let mut trimmed: &str = &collapsed;
    trimmed = trimmed.strip_prefix(SEPARATOR).unwrap_or(trimmed);
    trimmed = trimmed.strip_suffix(SEPARATOR).unwrap_or(trimmed);
    trimmed.to_string()
}

/// Like [`normalize`], but `/`-delimited store paths become dotted paths first.
///
/// ```rust
/// use dotstore_core::normalize_hierarchical;
///
/// assert_eq!(normalize_hierarchical("svc/1/addr"), "svc.1.addr");
/// assert_eq!(normalize_hierarchical("a//b"), "a.b");
/// ```
pub fn normalize_hierarchical(raw: &str) -> String {
    normalize(&raw.replace('/', "."))
}

/// A normalized dotted key.
///
/// Anything key-like converts into a `Key`: strings are normalized, byte
/// sequences are decoded lossily, integers use their decimal form.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Key(String);

impl Key {
    /// Normalize `raw` into a key.
    pub fn new(raw: impl AsRef<str>) -> Self {
        Key(normalize(raw.as_ref()))
    }

    /// Normalize a `/`-delimited store path into a key.
    pub fn hierarchical(raw: impl AsRef<str>) -> Self {
        Key(normalize_hierarchical(raw.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// True when normalization left nothing behind.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True for keys with more than one segment.
    pub fn is_dotted(&self) -> bool {
        self.0.contains(SEPARATOR)
    }

    /// True if any segment is the reserved bookkeeping name.
    pub fn is_reserved(&self) -> bool {
        self.segments().any(|s| s == RESERVED_SEGMENT)
    }

    /// Iterate over the segments. The empty key has none.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(SEPARATOR).filter(|s| !s.is_empty())
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments().count()
    }

    /// Split off the first segment: `a.b.c` becomes `("a", Some("b.c"))`.
    pub fn split_first(&self) -> (&str, Option<&str>) {
        match self.0.split_once(SEPARATOR) {
            Some((head, rest)) => (head, Some(rest)),
            None => (&self.0, None),
        }
    }

    /// Split off the last segment: `a.b.c` becomes `(Some("a.b"), "c")`.
    pub fn split_last(&self) -> (Option<&str>, &str) {
        match self.0.rsplit_once(SEPARATOR) {
            Some((parent, last)) => (Some(parent), last),
            None => (None, &self.0),
        }
    }

    /// Append a segment (or dotted suffix) to this key.
    #[must_use]
    pub fn join(&self, suffix: &str) -> Key {
        if self.0.is_empty() {
            Key::new(suffix)
        } else {
            Key::new(format!("{}{}{}", self.0, SEPARATOR, suffix))
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Key {
    fn from(raw: &str) -> Self {
        Key::new(raw)
    }
}

impl From<String> for Key {
    fn from(raw: String) -> Self {
        Key::new(raw)
    }
}

impl From<&String> for Key {
    fn from(raw: &String) -> Self {
        Key::new(raw)
    }
}

impl From<&Key> for Key {
    fn from(key: &Key) -> Self {
        key.clone()
    }
}

impl From<&[u8]> for Key {
    fn from(raw: &[u8]) -> Self {
        Key::new(String::from_utf8_lossy(raw))
    }
}

impl From<Vec<u8>> for Key {
    fn from(raw: Vec<u8>) -> Self {
        Key::from(raw.as_slice())
    }
}

macro_rules! key_from_display {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Key {
                fn from(raw: $t) -> Self {
                    Key::new(raw.to_string())
                }
            }
        )*
    };
}

key_from_display!(i32, i64, u32, u64, usize, char);

/// Build a [`Key`] from a literal.
///
/// ```rust
/// use dotstore_core::key;
///
/// assert_eq!(key!("a..b").as_str(), "a.b");
/// ```
#[macro_export]
macro_rules! key {
    ($s:expr) => {
        $crate::Key::new($s)
    };
}
