//! DotMap: a nested container addressed by dotted keys.
//!
//! Every node of the tree is a `DotMap` owned by its parent. Keys are
//! normalized on the way in (see [`normalize`](crate::normalize)), and a
//! dotted key such as `a.b.c` walks one segment per level.

use std::collections::{btree_map, BTreeMap, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

use regex::Regex;

use crate::error::{Error, Result};
use crate::key::{Key, RESERVED_SEGMENT, SEPARATOR};
use crate::value::Value;

static NEXT_MAP_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a [`DotMap`] instance.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct MapId(u64);

impl MapId {
    fn next() -> Self {
        MapId(NEXT_MAP_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A nested key-value container addressed by dotted paths.
///
/// Equality and hashing are by instance: two maps with the same contents are
/// different unless they are the same object. Use [`DotMap::content_eq`] or
/// compare [`DotMap::deep_items`] to compare contents. Cloning produces a new
/// instance.
///
/// # Example
///
/// ```rust
/// use dotstore_core::{DotMap, Value};
///
/// let mut map = DotMap::new();
/// map.set("a.b.c", 1i64).unwrap();
///
/// assert_eq!(map.get("a.b.c"), Some(&Value::Integer(1)));
/// assert!(map.get("a.b").unwrap().is_map());
/// assert_eq!(map.deep_keys(), vec!["a.b.c".to_string()]);
/// ```
pub struct DotMap {
    id: MapId,
    entries: BTreeMap<String, Value>,
}

impl DotMap {
    /// Create an empty container.
    pub fn new() -> Self {
        Self {
            id: MapId::next(),
            entries: BTreeMap::new(),
        }
    }

    /// Build a container from a mapping, a sequence of pairs, or a single pair.
    pub fn from_entries(source: impl Into<Entries>) -> Result<Self> {
        let mut map = DotMap::new();
        map.update(source)?;
        Ok(map)
    }

    pub fn id(&self) -> MapId {
        self.id
    }

    /// True if `other` is this very instance.
    pub fn is_same(&self, other: &DotMap) -> bool {
        self.id == other.id
    }

    /// Structural comparison, recursing into nested containers.
    pub fn content_eq(&self, other: &DotMap) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .zip(other.entries.iter())
                .all(|((ka, va), (kb, vb))| ka == kb && va == vb)
    }

    /// Number of direct entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Direct keys, in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Direct values, ordered by key.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.values()
    }

    /// Direct entries, ordered by key.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.entries.iter()
    }

    /// Strict lookup.
    ///
    /// Fails with [`Error::KeyNotFound`] if a segment is missing or an
    /// intermediate value is not a container.
    pub fn try_get(&self, key: impl Into<Key>) -> Result<&Value> {
        let key = key.into();
        self.lookup(key.as_str())
            .ok_or_else(|| Error::key_not_found(key.into_string()))
    }

    /// Permissive lookup. Any failure, including an empty key, yields `None`.
    pub fn get(&self, key: impl Into<Key>) -> Option<&Value> {
        self.lookup(key.into().as_str())
    }

    /// Permissive lookup falling back to `default`.
    pub fn get_or<'a>(&'a self, key: impl Into<Key>, default: &'a Value) -> &'a Value {
        self.get(key).unwrap_or(default)
    }

    /// Mutable permissive lookup.
    pub fn get_mut(&mut self, key: impl Into<Key>) -> Option<&mut Value> {
        self.lookup_mut(key.into().as_str())
    }

    /// Store `value` at `key`, creating intermediate containers.
    ///
    /// An intermediate segment that holds a non-container value is silently
    /// replaced by an empty container.
    pub fn set(&mut self, key: impl Into<Key>, value: impl Into<Value>) -> Result<()> {
        let key = key.into();
        check_writable(&key)?;
        self.set_normalized(key.as_str(), value.into());
        Ok(())
    }

    /// Return the value at `key`, storing `default` there first if absent.
    pub fn setdefault(
        &mut self,
        key: impl Into<Key>,
        default: impl Into<Value>,
    ) -> Result<&mut Value> {
        let key = key.into();
        check_writable(&key)?;
        if self.lookup(key.as_str()).is_none() {
            self.set_normalized(key.as_str(), default.into());
        }
        self.lookup_mut(key.as_str())
            .ok_or_else(|| Error::key_not_found(key.into_string()))
    }

    /// Strict removal.
    pub fn delete(&mut self, key: impl Into<Key>) -> Result<Value> {
        let key = key.into();
        self.take(key.as_str())
            .ok_or_else(|| Error::key_not_found(key.into_string()))
    }

    /// Permissive removal.
    pub fn remove(&mut self, key: impl Into<Key>) -> Option<Value> {
        self.take(key.into().as_str())
    }

    /// Remove `key` and return it together with its value.
    pub fn pop(&mut self, key: impl Into<Key>) -> Result<(Key, Value)> {
        let key = key.into();
        let value = self.delete(&key)?;
        Ok((key, value))
    }

    /// Remove and return the first direct entry.
    pub fn pop_first(&mut self) -> Option<(String, Value)> {
        self.entries.pop_first()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Membership test.
    ///
    /// A plain key matches any direct entry. A dotted key matches only a
    /// flattened leaf path (see [`DotMap::deep_keys`]), so intermediate
    /// containers are not members under their dotted name.
    pub fn contains(&self, key: impl Into<Key>) -> bool {
        let key = key.into();
        if key.is_empty() {
            return false;
        }
        if !key.is_dotted() {
            return self.entries.contains_key(key.as_str());
        }
        matches!(self.lookup(key.as_str()), Some(value) if !value.is_map())
    }

    /// Every leaf path in the tree, sorted.
    pub fn deep_keys(&self) -> Vec<String> {
        self.deep_items().into_iter().map(|(path, _)| path).collect()
    }

    /// Every leaf path with its value, sorted by path.
    pub fn deep_items(&self) -> Vec<(String, &Value)> {
        let mut items = Vec::new();
        self.collect_leaves(None, &mut items);
        items.sort_by(|a, b| a.0.cmp(&b.0));
        items
    }

    /// Deep merge.
    ///
    /// Where both the held and the incoming value are containers they are
    /// merged recursively; everything else is overwritten.
    pub fn update(&mut self, source: impl Into<Entries>) -> Result<()> {
        for (key, value) in source.into().into_pairs() {
            check_writable(&key)?;
            self.merge_normalized(key.as_str(), value);
        }
        Ok(())
    }

    /// Deep-merge another container into this one.
    pub fn merge(&mut self, other: DotMap) {
        for (key, value) in other.entries {
            self.merge_normalized(&key, value);
        }
    }

    /// First direct entry whose key matches `pattern` at its start.
    pub fn find(&self, pattern: &str) -> Result<Option<&Value>> {
        let re = anchored(pattern)?;
        Ok(self
            .entries
            .iter()
            .find(|(key, _)| re.is_match(key))
            .map(|(_, value)| value))
    }

    /// All direct entries whose key matches `pattern` at its start.
    pub fn find_all(&self, pattern: &str) -> Result<BTreeMap<&str, &Value>> {
        let re = anchored(pattern)?;
        Ok(self
            .entries
            .iter()
            .filter(|(key, _)| re.is_match(key))
            .map(|(key, value)| (key.as_str(), value))
            .collect())
    }

    fn lookup(&self, key: &str) -> Option<&Value> {
        let mut segments = key.split(SEPARATOR);
        let mut current = self.entries.get(segments.next()?)?;
        for segment in segments {
            current = current.as_map()?.entries.get(segment)?;
        }
        Some(current)
    }

    fn lookup_mut(&mut self, key: &str) -> Option<&mut Value> {
        let mut segments = key.split(SEPARATOR);
        let mut current = self.entries.get_mut(segments.next()?)?;
        for segment in segments {
            current = current.as_map_mut()?.entries.get_mut(segment)?;
        }
        Some(current)
    }

    fn set_normalized(&mut self, key: &str, value: Value) {
        match key.split_once(SEPARATOR) {
            Some((head, rest)) => {
                let slot = self
                    .entries
                    .entry(head.to_string())
                    .or_insert_with(Value::map);
                if !slot.is_map() {
                    *slot = Value::map();
                }
                if let Value::Map(child) = slot {
                    child.set_normalized(rest, value);
                }
            }
            None => {
                self.entries.insert(key.to_string(), value);
            }
        }
    }

    fn merge_normalized(&mut self, key: &str, value: Value) {
        match value {
            Value::Map(incoming) => match self.lookup_mut(key) {
                Some(Value::Map(existing)) => existing.merge(incoming),
                _ => self.set_normalized(key, Value::Map(incoming)),
            },
            value => self.set_normalized(key, value),
        }
    }

    fn take(&mut self, key: &str) -> Option<Value> {
        if key.is_empty() {
            return None;
        }
        match key.rsplit_once(SEPARATOR) {
            Some((parent, last)) => self
                .lookup_mut(parent)?
                .as_map_mut()?
                .entries
                .remove(last),
            None => self.entries.remove(key),
        }
    }

    fn collect_leaves<'a>(&'a self, prefix: Option<&str>, out: &mut Vec<(String, &'a Value)>) {
        for (key, value) in &self.entries {
            // Dotted keys are already flattened paths.
            if key.contains(SEPARATOR) || key == RESERVED_SEGMENT {
                continue;
            }
            let path = match prefix {
                Some(prefix) => format!("{}{}{}", prefix, SEPARATOR, key),
                None => key.clone(),
            };
            match value {
                Value::Map(child) => child.collect_leaves(Some(&path), out),
                _ => out.push((path, value)),
            }
        }
    }
}

fn check_writable(key: &Key) -> Result<()> {
    if key.is_empty() {
        return Err(Error::invalid_key(key.as_str(), "key is empty"));
    }
    if key.is_reserved() {
        return Err(Error::invalid_key(
            key.as_str(),
            format!("'{}' is reserved", RESERVED_SEGMENT),
        ));
    }
    Ok(())
}

fn anchored(pattern: &str) -> Result<Regex> {
    Ok(Regex::new(&format!("^(?:{})", pattern))?)
}

impl Default for DotMap {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for DotMap {
    fn clone(&self) -> Self {
        Self {
            id: MapId::next(),
            entries: self.entries.clone(),
        }
    }
}

impl fmt::Debug for DotMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

impl PartialEq for DotMap {
    fn eq(&self, other: &Self) -> bool {
        self.is_same(other)
    }
}

impl Eq for DotMap {}

impl Hash for DotMap {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<'a> IntoIterator for &'a DotMap {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for DotMap {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Source of entries for [`DotMap::update`] and [`DotMap::from_entries`].
#[derive(Debug)]
pub enum Entries {
    /// Another container.
    Map(DotMap),
    /// A sequence of key/value pairs.
    Pairs(Vec<(Key, Value)>),
    /// A single key/value pair.
    Pair(Key, Value),
}

impl Entries {
    pub fn into_pairs(self) -> Vec<(Key, Value)> {
        match self {
            Entries::Map(map) => map
                .into_iter()
                .map(|(key, value)| (Key::new(key), value))
                .collect(),
            Entries::Pairs(pairs) => pairs,
            Entries::Pair(key, value) => vec![(key, value)],
        }
    }
}

impl From<DotMap> for Entries {
    fn from(map: DotMap) -> Self {
        Entries::Map(map)
    }
}

impl<K: Into<Key>, V: Into<Value>> From<(K, V)> for Entries {
    fn from((key, value): (K, V)) -> Self {
        Entries::Pair(key.into(), value.into())
    }
}

impl<K: Into<Key>, V: Into<Value>> From<Vec<(K, V)>> for Entries {
    fn from(pairs: Vec<(K, V)>) -> Self {
        Entries::Pairs(
            pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl<K: Into<Key>, V: Into<Value>> From<BTreeMap<K, V>> for Entries {
    fn from(map: BTreeMap<K, V>) -> Self {
        Entries::Pairs(
            map.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl<K: Into<Key>, V: Into<Value>> From<HashMap<K, V>> for Entries {
    fn from(map: HashMap<K, V>) -> Self {
        Entries::Pairs(
            map.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl TryFrom<Value> for Entries {
    type Error = Error;

    /// Containers become [`Entries::Map`]; arrays of `[key, value]` pairs
    /// become [`Entries::Pairs`]. Anything else is rejected.
    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Map(map) => Ok(Entries::Map(map)),
            Value::Array(items) => items
                .into_iter()
                .map(pair_from_value)
                .collect::<Result<Vec<_>>>()
                .map(Entries::Pairs),
            other => Err(Error::InvalidState {
                message: format!(
                    "expected a mapping or key/value pairs, got {}",
                    other.type_name()
                ),
            }),
        }
    }
}

fn pair_from_value(item: Value) -> Result<(Key, Value)> {
    match item {
        Value::Array(mut pair) if pair.len() == 2 => {
            let value = pair.pop().unwrap_or_default();
            let key = match pair.pop() {
                Some(Value::String(s)) => Key::new(s),
                Some(Value::Integer(i)) => Key::from(i),
                Some(Value::Bytes(b)) => Key::from(b),
                other => {
                    return Err(Error::InvalidState {
                        message: format!(
                            "pair key must be a string, got {}",
                            other.map_or("nothing", |v| v.type_name())
                        ),
                    })
                }
            };
            Ok((key, value))
        }
        other => Err(Error::InvalidState {
            message: format!("expected a [key, value] pair, got {}", other.type_name()),
        }),
    }
}
