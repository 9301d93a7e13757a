//! File-backed containers.

use std::ops::{Deref, DerefMut};
use std::path::Path;

use dotstore_core::{DotMap, Error, Result, Value};
use dotstore_serde::{loads, restore, DotMapJson};

use crate::binding::Binding;

/// A [`DotMap`] that can be saved to a JSON file.
///
/// The map derefs to its [`DotMap`], so every container operation is
/// available directly. Nothing is written until [`PersistentMap::sync`] is
/// called.
///
/// # Example
///
/// ```rust
/// use dotstore_json_store::{load, PersistentMap};
///
/// let dir = tempfile::tempdir().unwrap();
/// let path = dir.path().join("state.json");
///
/// let mut state = PersistentMap::new();
/// state.bind(&path, false).unwrap();
/// state.set("jobs.last_run", 1700000000i64).unwrap();
/// state.sync().unwrap();
///
/// let saved = load(&path).unwrap();
/// assert_eq!(saved.deep_items(), state.deep_items());
/// ```
#[derive(Debug, Default)]
pub struct PersistentMap {
    map: DotMap,
    binding: Option<Binding>,
}

impl PersistentMap {
    /// Create an empty, unbound map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing container. The result is unbound.
    pub fn from_map(map: DotMap) -> Self {
        Self { map, binding: None }
    }

    /// Create a map bound to `path`.
    ///
    /// If the file already exists and `flush` is not set, its contents are
    /// loaded. Otherwise the file is created empty.
    pub fn open(path: impl AsRef<Path>, flush: bool) -> Result<Self> {
        let binding = Binding::new(path)?;
        let created = binding.ensure(flush)?;
        let map = if created {
            DotMap::new()
        } else {
            loads(&binding.read()?)?
        };
        Ok(Self {
            map,
            binding: Some(binding),
        })
    }

    /// Bind this map to a backing file.
    ///
    /// The file (and its directory) is created holding `{}` when it does not
    /// exist yet. With `flush` an existing file is truncated to `{}` as well.
    /// An empty `path` leaves the map as it is.
    pub fn bind(&mut self, path: impl AsRef<Path>, flush: bool) -> Result<()> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            log::debug!("Ignoring bind to an empty path");
            return Ok(());
        }

        let binding = Binding::new(path)?;
        binding.ensure(flush)?;
        self.binding = Some(binding);
        Ok(())
    }

    /// Drop the binding, returning it if there was one.
    pub fn unbind(&mut self) -> Option<Binding> {
        self.binding.take()
    }

    pub fn binding(&self) -> Option<&Binding> {
        self.binding.as_ref()
    }

    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    /// Write the current contents to the backing file.
    ///
    /// Returns `false` without touching the filesystem when unbound. Encoding
    /// happens before the file is opened, so an encode error leaves the
    /// previous contents intact.
    pub fn sync(&self) -> Result<bool> {
        match &self.binding {
            Some(binding) => {
                let text = self.map.to_json_string()?;
                binding.write(&text)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Update from a saved state (JSON text or a container), then sync.
    pub fn restore(&mut self, state: Value) -> Result<()> {
        restore(&mut self.map, state)?;
        self.sync()?;
        Ok(())
    }

    pub fn map(&self) -> &DotMap {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut DotMap {
        &mut self.map
    }

    pub fn into_inner(self) -> DotMap {
        self.map
    }
}

impl Deref for PersistentMap {
    type Target = DotMap;

    fn deref(&self) -> &DotMap {
        &self.map
    }
}

impl DerefMut for PersistentMap {
    fn deref_mut(&mut self) -> &mut DotMap {
        &mut self.map
    }
}

impl From<DotMap> for PersistentMap {
    fn from(map: DotMap) -> Self {
        Self::from_map(map)
    }
}

/// Read a container from a JSON file.
pub fn load(path: impl AsRef<Path>) -> Result<DotMap> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::NotFound {
            path: path.to_path_buf(),
        });
    }
    let binding = Binding::new(path)?;
    loads(&binding.read()?)
}
