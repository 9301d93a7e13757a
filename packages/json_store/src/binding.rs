//! Binding between a container and its backing file.

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};
use std::{env, fs, io};

use dotstore_core::{Error, Result};

/// Contents written to a freshly created backing file.
pub const EMPTY_DOCUMENT: &str = "{}";

/// Location of a backing JSON file.
///
/// The path is made absolute when the binding is created, so later changes
/// of the working directory do not move the file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binding {
    path: PathBuf,
    directory: PathBuf,
    file_name: PathBuf,
}

impl Binding {
    pub fn new(path: impl AsRef<Path>) -> Result<Binding> {
        let path = absolute(path.as_ref())?;
        let file_name = path.file_name().map(PathBuf::from).ok_or_else(|| {
            Error::io(
                &path,
                io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
            )
        })?;
        let directory = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(Component::RootDir.as_os_str()));

        Ok(Binding {
            path,
            directory,
            file_name,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn file_name(&self) -> &OsStr {
        self.file_name.as_os_str()
    }

    /// Make sure the backing file exists.
    ///
    /// When the file is missing, or `flush` is set, the directory tree is
    /// created and the file is (re)written as an empty JSON object. Returns
    /// whether the file was written.
    pub fn ensure(&self, flush: bool) -> Result<bool> {
        if self.path.exists() && !flush {
            return Ok(false);
        }

        fs::create_dir_all(&self.directory).map_err(|err| Error::io(&self.directory, err))?;
        self.write(EMPTY_DOCUMENT)?;
        Ok(true)
    }

    /// Overwrite the backing file with `text`.
    pub fn write(&self, text: &str) -> Result<()> {
        log::debug!("Writing {}...", self.path.display());
        fs::write(&self.path, text).map_err(|err| Error::io(&self.path, err))
    }

    /// Read the backing file.
    pub fn read(&self) -> Result<String> {
        log::debug!("Reading {}...", self.path.display());
        fs::read_to_string(&self.path).map_err(|err| Error::io(&self.path, err))
    }
}

/// Absolute, lexically normalized form of `path`.
fn absolute(path: &Path) -> Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        let cwd = env::current_dir().map_err(|err| Error::io(path, err))?;
        cwd.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_path_parts() {
        let dir = tempfile::tempdir().unwrap();
        let binding = Binding::new(dir.path().join("conf/state.json")).unwrap();

        assert_eq!(binding.path(), dir.path().join("conf/state.json"));
        assert_eq!(binding.directory(), dir.path().join("conf"));
        assert_eq!(binding.file_name(), "state.json");
    }

    #[test]
    fn relative_paths_become_absolute() {
        let binding = Binding::new("some/dir/../state.json").unwrap();
        assert!(binding.path().is_absolute());
        assert!(binding.path().ends_with("some/state.json"));
    }

    #[test]
    fn ensure_creates_directories_and_empty_document() {
        let dir = tempfile::tempdir().unwrap();
        let binding = Binding::new(dir.path().join("a/b/c/state.json")).unwrap();

        assert!(binding.ensure(false).unwrap());
        assert_eq!(binding.read().unwrap(), EMPTY_DOCUMENT);
    }

    #[test]
    fn ensure_keeps_existing_file_unless_flushed() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("state.json");
        fs::write(&file, r#"{"kept": true}"#).unwrap();
        let binding = Binding::new(&file).unwrap();

        assert!(!binding.ensure(false).unwrap());
        assert_eq!(binding.read().unwrap(), r#"{"kept": true}"#);

        assert!(binding.ensure(true).unwrap());
        assert_eq!(binding.read().unwrap(), EMPTY_DOCUMENT);
    }

    #[test]
    fn read_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let binding = Binding::new(dir.path().join("missing.json")).unwrap();
        assert!(matches!(binding.read(), Err(Error::Io { .. })));
    }
}
