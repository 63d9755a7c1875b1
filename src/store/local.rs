//! Filesystem-backed store rooted at a directory.

use super::{Presence, Store};
use crate::error::{BookletError, Result};
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Store that maps keys to files under `root`.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a key to a path below the root.
    ///
    /// Keys may not escape the root through `..` or absolute components.
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes || key.is_empty() {
            return Err(BookletError::unavailable(
                key,
                "key must be a relative path inside the store root",
            ));
        }
        Ok(self.root.join(relative))
    }
}

impl Store for LocalStore {
    fn probe(&self, key: &str) -> Result<Presence> {
        let path = self.path_for(key)?;
        match std::fs::metadata(&path) {
            Ok(meta) if meta.is_file() => Ok(Presence::Found),
            Ok(_) => Ok(Presence::Missing),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Presence::Missing),
            Err(e) => Err(BookletError::unavailable(path.display().to_string(), e)),
        }
    }

    fn read(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.path_for(key)?;
        std::fs::read(&path).map_err(|e| BookletError::unavailable(path.display().to_string(), e))
    }

    /// Write through a temporary file in the target directory, then rename it
    /// over `key`, so a failed run never leaves a truncated file behind.
    fn write(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path_for(key)?;
        let write_err = |detail: String| BookletError::OutputWriteFailed {
            key: key.to_string(),
            detail,
        };

        let parent = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone());
        std::fs::create_dir_all(&parent).map_err(|e| write_err(e.to_string()))?;

        let mut tmp =
            tempfile::NamedTempFile::new_in(&parent).map_err(|e| write_err(e.to_string()))?;
        tmp.write_all(bytes).map_err(|e| write_err(e.to_string()))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| write_err(e.to_string()))?;
        tmp.persist(&path).map_err(|e| write_err(e.error.to_string()))?;

        debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }

    fn describe(&self, key: &str) -> String {
        self.root.join(key).display().to_string()
    }
}
