//! Client-local state files.
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("state path {0:?} exists but is not a directory")]
    NotADirectory(PathBuf),
    #[error("{path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PersistError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A single named file inside the state directory.
///
/// Writes go to a temp file in the same directory which is then renamed over
/// the target, so a reader sees either the old or the new content.
#[derive(Debug, Clone)]
pub struct StateFile {
    dir: PathBuf,
    name: String,
}

impl StateFile {
    pub fn new(dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            name: name.into(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.name)
    }

    /// Current content, or `None` when the file has never been written.
    pub fn read(&self) -> Result<Option<String>, PersistError> {
        let path = self.path();
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(PersistError::io(&path, err)),
        }
    }

    pub fn replace(&self, content: &str) -> Result<(), PersistError> {
        self.ensure_dir()?;
        let path = self.path();
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(|e| PersistError::io(&self.dir, e))?;
        tmp.write_all(content.as_bytes())
            .and_then(|_| tmp.flush())
            .and_then(|_| tmp.as_file_mut().sync_all())
            .map_err(|e| PersistError::io(tmp.path(), e))?;
        tmp.persist(&path)
            .map_err(|e| PersistError::io(&path, e.error))?;
        Ok(())
    }

    /// Deletes the file; returns whether anything was there.
    pub fn remove(&self) -> Result<bool, PersistError> {
        let path = self.path();
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(PersistError::io(&path, err)),
        }
    }

    fn ensure_dir(&self) -> Result<(), PersistError> {
        match fs::metadata(&self.dir) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(PersistError::NotADirectory(self.dir.clone())),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                fs::create_dir_all(&self.dir).map_err(|e| PersistError::io(&self.dir, e))
            }
            Err(err) => Err(PersistError::io(&self.dir, err)),
        }
    }
}
