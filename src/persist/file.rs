use std::path::{Path, PathBuf};

use super::{KeyValueStore, StorageError};

/// Store that keeps each key in `<dir>/<key>.json`.
///
/// Writes go to a sibling temporary file first and are renamed into place,
/// so a crash mid-write leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Default data directory for snapshots.
    /// Returns None if no home or data directory can be determined.
    pub fn default_dir() -> Option<PathBuf> {
        if let Some(data_dir) = dirs::data_dir() {
            Some(data_dir.join("gvgplan"))
        } else {
            dirs::home_dir().map(|home| home.join(".local").join("share").join("gvgplan"))
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No stored value at {:?}", path);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir)?;

        let path = self.path_for(key);
        let temp_path = self.dir.join(format!(".{key}.json.tmp"));
        std::fs::write(&temp_path, value)?;
        std::fs::rename(&temp_path, &path)?;
        log::trace!("Wrote {} bytes to {:?}", value.len(), path);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn describe(&self) -> String {
        format!("file store at {}", self.dir.display())
    }
}
