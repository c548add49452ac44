//! Snapshot persistence: key-value backends and the debounced auto-save
//! timer.
//!
//! The planner writes one serialized state under a single key. Backends only
//! need to store and return strings:
//!
//! - [`MemoryStore`]: process-local map, used by tests and as the in-memory
//!   fallback
//! - [`FileStore`]: one JSON file per key in a directory (native only)
//! - [`LocalStorage`]: the browser's `localStorage` (wasm32 only)

mod auto_save;
#[cfg(not(target_arch = "wasm32"))]
mod file;
#[cfg(target_arch = "wasm32")]
mod local_storage;
mod memory;

pub use auto_save::AutoSaveManager;
#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStore;
#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStorage;
pub use memory::MemoryStore;

use thiserror::Error;

/// Errors raised by a storage backend.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend cannot be reached at all (no window, storage disabled)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// The backend refused the write (quota, permissions)
    #[error("Storage write failed: {0}")]
    WriteFailed(String),
}

/// Minimal string key-value store the planner persists into.
pub trait KeyValueStore {
    /// Read the value stored under `key`, `None` if absent.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing an absent key succeeds.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;

    /// Short description for log messages.
    fn describe(&self) -> String;
}
