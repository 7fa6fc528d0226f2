//! Persistence backends for the day cache and the timer-ad schedule.
//!
//! [`KeyValueStore`] is the storage seam: the app supplies whatever the
//! platform offers (a web localStorage bridge, mobile preferences, a
//! directory of files). Stores are synchronous and fallible; every caller
//! in this crate absorbs store failures rather than surfacing them.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use crate::error::{Result, SutradharError};

/// String key/value persistence.
pub trait KeyValueStore: Send + Sync {
    /// Read a value. `Ok(None)` when the key is absent.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Write a value.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a value. Deleting an absent key is not an error.
    fn remove_item(&self, key: &str) -> Result<()>;
}

/// In-memory store. The default when no persistence is configured, and the
/// natural test double.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.remove(key);
        Ok(())
    }
}

/// One file per key under a directory.
///
/// Keys are sanitized to filesystem-safe names. Missing files read as
/// absent; everything else surfaces as [`SutradharError::Storage`].
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Store under an explicit directory (created on first write).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store under the default location: `$SUTRADHAR_CACHE_DIR`, falling
    /// back to the platform cache directory plus `sutradhar`.
    pub fn default_dir() -> Self {
        let dir = std::env::var("SUTRADHAR_CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::cache_dir()
                    .unwrap_or_else(|| PathBuf::from(".cache"))
                    .join("sutradhar")
            });
        Self { dir }
    }

    /// The directory backing this store.
    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SutradharError::Storage(e.to_string())),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| SutradharError::Storage(e.to_string()))?;
        std::fs::write(self.path_for(key), value)
            .map_err(|e| SutradharError::Storage(e.to_string()))
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SutradharError::Storage(e.to_string())),
        }
    }
}
