//! Key-value session store.
//!
//! Values are persisted as JSON. The file-backed store keeps one file per
//! key under a directory built from the device identity, so state survives
//! process restarts but not reboots (it lives in the runtime directory).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{CommanderError, Result};

// =============================================================================
// Store Path
// =============================================================================

const APP_NAME: &str = "commander-rust";

/// Get the default base directory for session state.
/// - Linux: $XDG_RUNTIME_DIR/commander-rust/
/// - Elsewhere: the user cache directory, e.g. %LOCALAPPDATA%\commander-rust\
pub fn default_store_dir() -> Result<PathBuf> {
    dirs::runtime_dir()
        .or_else(dirs::cache_dir)
        .map(|p| p.join(APP_NAME))
        .ok_or_else(|| CommanderError::Storage("Could not find a runtime or cache directory".into()))
}

// =============================================================================
// Session Store
// =============================================================================

/// Persistent key-value store scoped to one physical device.
pub trait SessionStore {
    /// Raw JSON stored under `key`, if any.
    fn load_raw(&self, key: &str) -> Result<Option<String>>;

    /// Store raw JSON under `key`; `None` removes the key.
    fn store_raw(&mut self, key: &str, value: Option<&str>) -> Result<()>;

    /// Store `value` under `key`; `None` removes the key.
    fn store<T: Serialize + ?Sized>(&mut self, key: &str, value: Option<&T>) -> Result<()>
    where
        Self: Sized,
    {
        match value {
            Some(value) => {
                let json = serde_json::to_string(value).map_err(|e| {
                    CommanderError::Storage(format!("Failed to serialize '{}': {}", key, e))
                })?;
                self.store_raw(key, Some(&json))
            }
            None => self.store_raw(key, None),
        }
    }

    /// Load the value under `key`, or `default` when it is missing or unreadable.
    fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> Result<T>
    where
        Self: Sized,
    {
        let Some(json) = self.load_raw(key)? else {
            return Ok(default);
        };

        match serde_json::from_str(&json) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "ignoring unreadable stored value");
                Ok(default)
            }
        }
    }
}

// =============================================================================
// In-Memory Store
// =============================================================================

/// Store that lives as long as the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a value is stored under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}

impl SessionStore for MemoryStore {
    fn load_raw(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn store_raw(&mut self, key: &str, value: Option<&str>) -> Result<()> {
        match value {
            Some(value) => {
                self.values.insert(key.to_string(), value.to_string());
            }
            None => {
                self.values.remove(key);
            }
        }
        Ok(())
    }
}

// =============================================================================
// File Store
// =============================================================================

/// Store with one JSON file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store under the default base directory.
    pub fn new(prefixes: &[String]) -> Result<Self> {
        Self::with_base(&default_store_dir()?, prefixes)
    }

    /// Open a store under `base`, nested by `prefixes`.
    pub fn with_base(base: &Path, prefixes: &[String]) -> Result<Self> {
        let dir = prefixes.iter().fold(base.to_path_buf(), |dir, p| dir.join(p));
        Ok(Self { dir })
    }

    /// Directory holding this store's keys.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl SessionStore for FileStore {
    fn load_raw(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);

        if !path.exists() {
            return Ok(None);
        }

        std::fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| CommanderError::Storage(format!("Failed to read '{}': {}", key, e)))
    }

    fn store_raw(&mut self, key: &str, value: Option<&str>) -> Result<()> {
        let path = self.key_path(key);

        let Some(value) = value else {
            if path.exists() {
                std::fs::remove_file(&path).map_err(|e| {
                    CommanderError::Storage(format!("Failed to remove '{}': {}", key, e))
                })?;
            }
            return Ok(());
        };

        std::fs::create_dir_all(&self.dir).map_err(|e| {
            CommanderError::Storage(format!("Failed to create store dir: {}", e))
        })?;

        // write then rename, so readers never see a partial value
        let tmp = self.dir.join(format!(".{}.tmp", key));
        std::fs::write(&tmp, value)
            .map_err(|e| CommanderError::Storage(format!("Failed to write '{}': {}", key, e)))?;
        std::fs::rename(&tmp, &path)
            .map_err(|e| CommanderError::Storage(format!("Failed to replace '{}': {}", key, e)))?;

        Ok(())
    }
}
