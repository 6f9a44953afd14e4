use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

/// Synchronous string-keyed store of serialized values
///
/// Reads never fail: a missing or unreadable key is reported as `None` and
/// callers fall back to their defaults. Writes may fail (disk full,
/// permissions) and callers treat that as non-fatal.
pub trait KvStore: Send + Sync {
    /// Read the raw serialized value under `key`, if present
    fn get(&self, key: &str) -> Option<String>;

    /// Write the raw serialized value under `key`
    fn set(&self, key: &str, raw: &str) -> Result<()>;

    /// Get store name for logging
    fn name(&self) -> &str;
}

/// File-backed store: one `<key>.json` file per key under a directory
///
/// Opening the store is the capability check for persistent storage. If the
/// directory cannot be created the environment has no durable store and the
/// caller should fall back to `NullStore`.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();

        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create store directory: {}", dir.display()))?;

        info!("File store opened at {}", dir.display());

        Ok(Self { dir })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.key_path(key);

        match fs::read_to_string(&path) {
            Ok(raw) => Some(raw),
            Err(e) => {
                debug!("No stored value for {:?}: {}", key, e);
                None
            }
        }
    }

    fn set(&self, key: &str, raw: &str) -> Result<()> {
        let path = self.key_path(key);

        fs::write(&path, raw)
            .with_context(|| format!("Failed to write store key {key:?} to {}", path.display()))
    }

    fn name(&self) -> &str {
        "file"
    }
}

/// In-memory store for tests and store-less environments
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, raw: &str) -> Result<()> {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), raw.to_string());
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// The no-storage fallback: reads nothing, accepts and discards writes
///
/// Used when no durable store is available so that every binding simply
/// initializes from its default and keeps state in memory for the session.
pub struct NullStore;

impl KvStore for NullStore {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&self, _key: &str, _raw: &str) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "null"
    }
}
