//! Persistence for the endpoint health map across process restarts.

use crate::health::EndpointHealth;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Errors persisting or loading the health map.
#[derive(Debug, thiserror::Error)]
pub enum HealthStoreError {
    /// The backing store could not be read or written.
    #[error("health store io error: {0}")]
    Io(String),
    /// The persisted blob could not be decoded.
    #[error("health store decode error: {0}")]
    Decode(String),
}

impl chain_types::ErrorCode for HealthStoreError {
    fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "HEALTH_STORE_IO",
            Self::Decode(_) => "HEALTH_STORE_DECODE",
        }
    }
}

/// The wire shape persisted under one `storage_key`: a timestamp plus the health map
/// as it stood at that time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedHealthMap {
    /// Unix millis this blob was written.
    pub timestamp: i64,
    /// The health records as of `timestamp`.
    pub health_map: Vec<EndpointHealth>,
}

/// A key-value backend for one blob of endpoint health, keyed by a fixed string
/// (typically one per chain role). Implementations may back this with a file, an
/// embedded database, or a remote store; the manager only depends on the trait.
pub trait HealthStore: Send + Sync {
    /// Loads the persisted blob under `key`, if any.
    fn load(&self, key: &str) -> Result<Option<PersistedHealthMap>, HealthStoreError>;

    /// Persists `value` under `key`, replacing whatever was there before.
    fn save(&self, key: &str, value: &PersistedHealthMap) -> Result<(), HealthStoreError>;
}

/// An in-memory store, useful for tests and for hosts that accept losing health
/// history across restarts.
#[derive(Debug, Default)]
pub struct InMemoryHealthStore {
    blobs: parking_lot::Mutex<HashMap<String, PersistedHealthMap>>,
}

impl InMemoryHealthStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl HealthStore for InMemoryHealthStore {
    fn load(&self, key: &str) -> Result<Option<PersistedHealthMap>, HealthStoreError> {
        Ok(self.blobs.lock().get(key).cloned())
    }

    fn save(&self, key: &str, value: &PersistedHealthMap) -> Result<(), HealthStoreError> {
        self.blobs.lock().insert(key.to_string(), value.clone());
        Ok(())
    }
}

/// A store backed by one JSON file on disk, holding every key's blob in a single
/// top-level object.
#[derive(Debug)]
pub struct FileHealthStore {
    path: std::path::PathBuf,
}

impl FileHealthStore {
    /// Persists to `path`, creating it lazily on first `save`.
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_all(&self) -> Result<HashMap<String, PersistedHealthMap>, HealthStoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                serde_json::from_str(&contents).map_err(|e| HealthStoreError::Decode(e.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(HealthStoreError::Io(e.to_string())),
        }
    }

    fn write_all(&self, all: &HashMap<String, PersistedHealthMap>) -> Result<(), HealthStoreError> {
        let serialized = serde_json::to_string_pretty(all).map_err(|e| HealthStoreError::Decode(e.to_string()))?;
        std::fs::write(&self.path, serialized).map_err(|e| HealthStoreError::Io(e.to_string()))
    }
}

impl HealthStore for FileHealthStore {
    fn load(&self, key: &str) -> Result<Option<PersistedHealthMap>, HealthStoreError> {
        Ok(self.read_all()?.get(key).cloned())
    }

    fn save(&self, key: &str, value: &PersistedHealthMap) -> Result<(), HealthStoreError> {
        let mut all = self.read_all()?;
        all.insert(key.to_string(), value.clone());
        self.write_all(&all)
    }
}
