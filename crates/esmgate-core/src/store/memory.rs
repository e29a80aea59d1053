use super::{ArtifactStore, MetadataStore, StoreRecord};
use crate::error::{Error, Result};
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

fn poisoned() -> Error {
    Error::store("store lock poisoned")
}

/// In-memory metadata store.
#[derive(Debug, Default)]
pub struct MemoryMetadataStore {
    records: RwLock<HashMap<String, StoreRecord>>,
}

impl MemoryMetadataStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().map_or(0, |r| r.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MetadataStore for MemoryMetadataStore {
    fn get(&self, id: &str) -> Result<Option<StoreRecord>> {
        let records = self.records.read().map_err(|_| poisoned())?;
        Ok(records.get(id).cloned())
    }

    fn put(&self, id: &str, record: StoreRecord) -> Result<()> {
        let mut records = self.records.write().map_err(|_| poisoned())?;
        records.insert(id.to_string(), record);
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<()> {
        let mut records = self.records.write().map_err(|_| poisoned())?;
        records.remove(id);
        Ok(())
    }
}

/// In-memory artifact store: a set of existing paths.
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    paths: RwLock<HashSet<String>>,
}

impl MemoryArtifactStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an artifact as present.
    pub fn insert(&self, path: impl Into<String>) {
        if let Ok(mut paths) = self.paths.write() {
            paths.insert(path.into());
        }
    }

    /// Mark an artifact as gone.
    pub fn remove(&self, path: &str) {
        if let Ok(mut paths) = self.paths.write() {
            paths.remove(path);
        }
    }
}

impl ArtifactStore for MemoryArtifactStore {
    fn exists(&self, path: &str) -> Result<bool> {
        let paths = self.paths.read().map_err(|_| poisoned())?;
        Ok(paths.contains(path))
    }
}
