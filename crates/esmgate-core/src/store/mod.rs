//! Metadata and artifact store capabilities.
//!
//! The resolution cache only talks to these traits. Memory implementations back
//! tests and one-shot runs; filesystem implementations persist across runs.

mod fs;
mod memory;

pub use fs::{FsArtifactStore, FsMetadataStore};
pub use memory::{MemoryArtifactStore, MemoryMetadataStore};

use crate::error::Result;
use std::collections::BTreeMap;

/// A keyed record of named binary fields.
pub type StoreRecord = BTreeMap<String, Vec<u8>>;

/// Key/value store for resolution metadata, keyed by build id.
///
/// Each operation is atomic per key. Concurrent writers to the same key race;
/// the last write wins.
pub trait MetadataStore: Send + Sync {
    fn get(&self, id: &str) -> Result<Option<StoreRecord>>;
    fn put(&self, id: &str, record: StoreRecord) -> Result<()>;
    /// Deleting a missing key is not an error.
    fn delete(&self, id: &str) -> Result<()>;
}

/// Read-only view of the build artifact store.
pub trait ArtifactStore: Send + Sync {
    /// Whether an artifact exists at `path` (relative to the store root).
    fn exists(&self, path: &str) -> Result<bool>;
}
