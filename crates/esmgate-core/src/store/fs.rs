use super::{ArtifactStore, MetadataStore, StoreRecord};
use crate::error::{Error, Result};
use esmgate_util::fs::atomic_write;
use esmgate_util::hash::blake3_key;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;

/// Hex characters of the BLAKE3 digest used for record file names.
const KEY_LEN: usize = 32;

#[derive(Serialize, Deserialize)]
struct RecordFile {
    id: String,
    fields: StoreRecord,
}

/// Metadata store with one JSON file per record.
///
/// File names are the hashed id, so ids containing `/` or `@` stay flat.
/// Writes go through a temp file and a rename.
#[derive(Debug, Clone)]
pub struct FsMetadataStore {
    dir: PathBuf,
}

impl FsMetadataStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn record_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", blake3_key(id, KEY_LEN)))
    }
}

impl MetadataStore for FsMetadataStore {
    fn get(&self, id: &str) -> Result<Option<StoreRecord>> {
        let path = self.record_path(id);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let file: RecordFile = serde_json::from_slice(&bytes)
            .map_err(|e| Error::store(format!("unreadable record {}: {e}", path.display())))?;
        if file.id != id {
            return Ok(None);
        }
        Ok(Some(file.fields))
    }

    fn put(&self, id: &str, record: StoreRecord) -> Result<()> {
        let file = RecordFile {
            id: id.to_string(),
            fields: record,
        };
        let bytes = serde_json::to_vec(&file)
            .map_err(|e| Error::store(format!("failed to encode record {id}: {e}")))?;
        atomic_write(&self.record_path(id), &bytes)?;
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<()> {
        match fs::remove_file(self.record_path(id)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Artifact store rooted at a directory (the one containing `builds/`).
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ArtifactStore for FsArtifactStore {
    fn exists(&self, path: &str) -> Result<bool> {
        match fs::metadata(self.root.join(path)) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
