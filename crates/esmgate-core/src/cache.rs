//! Resolution cache keyed by build id.
//!
//! Entries live in a [`MetadataStore`] and are only valid while the build
//! artifact they describe exists in the [`ArtifactStore`]. Stale or corrupt
//! entries are deleted when read.

use crate::error::{Error, Result};
use crate::package::BuildId;
use crate::resolve::ResolvedModule;
use crate::store::{ArtifactStore, MetadataStore, StoreRecord};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Record field holding the JSON-encoded [`ResolvedModule`].
pub const ESM_FIELD: &str = "esm";
/// Record field set to `[1]` when the build has a CSS sidecar.
pub const CSS_FIELD: &str = "css";

/// A cache hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResolution {
    pub module: ResolvedModule,
    pub has_css: bool,
}

pub struct ResolutionCache {
    db: Arc<dyn MetadataStore>,
    fs: Arc<dyn ArtifactStore>,
}

impl fmt::Debug for ResolutionCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolutionCache").finish_non_exhaustive()
    }
}

impl ResolutionCache {
    #[must_use]
    pub fn new(db: Arc<dyn MetadataStore>, fs: Arc<dyn ArtifactStore>) -> Self {
        Self { db, fs }
    }

    /// Look up a previous resolution for `id`.
    ///
    /// Returns `None` on a miss, and also when the entry is corrupt or its
    /// build artifact is gone; such entries are deleted.
    pub fn find_resolution(&self, id: &BuildId) -> Result<Option<CachedResolution>> {
        let Some(record) = self.db.get(id.as_str())? else {
            return Ok(None);
        };

        let esm = record.get(ESM_FIELD).map_or(&[][..], Vec::as_slice);
        let module: ResolvedModule = match serde_json::from_slice(esm) {
            Ok(module) => module,
            Err(source) => {
                let err = Error::CacheCorruption {
                    id: id.to_string(),
                    source,
                };
                warn!(error = %err, "dropping cache entry");
                self.db.delete(id.as_str())?;
                return Ok(None);
            }
        };

        if !self.fs.exists(&id.artifact_path())? {
            debug!(build_id = %id, "build artifact missing, dropping cache entry");
            self.db.delete(id.as_str())?;
            return Ok(None);
        }

        let has_css = match record.get(CSS_FIELD) {
            Some(flag) if flag.as_slice() == [1] => self.fs.exists(&id.css_sidecar_path())?,
            _ => false,
        };

        Ok(Some(CachedResolution { module, has_css }))
    }

    /// Record a successful resolution under `id`.
    pub fn store_resolution(&self, id: &BuildId, module: &ResolvedModule, has_css: bool) -> Result<()> {
        let esm = serde_json::to_vec(module)
            .map_err(|e| Error::store(format!("failed to encode resolution for {id}: {e}")))?;

        let mut record = StoreRecord::new();
        record.insert(ESM_FIELD.to_string(), esm);
        if has_css {
            record.insert(CSS_FIELD.to_string(), vec![1]);
        }
        self.db.put(id.as_str(), record)?;
        debug!(build_id = %id, has_css, "stored resolution");
        Ok(())
    }
}
