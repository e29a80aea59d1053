use esmgate_core::paths::{default_db_dir, default_storage_dir};
use esmgate_core::{BuildId, Config, FsArtifactStore, FsMetadataStore, ResolutionCache};
use miette::{IntoDiagnostic, Result};
use std::sync::Arc;

/// Look up a build id in the resolution cache.
///
/// Store directories default to the per-user data dir when not configured.
pub fn run(config: &Config, build_id: &str, json: bool) -> Result<()> {
    let db_dir = config.db_dir.clone().unwrap_or_else(default_db_dir);
    let storage_dir = config.storage_dir.clone().unwrap_or_else(default_storage_dir);
    let cache = ResolutionCache::new(
        Arc::new(FsMetadataStore::new(db_dir)),
        Arc::new(FsArtifactStore::new(storage_dir)),
    );

    let id = BuildId::from_raw(build_id);
    let hit = cache.find_resolution(&id).into_diagnostic()?;

    if json {
        let out = match &hit {
            Some(hit) => serde_json::json!({
                "build_id": id,
                "found": true,
                "has_css": hit.has_css,
                "module": hit.module,
            }),
            None => serde_json::json!({ "build_id": id, "found": false }),
        };
        println!("{out}");
        return Ok(());
    }

    match hit {
        Some(hit) => {
            println!("{id}");
            println!("  entry:   {}", hit.module.entry());
            println!("  default: {}", hit.module.export_default);
            if !hit.module.exports.is_empty() {
                println!("  exports: {}", hit.module.exports.join(", "));
            }
            println!("  css:     {}", hit.has_css);
        }
        None => println!("{id}: not cached"),
    }
    Ok(())
}
