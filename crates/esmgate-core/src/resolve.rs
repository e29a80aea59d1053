//! Module resolution: manifest, exports map, ESM/CJS classification.

use crate::cjs::{CjsAnalyzer, NodeCjsAnalyzer, NodeEnv};
use crate::classify::{check_esm, SourceParser, SwcParser};
use crate::error::{Error, Result};
use crate::package::{resolve_manifest, NormalizedManifest, PackageIdentity};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// What a package (or submodule) resolves to.
///
/// A CommonJS module has an empty `module` field and gets a synthetic ES
/// wrapper over `exports`, which may be empty (`module.exports = fn`). Native
/// ES modules keep `module` and `export_default` reflects a `default` binding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolvedModule {
    #[serde(flatten)]
    pub manifest: NormalizedManifest,
    #[serde(rename = "exportDefault")]
    pub export_default: bool,
    pub exports: Vec<String>,
    pub dts: String,
}

impl ResolvedModule {
    /// Whether the module is served through the CommonJS wrapper.
    ///
    /// Resolution with export checking clears `module` whenever the entry is
    /// not a confirmed ES module.
    #[must_use]
    pub fn is_cjs(&self) -> bool {
        self.manifest.module.is_empty()
    }

    /// The specifier the module is served from: `module` if set, else `main`.
    #[must_use]
    pub fn entry(&self) -> &str {
        if self.manifest.module.is_empty() {
            &self.manifest.main
        } else {
            &self.manifest.module
        }
    }
}

/// Resolves package identities to [`ResolvedModule`]s.
#[derive(Debug, Clone)]
pub struct ModuleResolver {
    parser: Arc<dyn SourceParser>,
    analyzer: Arc<dyn CjsAnalyzer>,
}

impl Default for ModuleResolver {
    fn default() -> Self {
        Self::new(Arc::new(SwcParser), Arc::new(NodeCjsAnalyzer::default()))
    }
}

impl ModuleResolver {
    #[must_use]
    pub fn new(parser: Arc<dyn SourceParser>, analyzer: Arc<dyn CjsAnalyzer>) -> Self {
        Self { parser, analyzer }
    }

    /// Resolve `identity` inside `wd/node_modules`.
    ///
    /// With `check_exports` false only the manifest and submodule are resolved.
    /// Otherwise the declared `module` entry is classified; if it is missing or
    /// not an ES module the CommonJS sandbox enumerates exports, and a sandbox
    /// diagnostic about ES syntax sends the entry back through the classifier.
    pub fn resolve_module(
        &self,
        wd: &Path,
        identity: &PackageIdentity,
        check_exports: bool,
        is_dev: bool,
    ) -> Result<ResolvedModule> {
        let (manifest, source) = resolve_manifest(wd, identity)?;
        debug!(package = %identity, source = source.as_str(), "resolved manifest");

        let mut resolved = ResolvedModule {
            manifest,
            ..ResolvedModule::default()
        };
        if !check_exports {
            return Ok(resolved);
        }

        if !resolved.manifest.module.is_empty() {
            match check_esm(
                wd,
                identity.name(),
                &resolved.manifest.module,
                self.parser.as_ref(),
            ) {
                Ok(check) => {
                    resolved.manifest.module = check.resolved;
                    resolved.export_default = check.export_default;
                }
                Err(e) if e.is_recoverable() => {
                    warn!(package = %identity, module = %resolved.manifest.module, error = %e, "module entry is not usable, falling back to CJS");
                    resolved.manifest.module.clear();
                }
                Err(e) => return Err(e),
            }
        }

        if resolved.manifest.module.is_empty() {
            let import_path = identity.import_path();
            let analysis = self
                .analyzer
                .analyze(wd, &import_path, NodeEnv::from_dev(is_dev))?;

            if analysis.is_esm_syntax() {
                let specifier = if identity.has_submodule() {
                    identity.submodule().to_string()
                } else {
                    resolved.manifest.main.clone()
                };
                debug!(package = %identity, specifier = %specifier, "CJS sandbox saw ES syntax, reclassifying");

                let check = check_esm(wd, identity.name(), &specifier, self.parser.as_ref())
                    .map_err(|source| Error::Resolution {
                        specifier: import_path,
                        source: Box::new(source),
                    })?;
                resolved.manifest.module = check.resolved;
                resolved.export_default = check.export_default;
            } else {
                resolved.exports = analysis.exports;
                resolved.export_default = true;
            }
        }

        Ok(resolved)
    }
}
