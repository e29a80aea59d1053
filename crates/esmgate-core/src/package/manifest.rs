//! Package manifest loading and normalization.
//!
//! Reads `package.json`, folds legacy entry fields (`jsnext:main`, `es2015`,
//! `typings`, `"type": "module"`) and root exports into a canonical
//! [`NormalizedManifest`], then applies submodule resolution.

use super::exports::{flatten_conditions, match_subpath, ExportValue, SubpathMatchKind};
use super::identity::PackageIdentity;
use crate::error::{Error, Result};
use esmgate_util::fs::{file_exists, join_specifier};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Raw manifest fields relevant to entry resolution.
///
/// String fields tolerate non-string values (treated as not declared), which
/// shows up in the wild for `main` and `module`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NpmPackage {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub version: String,
    #[serde(rename = "type", deserialize_with = "lenient_string")]
    pub kind: String,
    #[serde(deserialize_with = "lenient_string")]
    pub main: String,
    #[serde(deserialize_with = "lenient_string")]
    pub module: String,
    #[serde(rename = "jsnext:main", deserialize_with = "lenient_string")]
    pub jsnext_main: String,
    #[serde(deserialize_with = "lenient_string")]
    pub es2015: String,
    #[serde(deserialize_with = "lenient_string")]
    pub types: String,
    #[serde(deserialize_with = "lenient_string")]
    pub typings: String,
    pub exports: ExportValue,
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        _ => String::new(),
    })
}

/// Canonical entry-point shape of a package (or of one of its submodules).
///
/// Empty strings mean "not declared".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizedManifest {
    pub name: String,
    pub version: String,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub kind: String,
    pub main: String,
    pub module: String,
    pub types: String,
    pub typings: String,
    /// The declared exports tree, untouched by normalization.
    #[serde(rename = "definedExports", skip_serializing_if = "ExportValue::is_none")]
    pub exports: ExportValue,
}

impl NormalizedManifest {
    /// Whether the package declares `"type": "module"`.
    #[must_use]
    pub fn is_module_type(&self) -> bool {
        self.kind == "module"
    }

    /// Overwrite entry fields with whatever the exports entry declares.
    fn apply_exports(&mut self, value: &ExportValue) {
        let targets = flatten_conditions(value, self.is_module_type());
        if let Some(main) = targets.main {
            self.main = main;
        }
        if let Some(module) = targets.module {
            self.module = module;
        }
        if let Some(types) = targets.types {
            self.types = types;
        }
        if let Some(typings) = targets.typings {
            self.typings = typings;
        }
    }

    fn clear_entries(&mut self) {
        self.main.clear();
        self.module.clear();
        self.types.clear();
        self.typings.clear();
    }
}

impl NpmPackage {
    /// Apply the normalization rules and produce a canonical manifest.
    #[must_use]
    pub fn normalize(&self) -> NormalizedManifest {
        let mut m = NormalizedManifest {
            name: self.name.clone(),
            version: self.version.clone(),
            kind: self.kind.clone(),
            main: self.main.clone(),
            module: self.module.clone(),
            types: self.types.clone(),
            typings: self.typings.clone(),
            exports: self.exports.clone(),
        };

        if m.module.is_empty() && !self.jsnext_main.is_empty() {
            m.module.clone_from(&self.jsnext_main);
        }
        if m.module.is_empty() && !self.es2015.is_empty() {
            m.module.clone_from(&self.es2015);
        }
        if m.module.is_empty() && m.is_module_type() && !m.main.is_empty() {
            m.module.clone_from(&m.main);
        }
        if m.types.is_empty() && !m.typings.is_empty() {
            m.types.clone_from(&m.typings);
        }

        match &self.exports {
            ExportValue::Target(_) | ExportValue::Array(_) => m.apply_exports(&self.exports),
            ExportValue::Conditions(map) => {
                if let Some(root) = map.get(".") {
                    m.apply_exports(root);
                } else if !self.exports.has_subpath_keys() {
                    m.apply_exports(&self.exports);
                }
            }
            ExportValue::None => {}
        }

        m
    }
}

/// Read and parse a `package.json`.
///
/// A missing file or malformed JSON is a [`Error::ManifestRead`].
pub fn load_manifest(path: &Path) -> Result<NpmPackage> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::manifest(path, e))?;
    serde_json::from_str(&content).map_err(|e| Error::manifest(path, e))
}

/// Directory of an installed package.
#[must_use]
pub fn package_dir(wd: &Path, name: &str) -> PathBuf {
    wd.join("node_modules").join(name)
}

/// Where a package's entry fields came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestSource {
    /// Package root, no submodule requested.
    Root,
    /// `node_modules/<pkg>/<sub>/package.json`.
    SubmoduleManifest,
    /// Exact exports key.
    ExportsExact,
    /// Wildcard exports key.
    ExportsWildcard,
    /// Submodule path used as the entry itself.
    BareFallback,
}

impl ManifestSource {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::SubmoduleManifest => "submodule_manifest",
            Self::ExportsExact => "exports_exact",
            Self::ExportsWildcard => "exports_wildcard",
            Self::BareFallback => "bare_fallback",
        }
    }
}

/// Load the root manifest of `identity` and resolve its submodule, if any.
///
/// The root manifest is never modified; submodule overrides work on a copy.
pub fn resolve_manifest(
    wd: &Path,
    identity: &PackageIdentity,
) -> Result<(NormalizedManifest, ManifestSource)> {
    let pkg_dir = package_dir(wd, identity.name());
    let root = load_manifest(&pkg_dir.join("package.json"))?.normalize();

    if !identity.has_submodule() {
        return Ok((root, ManifestSource::Root));
    }
    let submodule = identity.submodule();

    let sub_manifest = pkg_dir.join(submodule).join("package.json");
    if file_exists(&sub_manifest) {
        let raw = load_manifest(&sub_manifest)?;
        let normalized = raw.normalize();
        let join = |field: &str| {
            if field.is_empty() {
                String::new()
            } else {
                join_specifier(submodule, field)
            }
        };

        let mut m = root.clone();
        m.main = join(&raw.main);
        m.module = join(&normalized.module);
        m.types = join(&raw.types);
        m.typings = join(&raw.typings);
        debug!(package = %identity, "using submodule manifest");
        return Ok((m, ManifestSource::SubmoduleManifest));
    }

    if let Some(matched) = match_subpath(&root.exports, submodule) {
        let mut m = root.clone();
        m.clear_entries();
        m.apply_exports(&matched.value);
        let source = match matched.kind {
            SubpathMatchKind::Exact => ManifestSource::ExportsExact,
            SubpathMatchKind::Wildcard { .. } => ManifestSource::ExportsWildcard,
        };
        debug!(package = %identity, key = %matched.key, source = source.as_str(), "matched exports entry");
        return Ok((m, source));
    }

    let mut m = root.clone();
    if m.module.is_empty() {
        m.main = submodule.to_string();
    } else {
        m.module = submodule.to_string();
    }
    m.types.clear();
    m.typings.clear();
    debug!(package = %identity, "no exports entry, using submodule path as entry");
    Ok((m, ManifestSource::BareFallback))
}
