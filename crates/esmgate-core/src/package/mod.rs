//! Package identity, manifest normalization and exports-map resolution.

mod exports;
mod identity;
mod manifest;

pub use exports::{
    flatten_conditions, match_subpath, ConditionTargets, ExportValue, SubpathMatch,
    SubpathMatchKind, MAIN_CONDITIONS, MODULE_CONDITIONS, NESTED_CONDITIONS, TYPES_CONDITIONS,
};
pub use identity::{BuildId, BuildOptions, PackageIdentity};
pub use manifest::{
    load_manifest, package_dir, resolve_manifest, ManifestSource, NormalizedManifest, NpmPackage,
};
