//! Release and persisted-format versions.
//!
//! `SCHEMA_VERSION` is baked into every build id and into the data directory,
//! so bumping it orphans old cache entries instead of misreading them.

/// Crate version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Format version of build ids and persisted resolution records.
pub const SCHEMA_VERSION: u32 = 1;

/// Leading path segment of build ids and the data directory, e.g. `v1`.
#[must_use]
pub fn schema_prefix() -> String {
    format!("v{SCHEMA_VERSION}")
}

/// `esmgate <version> (schema v<N>)`, plus the git hash when the build
/// provides `ESMGATE_BUILD_GIT_HASH`.
#[must_use]
pub fn version_string() -> String {
    match option_env!("ESMGATE_BUILD_GIT_HASH") {
        Some(hash) => format!("esmgate {VERSION} (schema {}, {hash})", schema_prefix()),
        None => format!("esmgate {VERSION} (schema {})", schema_prefix()),
    }
}
