use crate::version::schema_prefix;
use std::path::PathBuf;

/// Get the data directory for esmgate.
///
/// Holds the default metadata store and artifact root when none is configured:
/// - Linux: `$XDG_DATA_HOME/esmgate/v{N}` or `~/.local/share/esmgate/v{N}`
/// - macOS: `~/Library/Application Support/esmgate/v{N}`
/// - Windows: `%APPDATA%\esmgate\v{N}`
#[must_use]
pub fn data_dir() -> PathBuf {
    let base = dirs_next::data_dir().map_or_else(
        || {
            dirs_next::home_dir().map_or_else(
                || PathBuf::from(".esmgate"),
                |p| p.join(".local").join("share").join("esmgate"),
            )
        },
        |p| p.join("esmgate"),
    );

    base.join(schema_prefix())
}

/// Default location of the metadata store.
#[must_use]
pub fn default_db_dir() -> PathBuf {
    data_dir().join("db")
}

/// Default root of the artifact store (the directory that contains `builds/`).
#[must_use]
pub fn default_storage_dir() -> PathBuf {
    data_dir().join("storage")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_dir_is_versioned() {
        let dir = data_dir();
        assert!(dir.ends_with(schema_prefix()));
    }

    #[test]
    fn test_default_dirs_under_data_dir() {
        assert!(default_db_dir().starts_with(data_dir()));
        assert!(default_storage_dir().starts_with(data_dir()));
    }
}
