use std::path::PathBuf;
use thiserror::Error;

/// Result alias for esmgate operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Core error type for esmgate operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Root or submodule manifest is missing or corrupt.
    #[error("Failed to read manifest at {path}: {reason}")]
    ManifestRead { path: PathBuf, reason: String },

    /// Candidate module file could not be read.
    #[error("Failed to read module {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File parses but is not ES-module syntax.
    #[error("{path}: not a module")]
    NotAModule { path: PathBuf },

    /// The CJS export sandbox failed to run.
    #[error("parseCJSModuleExports: {0}")]
    CjsAnalysis(String),

    /// The last fallback (re-classification after an ESM diagnostic) failed.
    #[error("Failed to resolve '{specifier}': {source}")]
    Resolution {
        specifier: String,
        #[source]
        source: Box<Error>,
    },

    /// Stored resolution metadata failed to deserialize.
    #[error("Corrupt cache entry '{id}': {source}")]
    CacheCorruption {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Store error: {0}")]
    Store(String),

    #[error("Invalid package specifier: {0}")]
    InvalidSpecifier(String),
}

impl Error {
    #[must_use]
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    #[must_use]
    pub fn invalid_specifier(msg: impl Into<String>) -> Self {
        Self::InvalidSpecifier(msg.into())
    }

    pub(crate) fn manifest(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        Self::ManifestRead {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether the classifier failure allows falling back to CJS analysis.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::FileRead { .. } | Self::NotAModule { .. })
    }
}
