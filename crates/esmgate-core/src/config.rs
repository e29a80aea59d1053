use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default build target used when deriving build ids.
pub const DEFAULT_TARGET: &str = "es2020";

/// Runtime configuration for esmgate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Working directory containing `node_modules`.
    pub cwd: PathBuf,

    /// Whether to emit JSON logs.
    pub json_logs: bool,

    /// Verbosity level (0 = INFO, 1 = DEBUG, 2+ = TRACE).
    pub verbosity: u8,

    /// Node.js binary used by the CJS export sandbox.
    pub node_bin: PathBuf,

    /// Build target folded into build ids.
    pub target: String,

    /// Metadata store directory. `None` disables the resolution cache.
    pub db_dir: Option<PathBuf>,

    /// Artifact store root (contains `builds/`). `None` disables the resolution cache.
    pub storage_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            json_logs: false,
            verbosity: 0,
            node_bin: PathBuf::from("node"),
            target: DEFAULT_TARGET.to_string(),
            db_dir: None,
            storage_dir: None,
        }
    }
}

impl Config {
    /// Create a new config with the given working directory.
    #[must_use]
    pub fn new(cwd: PathBuf) -> Self {
        Self {
            cwd,
            ..Default::default()
        }
    }

    /// Load a config from a JSON file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Set verbosity level.
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set JSON log output.
    #[must_use]
    pub fn with_json_logs(mut self, json: bool) -> Self {
        self.json_logs = json;
        self
    }

    /// Set the Node.js binary.
    #[must_use]
    pub fn with_node_bin(mut self, node_bin: PathBuf) -> Self {
        self.node_bin = node_bin;
        self
    }

    /// Set the build target.
    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    /// Enable the resolution cache backed by the given directories.
    #[must_use]
    pub fn with_stores(mut self, db_dir: PathBuf, storage_dir: PathBuf) -> Self {
        self.db_dir = Some(db_dir);
        self.storage_dir = Some(storage_dir);
        self
    }

    /// Whether both stores are configured.
    #[must_use]
    pub fn cache_enabled(&self) -> bool {
        self.db_dir.is_some() && self.storage_dir.is_some()
    }
}
