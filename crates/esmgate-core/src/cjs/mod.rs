//! CommonJS export discovery.
//!
//! Analysis runs in a sandbox behind [`CjsAnalyzer`]; [`NodeCjsAnalyzer`] is the
//! built-in one, backed by a Node.js subprocess.

mod node;

pub use node::{NodeCjsAnalyzer, DEFAULT_ANALYSIS_TIMEOUT};

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::path::Path;

/// Diagnostic reported when a module reached through the CommonJS path
/// actually contains ES module syntax.
pub const ESM_IN_CJS_DIAGNOSTIC: &str = "Unexpected export statement in CJS module";

/// `NODE_ENV` seen by the analyzed module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeEnv {
    #[default]
    Production,
    Development,
}

impl NodeEnv {
    #[must_use]
    pub fn from_dev(is_dev: bool) -> Self {
        if is_dev {
            Self::Development
        } else {
            Self::Production
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Development => "development",
        }
    }
}

impl fmt::Display for NodeEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a sandboxed CommonJS analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CjsAnalysis {
    /// Export names, in the order the module defines them.
    pub exports: Vec<String>,
    /// Diagnostic from the sandbox; empty when the module loaded cleanly.
    pub error: String,
}

impl CjsAnalysis {
    /// Whether the sandbox hit ES module syntax.
    #[must_use]
    pub fn is_esm_syntax(&self) -> bool {
        self.error.contains(ESM_IN_CJS_DIAGNOSTIC)
    }
}

/// Sandboxed CommonJS reflection capability.
///
/// Only a failure to run the sandbox is an `Err`; problems inside the analyzed
/// module are reported through [`CjsAnalysis::error`].
pub trait CjsAnalyzer: Send + Sync + Debug {
    fn analyze(&self, wd: &Path, import_path: &str, env: NodeEnv) -> Result<CjsAnalysis>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_env() {
        assert_eq!(NodeEnv::from_dev(true).as_str(), "development");
        assert_eq!(NodeEnv::from_dev(false).to_string(), "production");
    }

    #[test]
    fn test_esm_syntax_detection() {
        let analysis = CjsAnalysis {
            exports: vec![],
            error: format!("SyntaxError: {ESM_IN_CJS_DIAGNOSTIC} (3:0)"),
        };
        assert!(analysis.is_esm_syntax());
        assert!(!CjsAnalysis::default().is_esm_syntax());
    }

    #[test]
    fn test_analysis_json_defaults() {
        let analysis: CjsAnalysis = serde_json::from_str(r#"{"exports":["a","b"]}"#).unwrap();
        assert_eq!(analysis.exports, vec!["a", "b"]);
        assert!(analysis.error.is_empty());
    }
}
