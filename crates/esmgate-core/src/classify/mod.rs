//! Module kind classification (ESM vs CommonJS).
//!
//! Parsing is a capability behind [`SourceParser`]; [`SwcParser`] is the
//! built-in implementation.

mod swc;

pub use swc::{parse_exports, SwcParser};

use crate::error::{Error, Result};
use crate::package::package_dir;
use esmgate_util::fs::{dir_exists, file_exists, join_specifier, read_to_string_lossy};
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Source extensions that are read as-is; anything else gets `.js` appended.
pub const SOURCE_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx", "mjs"];

/// Export style reported by a parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportsKind {
    Esm,
    Cjs,
}

/// Parser configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    pub typescript: bool,
    pub jsx: bool,
    /// Drop warnings and non-fatal diagnostics.
    pub suppress_diagnostics: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            typescript: false,
            jsx: false,
            suppress_diagnostics: true,
        }
    }
}

impl ParseOptions {
    /// Options for a file, based on its extension.
    #[must_use]
    pub fn for_path(path: &Path) -> Self {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        Self {
            typescript: matches!(ext, "ts" | "tsx" | "mts" | "cts"),
            jsx: matches!(ext, "jsx" | "tsx"),
            ..Self::default()
        }
    }
}

/// What a parser learned about a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutcome {
    pub kind: ExportsKind,
    /// Top-level export names, in first-appearance order.
    pub named_exports: Vec<String>,
    /// False when the source could not be parsed.
    pub success: bool,
}

impl ParseOutcome {
    #[must_use]
    pub fn has_export(&self, name: &str) -> bool {
        self.named_exports.iter().any(|n| n == name)
    }
}

/// Static parser capability.
pub trait SourceParser: Send + Sync + Debug {
    /// Report the export style and named exports of `source`.
    fn parse(&self, source: &str, options: &ParseOptions) -> ParseOutcome;
}

/// A module specifier confirmed to be an ES module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EsmCheck {
    /// Specifier relative to the package directory, after `index.*` probing.
    pub resolved: String,
    /// Whether a top-level `default` export exists.
    pub export_default: bool,
}

fn has_source_extension(specifier: &str) -> bool {
    Path::new(specifier)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

/// Classify `specifier` inside `node_modules/<package_name>`.
///
/// Directories are probed for `index.mjs` then `index.js`; a missing source
/// extension is completed with `.js` for reading (the returned specifier keeps
/// its original form). Unreadable files are [`Error::FileRead`], files that
/// parse as CommonJS are [`Error::NotAModule`]. A file the parser cannot handle
/// is accepted as ESM without a default export.
pub fn check_esm(
    wd: &Path,
    package_name: &str,
    specifier: &str,
    parser: &dyn SourceParser,
) -> Result<EsmCheck> {
    let pkg_dir = package_dir(wd, package_name);

    let mut specifier = specifier.to_string();
    if dir_exists(&pkg_dir.join(&specifier)) {
        let mjs = join_specifier(&specifier, "index.mjs");
        specifier = if file_exists(&pkg_dir.join(&mjs)) {
            mjs
        } else {
            join_specifier(&specifier, "index.js")
        };
    }

    let mut filename = pkg_dir.join(&specifier);
    if !has_source_extension(&specifier) {
        let mut os = filename.into_os_string();
        os.push(".js");
        filename = PathBuf::from(os);
    }

    let source = read_to_string_lossy(&filename).map_err(|source| Error::FileRead {
        path: filename.clone(),
        source,
    })?;

    let outcome = parser.parse(&source, &ParseOptions::for_path(&filename));
    let mut export_default = false;
    if outcome.success {
        if outcome.kind != ExportsKind::Esm {
            return Err(Error::NotAModule { path: filename });
        }
        export_default = outcome.has_export("default");
    } else {
        debug!(path = %filename.display(), "parse failed, accepting as ESM without default export");
    }

    Ok(EsmCheck {
        resolved: specifier,
        export_default,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn package(files: &[(&str, &str)]) -> TempDir {
        let dir = tempdir().unwrap();
        let pkg_dir = dir.path().join("node_modules").join("pkg");
        for (rel, content) in files {
            let path = pkg_dir.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        dir
    }

    #[test]
    fn test_esm_with_default() {
        let dir = package(&[("index.js", "export default function(){}")]);
        let check = check_esm(dir.path(), "pkg", "index.js", &SwcParser).unwrap();
        assert_eq!(check.resolved, "index.js");
        assert!(check.export_default);
    }

    #[test]
    fn test_esm_without_default() {
        let dir = package(&[("es/index.js", "export const a = 1;")]);
        let check = check_esm(dir.path(), "pkg", "es/index.js", &SwcParser).unwrap();
        assert!(!check.export_default);
    }

    #[test]
    fn test_cjs_is_not_a_module() {
        let dir = package(&[("index.js", "module.exports = { a: 1 };")]);
        let err = check_esm(dir.path(), "pkg", "index.js", &SwcParser).unwrap_err();
        assert!(matches!(err, Error::NotAModule { .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_missing_file() {
        let dir = package(&[("package.json", "{}")]);
        let err = check_esm(dir.path(), "pkg", "missing.js", &SwcParser).unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }

    #[test]
    fn test_appends_js_extension() {
        let dir = package(&[("lib/bar.js", "export default 1;")]);
        let check = check_esm(dir.path(), "pkg", "lib/bar", &SwcParser).unwrap();
        assert_eq!(check.resolved, "lib/bar");
        assert!(check.export_default);
    }

    #[test]
    fn test_directory_prefers_index_mjs() {
        let dir = package(&[
            ("es/index.mjs", "export default 1;"),
            ("es/index.js", "module.exports = 1;"),
        ]);
        let check = check_esm(dir.path(), "pkg", "es", &SwcParser).unwrap();
        assert_eq!(check.resolved, "es/index.mjs");
    }

    #[test]
    fn test_directory_falls_back_to_index_js() {
        let dir = package(&[("es/index.js", "export const x = 1;")]);
        let check = check_esm(dir.path(), "pkg", "./es", &SwcParser).unwrap();
        assert_eq!(check.resolved, "es/index.js");
    }

    #[test]
    fn test_unparseable_source_is_accepted() {
        let dir = package(&[("index.js", "export default `never closed")]);
        let check = check_esm(dir.path(), "pkg", "index.js", &SwcParser).unwrap();
        assert!(!check.export_default);
    }

    #[test]
    fn test_default_export_of_quote_regex() {
        let dir = package(&[("index.js", "export default /['\"]/;")]);
        let check = check_esm(dir.path(), "pkg", "index.js", &SwcParser).unwrap();
        assert!(check.export_default);
    }

    #[test]
    fn test_cjs_with_quote_regex_is_not_a_module() {
        let dir = package(&[(
            "index.js",
            "if (typeof s === 'string') /\"/.test(s);\nmodule.exports = 1;",
        )]);
        let err = check_esm(dir.path(), "pkg", "index.js", &SwcParser).unwrap_err();
        assert!(matches!(err, Error::NotAModule { .. }));
    }

    #[test]
    fn test_tsx_entry_uses_typescript_syntax() {
        let dir = package(&[(
            "src/app.tsx",
            "type P = { n: number };\nexport default (p: P) => <b>{p.n}</b>;",
        )]);
        let check = check_esm(dir.path(), "pkg", "src/app.tsx", &SwcParser).unwrap();
        assert!(check.export_default);
    }

    #[test]
    fn test_parse_options_for_path() {
        let ts = ParseOptions::for_path(Path::new("a/b.tsx"));
        assert!(ts.typescript && ts.jsx && ts.suppress_diagnostics);
        let js = ParseOptions::for_path(Path::new("a/b.js"));
        assert!(!js.typescript && !js.jsx);
    }
}
