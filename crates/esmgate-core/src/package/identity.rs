//! Package identity and build id derivation.

use crate::error::{Error, Result};
use crate::version::schema_prefix;
use serde::Serialize;
use std::fmt;

/// An installed package plus an optional submodule.
///
/// Created per request and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageIdentity {
    name: String,
    version: String,
    submodule: String,
}

impl PackageIdentity {
    /// Create a new identity. A leading or trailing `/` on the submodule is dropped.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        submodule: impl Into<String>,
    ) -> Self {
        let submodule: String = submodule.into();
        Self {
            name: name.into(),
            version: version.into(),
            submodule: submodule.trim_matches('/').to_string(),
        }
    }

    /// Parse `name@version[/submodule]`, including scoped names (`@scope/name@1.0.0/sub`).
    ///
    /// The version must be a valid semver version. `.`/`..` segments and
    /// backslashes are rejected so the identity never points outside
    /// `node_modules/<name>`.
    pub fn parse(spec: &str) -> Result<Self> {
        let (scope, rest) = match spec.strip_prefix('@') {
            Some(rest) => {
                let (scope, rest) = rest
                    .split_once('/')
                    .ok_or_else(|| Error::invalid_specifier(format!("{spec}: missing package name after scope")))?;
                (Some(scope), rest)
            }
            None => (None, spec),
        };

        let (bare_name, rest) = rest
            .split_once('@')
            .ok_or_else(|| Error::invalid_specifier(format!("{spec}: missing version")))?;
        let (version, submodule) = rest.split_once('/').unwrap_or((rest, ""));

        if bare_name.is_empty() || scope.is_some_and(str::is_empty) {
            return Err(Error::invalid_specifier(format!("{spec}: empty package name")));
        }
        if matches!(bare_name, "." | "..") || scope.is_some_and(|s| matches!(s, "." | "..")) {
            return Err(Error::invalid_specifier(format!("{spec}: invalid package name")));
        }
        semver::Version::parse(version)
            .map_err(|e| Error::invalid_specifier(format!("{spec}: {e}")))?;
        if submodule.contains('\\')
            || submodule.split('/').any(|seg| matches!(seg, "." | ".."))
        {
            return Err(Error::invalid_specifier(format!(
                "{spec}: submodule must stay inside the package"
            )));
        }

        let name = match scope {
            Some(scope) => format!("@{scope}/{bare_name}"),
            None => bare_name.to_string(),
        };
        Ok(Self::new(name, version, submodule))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The requested subpath, empty for the package root.
    #[must_use]
    pub fn submodule(&self) -> &str {
        &self.submodule
    }

    #[must_use]
    pub fn has_submodule(&self) -> bool {
        !self.submodule.is_empty()
    }

    /// Stable key: `name@version/submodule`, or `name@version` with no submodule.
    #[must_use]
    pub fn cache_key(&self) -> String {
        if self.submodule.is_empty() {
            format!("{}@{}", self.name, self.version)
        } else {
            format!("{}@{}/{}", self.name, self.version, self.submodule)
        }
    }

    /// Specifier a Node.js `require` would use: `name/submodule` or `name`.
    #[must_use]
    pub fn import_path(&self) -> String {
        if self.submodule.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.name, self.submodule)
        }
    }
}

impl fmt::Display for PackageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cache_key())
    }
}

/// Flags that select a distinct build of the same package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Output target, e.g. `es2020`.
    pub target: String,
    /// Development build (`NODE_ENV=development` semantics).
    pub dev: bool,
}

impl BuildOptions {
    #[must_use]
    pub fn new(target: impl Into<String>, dev: bool) -> Self {
        Self {
            target: target.into(),
            dev,
        }
    }
}

/// Identifier of a resolved+built artifact.
///
/// Keys the metadata store and maps 1:1 onto `builds/<id>` in the artifact store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct BuildId(String);

impl BuildId {
    /// Derive the id for a package and build flags:
    /// `v{N}/{name}@{version}/{target}/{file}[.development].js`, where `file` is the
    /// submodule, or the last segment of the package name at the root.
    #[must_use]
    pub fn derive(identity: &PackageIdentity, options: &BuildOptions) -> Self {
        let file = if identity.has_submodule() {
            identity.submodule()
        } else {
            identity
                .name()
                .rsplit('/')
                .next()
                .unwrap_or_else(|| identity.name())
        };
        let dev = if options.dev { ".development" } else { "" };
        Self(format!(
            "{}/{}@{}/{}/{file}{dev}.js",
            schema_prefix(),
            identity.name(),
            identity.version(),
            options.target,
        ))
    }

    /// Wrap an id that was derived elsewhere.
    #[must_use]
    pub fn from_raw(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Artifact store path of the build output.
    #[must_use]
    pub fn artifact_path(&self) -> String {
        format!("builds/{}", self.0)
    }

    /// Artifact store path of the CSS sidecar.
    #[must_use]
    pub fn css_sidecar_path(&self) -> String {
        let stem = self.0.strip_suffix(".js").unwrap_or(&self.0);
        format!("builds/{stem}.css")
    }
}

impl fmt::Display for BuildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
