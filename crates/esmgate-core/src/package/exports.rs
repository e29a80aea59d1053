//! Package.json exports field evaluation.
//!
//! The exports field is kept as an ordered tree ([`ExportValue`]) so that
//! matching is defined over declaration order rather than map iteration order:
//! - Exact subpath keys (`"./lib/core"`)
//! - Wildcard subpath keys (`"./lib/languages/*"`) with textual `*` substitution
//! - Conditional exports (`import` / `require` / `types` / `default` ...)

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A node of the exports tree.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(untagged)]
pub enum ExportValue {
    /// Not declared, `null`, or a shape we don't understand (numbers, booleans).
    #[default]
    None,
    /// A target path, e.g. `"./dist/index.js"`.
    Target(String),
    /// Fallback array; the first usable entry wins.
    Array(Vec<ExportValue>),
    /// Subpath keys or condition names mapped to nested values, in declaration order.
    Conditions(IndexMap<String, ExportValue>),
}

impl ExportValue {
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    #[must_use]
    pub fn as_target(&self) -> Option<&str> {
        match self {
            Self::Target(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_conditions(&self) -> Option<&IndexMap<String, ExportValue>> {
        match self {
            Self::Conditions(map) => Some(map),
            _ => None,
        }
    }

    /// Replace every `*` in every string leaf with `suffix`.
    #[must_use]
    pub fn substitute(&self, suffix: &str) -> Self {
        match self {
            Self::None => Self::None,
            Self::Target(s) => Self::Target(s.replace('*', suffix)),
            Self::Array(items) => Self::Array(items.iter().map(|v| v.substitute(suffix)).collect()),
            Self::Conditions(map) => Self::Conditions(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.substitute(suffix)))
                    .collect(),
            ),
        }
    }

    /// Reduce this value to a single target using a condition priority list.
    ///
    /// Strings are returned as-is, arrays yield their first resolvable entry,
    /// and condition maps are searched in `priority` order, descending into
    /// nested maps with the same list.
    #[must_use]
    pub fn select(&self, priority: &[&str]) -> Option<&str> {
        match self {
            Self::None => None,
            Self::Target(s) => Some(s),
            Self::Array(items) => items.iter().find_map(|v| v.select(priority)),
            Self::Conditions(map) => priority
                .iter()
                .filter_map(|cond| map.get(*cond))
                .find_map(|v| v.select(priority)),
        }
    }

    /// Whether any key is a subpath (`"."` or `"./..."`) rather than a condition name.
    #[must_use]
    pub fn has_subpath_keys(&self) -> bool {
        self.as_conditions()
            .is_some_and(|map| map.keys().any(|k| k.starts_with('.')))
    }
}

impl From<&Value> for ExportValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::String(s) => Self::Target(s.clone()),
            Value::Array(items) => Self::Array(items.iter().map(Self::from).collect()),
            Value::Object(map) => Self::Conditions(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from(v)))
                    .collect(),
            ),
            Value::Null | Value::Bool(_) | Value::Number(_) => Self::None,
        }
    }
}

impl<'de> Deserialize<'de> for ExportValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Go through Value so odd shapes degrade to None instead of failing the manifest
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from(&value))
    }
}

/// How a submodule request matched the exports map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubpathMatchKind {
    Exact,
    Wildcard {
        /// Part of the request that replaced `*`.
        suffix: String,
    },
}

/// A matched exports entry for a submodule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubpathMatch {
    /// The exports key that matched, e.g. `"./lib/languages/*"`.
    pub key: String,
    /// The entry value, with `*` already substituted for wildcard matches.
    pub value: ExportValue,
    pub kind: SubpathMatchKind,
}

/// Match a submodule (without the leading `./`) against an exports tree.
///
/// An exact key `"./" + submodule` wins over any wildcard. Otherwise the first
/// key in declaration order that ends in `/*` and whose prefix starts the request
/// is used; scanning stops there even if later patterns would also match.
#[must_use]
pub fn match_subpath(exports: &ExportValue, submodule: &str) -> Option<SubpathMatch> {
    let map = exports.as_conditions()?;
    let request = format!("./{submodule}");

    if let Some(value) = map.get(&request) {
        return Some(SubpathMatch {
            key: request,
            value: value.clone(),
            kind: SubpathMatchKind::Exact,
        });
    }

    map.iter().find_map(|(key, value)| {
        if !key.ends_with("/*") {
            return None;
        }
        let prefix = key.strip_suffix('*')?;
        let suffix = request.strip_prefix(prefix)?;
        Some(SubpathMatch {
            key: key.clone(),
            value: value.substitute(suffix),
            kind: SubpathMatchKind::Wildcard {
                suffix: suffix.to_string(),
            },
        })
    })
}

/// Condition names that select an ES module entry.
pub const MODULE_CONDITIONS: &[&str] = &["import", "module", "es2015"];

/// Condition names that select a CommonJS entry.
pub const MAIN_CONDITIONS: &[&str] = &["require", "node"];

/// Condition names that select a type declaration entry.
pub const TYPES_CONDITIONS: &[&str] = &["types", "typings"];

/// Priority used when a condition's value is itself a condition map.
pub const NESTED_CONDITIONS: &[&str] = &["default", "import", "module", "require"];

/// Entry fields chosen from a condition object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionTargets {
    pub main: Option<String>,
    pub module: Option<String>,
    pub types: Option<String>,
    pub typings: Option<String>,
}

/// Flatten an exports entry into entry-point fields.
///
/// - a plain string goes to `module` for `"type": "module"` packages, `main` otherwise
/// - `import`/`module`/`es2015` feed `module`; `require`/`node` feed `main`
/// - `types`/`typings` feed themselves, also when nested under `import`/`require`
/// - `default` fills `module` for module-type packages, otherwise `main`, only if still empty
/// - other conditions (`browser`, `development`, ...) are ignored
#[must_use]
pub fn flatten_conditions(value: &ExportValue, module_type: bool) -> ConditionTargets {
    let mut out = ConditionTargets::default();

    let map = match value {
        ExportValue::None => return out,
        ExportValue::Target(s) => {
            if module_type {
                out.module = Some(s.clone());
            } else {
                out.main = Some(s.clone());
            }
            return out;
        }
        ExportValue::Array(items) => {
            return items
                .iter()
                .find(|v| matches!(v, ExportValue::Target(_) | ExportValue::Conditions(_)))
                .map(|v| flatten_conditions(v, module_type))
                .unwrap_or_default();
        }
        ExportValue::Conditions(map) => map,
    };

    let pick = |conditions: &[&str]| -> Option<String> {
        conditions
            .iter()
            .filter_map(|cond| map.get(*cond))
            .find_map(|v| v.select(NESTED_CONDITIONS))
            .map(str::to_string)
    };

    out.module = pick(MODULE_CONDITIONS);
    out.main = pick(MAIN_CONDITIONS);
    out.types = map.get("types").and_then(|v| v.select(TYPES_CONDITIONS)).map(str::to_string);
    out.typings = map.get("typings").and_then(|v| v.select(TYPES_CONDITIONS)).map(str::to_string);

    if out.types.is_none() {
        // "import": { "types": "./index.d.mts", "default": "./index.mjs" }
        out.types = MODULE_CONDITIONS
            .iter()
            .chain(MAIN_CONDITIONS)
            .filter_map(|cond| map.get(*cond)?.as_conditions())
            .find_map(|nested| nested.get("types").and_then(ExportValue::as_target))
            .map(str::to_string);
    }

    if let Some(default) = map.get("default").and_then(|v| v.select(NESTED_CONDITIONS)) {
        if module_type && out.module.is_none() {
            out.module = Some(default.to_string());
        } else if out.main.is_none() {
            out.main = Some(default.to_string());
        }
    }

    out
}
