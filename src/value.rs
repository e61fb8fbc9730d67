//! Configuration value model.
//!
//! A configuration is a tree of [`ConfigValue`]s: scalars, append-ordered
//! lists, and insertion-ordered string-keyed maps. Two extra variants carry
//! merge directives ([`ConfigValue::Replace`], [`ConfigValue::Remove`]) that
//! alter how the merge engine combines a key; they exist only during merging
//! and have no literal representation on disk.

use indexmap::IndexMap;
use serde_json::Number;
use thiserror::Error;

/// Insertion-ordered map of string keys to configuration values.
pub type ConfigMap = IndexMap<String, ConfigValue>;

/// A node in a configuration tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ConfigValue {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    /// Append-ordered entries (integer-keyed semantics: merging concatenates).
    List(Vec<ConfigValue>),
    /// String-keyed entries (merging recurses per key).
    Map(ConfigMap),
    /// Merge directive: substitute the wrapped value verbatim, skipping the
    /// recursive merge for this key.
    Replace(Box<ConfigValue>),
    /// Merge directive: delete this key from the accumulator if present.
    Remove,
}

/// A merge directive survived into a configuration that is being serialized.
///
/// Directives are consumed by the merge engine; one that reaches
/// serialization (e.g. injected by a post-processor, or nested inside a
/// `Replace` payload) cannot be written as literal data.
#[derive(Debug, Error)]
#[error("merge directive at `{path}` has no literal representation")]
pub struct DirectiveInValue {
    /// JSONPath-style location of the offending directive.
    pub path: String,
}

impl ConfigValue {
    /// Wrap a value in a `Replace` directive.
    pub fn replace(value: impl Into<ConfigValue>) -> Self {
        ConfigValue::Replace(Box::new(value.into()))
    }

    /// Whether this value is a configuration structure (map or list), as
    /// opposed to a scalar or a merge directive.
    pub fn is_structure(&self) -> bool {
        matches!(self, ConfigValue::Map(_) | ConfigValue::List(_))
    }

    /// Short human-readable label for error messages.
    pub fn type_label(&self) -> &'static str {
        match self {
            ConfigValue::Null => "null",
            ConfigValue::Bool(_) => "a boolean",
            ConfigValue::Number(_) => "a number",
            ConfigValue::String(_) => "a string",
            ConfigValue::List(_) => "a list",
            ConfigValue::Map(_) => "a map",
            ConfigValue::Replace(_) => "a replace directive",
            ConfigValue::Remove => "a remove directive",
        }
    }

    /// Look up a top-level key. Returns `None` for non-map values.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        match self {
            ConfigValue::Map(map) => map.get(key),
            _ => None,
        }
    }

    /// Borrow as a map, if this is one.
    pub fn as_map(&self) -> Option<&ConfigMap> {
        match self {
            ConfigValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Integer view of the value, used for the cache file-mode flag.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            ConfigValue::Number(n) => n.as_u64(),
            _ => None,
        }
    }

    /// Loose truthiness, matching the semantics of the reserved cache flag:
    /// null, false, zero, and empty strings/lists/maps are falsy. A `Replace`
    /// wrapper defers to its payload; `Remove` is falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            ConfigValue::Null | ConfigValue::Remove => false,
            ConfigValue::Bool(b) => *b,
            ConfigValue::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
            ConfigValue::String(s) => !s.is_empty(),
            ConfigValue::List(items) => !items.is_empty(),
            ConfigValue::Map(map) => !map.is_empty(),
            ConfigValue::Replace(inner) => inner.is_truthy(),
        }
    }

    /// Convert a JSON value into a configuration value. Infallible: JSON has
    /// no directive forms, so every input maps cleanly.
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => ConfigValue::Null,
            serde_json::Value::Bool(b) => ConfigValue::Bool(b),
            serde_json::Value::Number(n) => ConfigValue::Number(n),
            serde_json::Value::String(s) => ConfigValue::String(s),
            serde_json::Value::Array(items) => {
                ConfigValue::List(items.into_iter().map(ConfigValue::from_json).collect())
            }
            serde_json::Value::Object(map) => ConfigValue::Map(
                map.into_iter()
                    .map(|(k, v)| (k, ConfigValue::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Convert into plain JSON data, failing if any merge directive survives
    /// in the tree.
    pub fn to_json(&self) -> Result<serde_json::Value, DirectiveInValue> {
        self.to_json_at("$")
    }

    fn to_json_at(&self, path: &str) -> Result<serde_json::Value, DirectiveInValue> {
        match self {
            ConfigValue::Null => Ok(serde_json::Value::Null),
            ConfigValue::Bool(b) => Ok(serde_json::Value::Bool(*b)),
            ConfigValue::Number(n) => Ok(serde_json::Value::Number(n.clone())),
            ConfigValue::String(s) => Ok(serde_json::Value::String(s.clone())),
            ConfigValue::List(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    out.push(item.to_json_at(&format!("{path}[{index}]"))?);
                }
                Ok(serde_json::Value::Array(out))
            }
            ConfigValue::Map(map) => {
                let mut out = serde_json::Map::with_capacity(map.len());
                for (key, value) in map {
                    out.insert(key.clone(), value.to_json_at(&format!("{path}.{key}"))?);
                }
                Ok(serde_json::Value::Object(out))
            }
            ConfigValue::Replace(_) | ConfigValue::Remove => Err(DirectiveInValue {
                path: path.to_string(),
            }),
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Bool(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Number(Number::from(value))
    }
}

impl From<u64> for ConfigValue {
    fn from(value: u64) -> Self {
        ConfigValue::Number(Number::from(value))
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::String(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::String(value)
    }
}

impl From<Vec<ConfigValue>> for ConfigValue {
    fn from(value: Vec<ConfigValue>) -> Self {
        ConfigValue::List(value)
    }
}

impl From<ConfigMap> for ConfigValue {
    fn from(value: ConfigMap) -> Self {
        ConfigValue::Map(value)
    }
}
