//! Built-in providers.
//!
//! `StaticProvider` serves an in-memory fragment, `FileProvider` reads one
//! config file, and `GlobFileProvider` expands a glob pattern into a stream
//! of fragments (one per matching file, in sorted path order).

use crate::provider::{Provider, ProviderOutput};
use crate::value::ConfigValue;
use anyhow::{Context, bail};
use std::path::{Path, PathBuf};

/// Provider wrapping a ready-made configuration fragment.
#[derive(Debug, Clone)]
pub struct StaticProvider {
    value: ConfigValue,
}

impl StaticProvider {
    pub fn new(value: impl Into<ConfigValue>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl Provider for StaticProvider {
    fn provide(&self) -> anyhow::Result<ProviderOutput> {
        Ok(self.value.clone().into())
    }
}

/// Provider reading a single YAML or JSON file.
///
/// The path is explicit, so every failure is loud: a missing file, an
/// unknown extension, and a parse error all abort aggregation.
#[derive(Debug, Clone)]
pub struct FileProvider {
    path: PathBuf,
}

impl FileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Provider for FileProvider {
    fn provide(&self) -> anyhow::Result<ProviderOutput> {
        Ok(load_file(&self.path)?.into())
    }
}

/// Provider expanding a glob pattern into a stream of fragments.
///
/// Matches are sorted so merge precedence is deterministic regardless of
/// filesystem enumeration order. A pattern with no matches yields an empty
/// stream; a matching file that fails to parse is an error.
#[derive(Debug, Clone)]
pub struct GlobFileProvider {
    pattern: String,
}

impl GlobFileProvider {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }
}

impl Provider for GlobFileProvider {
    fn provide(&self) -> anyhow::Result<ProviderOutput> {
        let matches = glob::glob(&self.pattern)
            .with_context(|| format!("Invalid glob pattern: {}", self.pattern))?;

        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in matches {
            paths.push(entry.with_context(|| format!("Unreadable match for {}", self.pattern))?);
        }
        paths.sort();

        let mut fragments = Vec::with_capacity(paths.len());
        for path in &paths {
            fragments.push(load_file(path)?);
        }
        Ok(ProviderOutput::Stream(Box::new(fragments.into_iter())))
    }
}

/// Parse one config file by extension.
fn load_file(path: &Path) -> anyhow::Result<ConfigValue> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed reading config file: {}", path.display()))?;

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let json: serde_json::Value = match ext.as_str() {
        "json" => serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON: {}", path.display()))?,
        "yaml" | "yml" => serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid YAML: {}", path.display()))?,
        other => bail!(
            "Unsupported config extension '.{}' for file {}",
            other,
            path.display()
        ),
    };

    Ok(ConfigValue::from_json(json))
}
