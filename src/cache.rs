//! Cache artifact lifecycle: load-if-present, else compute-and-store.
//!
//! The artifact is a YAML document with a provenance header (generator
//! identity and an RFC 3339 timestamp as `#` comments). Loading a present
//! artifact is authoritative: providers and processors are skipped for that
//! construction. Writing is best-effort: serialization failures are loud
//! (they indicate an uncacheable configuration), write failures are
//! swallowed so a broken disk never prevents configuration from loading.

use crate::error::{AggregateError, Result};
use crate::value::ConfigValue;
use chrono::Utc;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Reserved key inside the *computed* configuration: truthy enables caching.
pub const CACHE_ENABLED_KEY: &str = "config_cache_enabled";

/// Reserved key inside the computed configuration: Unix permission bits for
/// the cache file (e.g. `0o600`). Ignored on non-Unix targets.
pub const CACHE_FILE_MODE_KEY: &str = "config_cache_filemode";

/// Load a previously cached configuration.
///
/// Returns `None` when no path is configured (or it is empty) or no artifact
/// exists there. A present-but-unreadable artifact propagates an error; the
/// cache is assumed externally trustworthy, so corruption is the caller's
/// problem to address, not something to silently recompute around.
pub fn try_load(path: Option<&Path>) -> Result<Option<ConfigValue>> {
    let Some(path) = path.filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(None);
    };
    if !path.exists() {
        debug!(path = %path.display(), "no cached configuration present");
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|source| AggregateError::CacheRead {
        path: path.to_path_buf(),
        source: source.into(),
    })?;
    let json: serde_json::Value =
        serde_yaml::from_str(&content).map_err(|source| AggregateError::CacheRead {
            path: path.to_path_buf(),
            source: source.into(),
        })?;

    debug!(path = %path.display(), "loaded cached configuration");
    Ok(Some(ConfigValue::from_json(json)))
}

/// Persist the computed configuration if caching is configured and enabled.
///
/// No-op without a path or when the configuration's `config_cache_enabled`
/// key is not truthy. Serialization failure is an error; write failure is
/// logged and swallowed.
pub fn maybe_persist(path: Option<&Path>, config: &ConfigValue) -> Result<()> {
    let Some(path) = path.filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };
    let enabled = config
        .get(CACHE_ENABLED_KEY)
        .map(ConfigValue::is_truthy)
        .unwrap_or(false);
    if !enabled {
        debug!(path = %path.display(), "caching not enabled by computed configuration");
        return Ok(());
    }

    let rendered = render(config)?;
    // Out-of-range modes are ignored rather than truncated into surprising
    // permission bits.
    let mode = config
        .get(CACHE_FILE_MODE_KEY)
        .and_then(ConfigValue::as_u64)
        .and_then(|m| u32::try_from(m).ok());

    match write_atomic(path, &rendered, mode) {
        Ok(()) => debug!(path = %path.display(), "cached configuration written"),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to write configuration cache")
        }
    }
    Ok(())
}

/// Render the artifact text: provenance header plus a YAML literal.
fn render(config: &ConfigValue) -> Result<String> {
    let json = config
        .to_json()
        .map_err(|source| AggregateError::CannotCache(Box::new(source)))?;
    let body =
        serde_yaml::to_string(&json).map_err(|source| AggregateError::CannotCache(source.into()))?;

    Ok(format!(
        "# Generated by {} {}\n# Date: {}\n{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        Utc::now().to_rfc3339(),
        body
    ))
}

/// Write via a temporary file in the target directory plus an atomic rename,
/// so concurrent readers never observe a partial artifact.
fn write_atomic(path: &Path, contents: &str, mode: Option<u32>) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents.as_bytes())?;

    #[cfg(unix)]
    if let Some(mode) = mode {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(mode))?;
    }
    #[cfg(not(unix))]
    let _ = mode;

    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}
