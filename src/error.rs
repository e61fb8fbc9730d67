//! Error taxonomy for the aggregation pipeline.
//!
//! Resolution, provider execution, and cache serialization failures abort
//! the whole aggregation; there is no partial or degraded result. The one
//! deliberate exception, swallowing cache *write* failures, lives in the
//! cache module and never surfaces here.

use std::path::PathBuf;
use thiserror::Error;

/// Boxed error cause carried by wrapper variants.
pub type ErrorSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors produced while aggregating configuration.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// A named provider is not registered under any capability.
    #[error("unknown provider type `{0}`: not present in the registry")]
    UnknownProviderType(String),

    /// A named processor is not registered under any capability.
    #[error("unknown {expected} type `{name}`: not present in the registry")]
    UnknownProcessorType {
        name: String,
        /// Capability that was requested ("pre-processor" or "post-processor").
        expected: &'static str,
    },

    /// A name resolved to something other than a provider.
    #[error("`{name}` cannot be used as a provider: it is registered as {actual}")]
    UnsupportedProviderType { name: String, actual: String },

    /// A name resolved to something other than the requested processor kind.
    #[error("`{name}` cannot be used as a {expected}: it is registered as {actual}")]
    UnsupportedProcessorType {
        name: String,
        expected: &'static str,
        actual: String,
    },

    /// A provider (or one of its stream elements) produced something that is
    /// not a configuration structure.
    #[error("provider `{provider}` produced {actual}, expected a configuration map or list")]
    InvalidProviderReturn {
        provider: String,
        actual: &'static str,
    },

    /// A provider failed internally (e.g. an unreadable or unparsable file).
    #[error("provider `{provider}` failed")]
    Provider {
        provider: String,
        #[source]
        source: ErrorSource,
    },

    /// The final configuration could not be serialized for caching.
    #[error("configuration cannot be cached")]
    CannotCache(#[source] ErrorSource),

    /// A cache artifact exists but could not be read back. Not swallowed: a
    /// present-but-broken cache is an external inconsistency.
    #[error("failed to load cached configuration from {path}")]
    CacheRead {
        path: PathBuf,
        #[source]
        source: ErrorSource,
    },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AggregateError>;
