//! CLI definitions for the config-weave binary.

use crate::provider::ProviderRef;
use crate::providers::{FileProvider, GlobFileProvider};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the merged configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// YAML document (default)
    #[default]
    Yaml,
    /// Pretty-printed JSON
    Json,
}

/// Merge configuration files into a single structure
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config files or glob patterns, merged in order (later entries win)
    #[arg(required = true, value_name = "FILE_OR_GLOB")]
    pub sources: Vec<String>,

    /// Cache artifact path; a present artifact is loaded instead of merging,
    /// and the merged result is persisted when it enables caching
    #[arg(short, long, value_name = "FILE")]
    pub cache: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub format: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Build the provider for one source argument.
///
/// Glob patterns expand to zero or more files; a literal path goes through
/// [`FileProvider`] so a typo'd filename fails loudly instead of merging as
/// an empty match.
pub fn provider_for_source(source: &str) -> ProviderRef {
    if source.contains(['*', '?', '[']) {
        ProviderRef::value(GlobFileProvider::new(source))
    } else {
        ProviderRef::value(FileProvider::new(source))
    }
}
