//! config-weave CLI
//!
//! Merges the given config files (globs allowed) in order and prints the
//! result, optionally going through a cache artifact.

use anyhow::Result;
use clap::Parser;
use config_weave::cli::{Cli, OutputFormat, provider_for_source};
use config_weave::ConfigAggregator;
use tracing::{Level, debug};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut builder = ConfigAggregator::builder();
    for source in &cli.sources {
        debug!(source = %source, "adding provider");
        builder = builder.provider_ref(provider_for_source(source));
    }
    if let Some(cache) = &cli.cache {
        builder = builder.cache_path(cache);
    }

    let config = builder.build()?.into_config();
    let json = config.to_json()?;

    match cli.format {
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&json)?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&json)?),
    }
    Ok(())
}
