//! Pipeline runner: pre-process, execute, merge-fold, post-process.
//!
//! Ordering is significant everywhere. Provider order determines merge
//! precedence (later wins); processor order determines transformation
//! precedence (each sees the previous one's output).

use crate::error::{AggregateError, Result};
use crate::merge::merge;
use crate::provider::{PostProcessorRef, PreProcessorRef, ProviderOutput, ProviderRef};
use crate::registry::Registry;
use crate::value::{ConfigMap, ConfigValue};
use tracing::debug;

/// Run the full aggregation pipeline and return the merged configuration.
///
/// Pre-processors fold over the provider list in order, then each provider
/// is resolved and invoked in sequence, merge-folding its output (streams
/// are drained to completion in yield order), and finally post-processors
/// fold over the merged configuration in order.
pub fn run(
    providers: Vec<ProviderRef>,
    pre_processors: Vec<PreProcessorRef>,
    post_processors: Vec<PostProcessorRef>,
    registry: &Registry,
) -> Result<ConfigValue> {
    let mut providers = providers;
    for processor_ref in pre_processors {
        let processor = processor_ref.resolve(registry)?;
        providers = processor.process(providers);
    }
    debug!(providers = providers.len(), "running provider pipeline");

    let mut merged = ConfigValue::Map(ConfigMap::new());
    for provider_ref in providers {
        let (provider, description) = provider_ref.resolve(registry)?;
        let output = provider
            .provide()
            .map_err(|source| AggregateError::Provider {
                provider: description.clone(),
                source: source.into(),
            })?;

        match output {
            ProviderOutput::Config(fragment) => {
                merged = fold_fragment(merged, &fragment, &description)?;
            }
            ProviderOutput::Stream(stream) => {
                for fragment in stream {
                    merged = fold_fragment(merged, &fragment, &description)?;
                }
            }
        }
    }

    for processor_ref in post_processors {
        let processor = processor_ref.resolve(registry)?;
        merged = processor.process(merged);
    }

    Ok(merged)
}

/// Merge one provider fragment into the accumulator, rejecting non-structures.
fn fold_fragment(
    accumulator: ConfigValue,
    fragment: &ConfigValue,
    provider: &str,
) -> Result<ConfigValue> {
    if !fragment.is_structure() {
        return Err(AggregateError::InvalidProviderReturn {
            provider: provider.to_string(),
            actual: fragment.type_label(),
        });
    }
    Ok(merge(accumulator, fragment))
}
