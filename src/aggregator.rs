//! Aggregator facade: wires cache, pipeline, and registry together.
//!
//! Construction does all the work. A cache hit short-circuits the pipeline
//! entirely; a miss runs pre-processors, providers, and post-processors in
//! order and then conditionally persists the result. After construction the
//! merged configuration is read-only.

use crate::cache;
use crate::error::Result;
use crate::pipeline;
use crate::provider::{
    PostProcessor, PostProcessorRef, PreProcessor, PreProcessorRef, Provider, ProviderRef,
};
use crate::registry::Registry;
use crate::value::ConfigValue;
use std::path::PathBuf;
use tracing::debug;

/// The aggregated configuration. Immutable once constructed.
#[derive(Debug)]
pub struct ConfigAggregator {
    config: ConfigValue,
}

impl ConfigAggregator {
    /// Start building an aggregator.
    pub fn builder() -> ConfigAggregatorBuilder {
        ConfigAggregatorBuilder::default()
    }

    /// The final merged configuration.
    pub fn config(&self) -> &ConfigValue {
        &self.config
    }

    /// Consume the aggregator and take ownership of the configuration.
    pub fn into_config(self) -> ConfigValue {
        self.config
    }
}

/// Builder collecting providers, processors, an optional cache path, and an
/// optional registry for named references.
#[derive(Default)]
pub struct ConfigAggregatorBuilder {
    providers: Vec<ProviderRef>,
    pre_processors: Vec<PreProcessorRef>,
    post_processors: Vec<PostProcessorRef>,
    cache_path: Option<PathBuf>,
    registry: Registry,
}

impl ConfigAggregatorBuilder {
    /// Append a provider by value.
    pub fn provider<P: Provider + 'static>(mut self, provider: P) -> Self {
        self.providers.push(ProviderRef::value(provider));
        self
    }

    /// Append a provider by registry name.
    pub fn named_provider(mut self, name: impl Into<String>) -> Self {
        self.providers.push(ProviderRef::named(name));
        self
    }

    /// Append an already-wrapped provider reference.
    pub fn provider_ref(mut self, provider: ProviderRef) -> Self {
        self.providers.push(provider);
        self
    }

    /// Append several provider references in order.
    pub fn providers(mut self, providers: impl IntoIterator<Item = ProviderRef>) -> Self {
        self.providers.extend(providers);
        self
    }

    /// Append a pre-processor by value.
    pub fn pre_processor<P: PreProcessor + 'static>(mut self, processor: P) -> Self {
        self.pre_processors.push(PreProcessorRef::value(processor));
        self
    }

    /// Append a pre-processor by registry name.
    pub fn named_pre_processor(mut self, name: impl Into<String>) -> Self {
        self.pre_processors.push(PreProcessorRef::named(name));
        self
    }

    /// Append a post-processor by value.
    pub fn post_processor<P: PostProcessor + 'static>(mut self, processor: P) -> Self {
        self.post_processors.push(PostProcessorRef::value(processor));
        self
    }

    /// Append a post-processor by registry name.
    pub fn named_post_processor(mut self, name: impl Into<String>) -> Self {
        self.post_processors.push(PostProcessorRef::named(name));
        self
    }

    /// Set the cache artifact path. An empty path disables caching.
    pub fn cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.cache_path = if path.as_os_str().is_empty() {
            None
        } else {
            Some(path)
        };
        self
    }

    /// Supply the registry used to resolve named references.
    pub fn registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    /// Run the aggregation: cache load, or pipeline plus conditional persist.
    pub fn build(self) -> Result<ConfigAggregator> {
        if let Some(config) = cache::try_load(self.cache_path.as_deref())? {
            debug!("cache hit, skipping providers and processors");
            return Ok(ConfigAggregator { config });
        }

        let config = pipeline::run(
            self.providers,
            self.pre_processors,
            self.post_processors,
            &self.registry,
        )?;
        cache::maybe_persist(self.cache_path.as_deref(), &config)?;
        Ok(ConfigAggregator { config })
    }
}

impl std::fmt::Debug for ConfigAggregatorBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigAggregatorBuilder")
            .field("providers", &self.providers.len())
            .field("pre_processors", &self.pre_processors.len())
            .field("post_processors", &self.post_processors.len())
            .field("cache_path", &self.cache_path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::StaticProvider;
    use serde_json::json;

    fn cfg(value: serde_json::Value) -> ConfigValue {
        ConfigValue::from_json(value)
    }

    #[test]
    fn test_build_without_providers_is_empty() {
        let aggregator = ConfigAggregator::builder().build().unwrap();
        assert_eq!(aggregator.config().to_json().unwrap(), json!({}));
    }

    #[test]
    fn test_build_merges_in_order() {
        let aggregator = ConfigAggregator::builder()
            .provider(StaticProvider::new(cfg(json!({"db": {"host": "a"}}))))
            .provider(StaticProvider::new(cfg(json!({"db": {"port": 5432}}))))
            .build()
            .unwrap();
        assert_eq!(
            aggregator.config().to_json().unwrap(),
            json!({"db": {"host": "a", "port": 5432}})
        );
    }

    #[test]
    fn test_named_references_use_registry() {
        let mut registry = Registry::new();
        registry.register_provider("defaults", || {
            StaticProvider::new(ConfigValue::from_json(json!({"debug": false})))
        });
        registry.register_post_processor("enable-debug", || {
            |config: ConfigValue| {
                crate::merge::merge(config, &ConfigValue::from_json(json!({"debug": true})))
            }
        });

        let aggregator = ConfigAggregator::builder()
            .named_provider("defaults")
            .named_post_processor("enable-debug")
            .registry(registry)
            .build()
            .unwrap();
        assert_eq!(aggregator.config().to_json().unwrap(), json!({"debug": true}));
    }

    #[test]
    fn test_empty_cache_path_disables_caching() {
        let builder = ConfigAggregator::builder().cache_path("");
        assert!(builder.cache_path.is_none());
    }

    #[test]
    fn test_into_config() {
        let config = ConfigAggregator::builder()
            .provider(StaticProvider::new(cfg(json!({"a": 1}))))
            .build()
            .unwrap()
            .into_config();
        assert_eq!(config.to_json().unwrap(), json!({"a": 1}));
    }
}
