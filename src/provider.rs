//! Provider and processor contracts.
//!
//! A provider produces one configuration fragment or a one-shot stream of
//! fragments. A pre-processor rewrites the ordered provider list before any
//! provider runs; a post-processor rewrites the fully merged configuration
//! afterwards. Each can be passed by value (any implementing type, including
//! plain closures) or by registry name via the `*Ref` wrappers.

use crate::error::Result;
use crate::registry::Registry;
use crate::value::ConfigValue;

/// Output of a single provider invocation.
pub enum ProviderOutput {
    /// One configuration structure.
    Config(ConfigValue),
    /// A finite, forward-only sequence of structures, merge-folded in yield
    /// order before the next provider runs.
    Stream(Box<dyn Iterator<Item = ConfigValue>>),
}

impl std::fmt::Debug for ProviderOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderOutput::Config(value) => f.debug_tuple("Config").field(value).finish(),
            ProviderOutput::Stream(_) => f.debug_tuple("Stream").field(&"..").finish(),
        }
    }
}

impl From<ConfigValue> for ProviderOutput {
    fn from(value: ConfigValue) -> Self {
        ProviderOutput::Config(value)
    }
}

impl From<crate::value::ConfigMap> for ProviderOutput {
    fn from(value: crate::value::ConfigMap) -> Self {
        ProviderOutput::Config(ConfigValue::Map(value))
    }
}

/// A `Vec` of fragments becomes a stream: each element is a separate
/// structure folded in order, not a single list value.
impl From<Vec<ConfigValue>> for ProviderOutput {
    fn from(fragments: Vec<ConfigValue>) -> Self {
        ProviderOutput::Stream(Box::new(fragments.into_iter()))
    }
}

/// A unit producing a configuration fragment (or a stream of them).
pub trait Provider {
    fn provide(&self) -> anyhow::Result<ProviderOutput>;
}

/// Any infallible zero-argument closure whose output converts to
/// [`ProviderOutput`] is a provider.
impl<F, T> Provider for F
where
    F: Fn() -> T,
    T: Into<ProviderOutput>,
{
    fn provide(&self) -> anyhow::Result<ProviderOutput> {
        Ok(self().into())
    }
}

/// Transforms the ordered provider list before execution. May reorder,
/// filter, inject, or wrap providers.
pub trait PreProcessor {
    fn process(&self, providers: Vec<ProviderRef>) -> Vec<ProviderRef>;
}

impl<F> PreProcessor for F
where
    F: Fn(Vec<ProviderRef>) -> Vec<ProviderRef>,
{
    fn process(&self, providers: Vec<ProviderRef>) -> Vec<ProviderRef> {
        self(providers)
    }
}

/// Transforms the fully merged configuration after all providers have run.
pub trait PostProcessor {
    fn process(&self, config: ConfigValue) -> ConfigValue;
}

impl<F> PostProcessor for F
where
    F: Fn(ConfigValue) -> ConfigValue,
{
    fn process(&self, config: ConfigValue) -> ConfigValue {
        self(config)
    }
}

/// Human-readable description of a wrapped value's type, used to identify
/// the offender in error messages. Closures compile to unnameable types, so
/// they get a generic label.
fn describe_type<T>() -> String {
    let name = std::any::type_name::<T>();
    if name.contains("{{closure}}") {
        "closure".to_string()
    } else {
        name.rsplit("::").next().unwrap_or(name).to_string()
    }
}

/// Reference to a provider: a ready-made value or a registry name.
pub struct ProviderRef {
    kind: ProviderRefKind,
}

enum ProviderRefKind {
    Named(String),
    Value {
        provider: Box<dyn Provider>,
        description: String,
    },
}

impl ProviderRef {
    /// Reference a provider registered under `name`.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            kind: ProviderRefKind::Named(name.into()),
        }
    }

    /// Wrap a ready-made provider value.
    pub fn value<P: Provider + 'static>(provider: P) -> Self {
        Self {
            kind: ProviderRefKind::Value {
                provider: Box::new(provider),
                description: describe_type::<P>(),
            },
        }
    }

    /// Description used in error messages: the registry name, or the wrapped
    /// value's type.
    pub fn description(&self) -> &str {
        match &self.kind {
            ProviderRefKind::Named(name) => name,
            ProviderRefKind::Value { description, .. } => description,
        }
    }

    /// Resolve into an invocable provider plus its description.
    pub(crate) fn resolve(self, registry: &Registry) -> Result<(Box<dyn Provider>, String)> {
        match self.kind {
            ProviderRefKind::Named(name) => {
                let provider = registry.resolve_provider(&name)?;
                Ok((provider, name))
            }
            ProviderRefKind::Value {
                provider,
                description,
            } => Ok((provider, description)),
        }
    }
}

impl std::fmt::Debug for ProviderRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ProviderRefKind::Named(name) => f.debug_tuple("Named").field(name).finish(),
            ProviderRefKind::Value { description, .. } => {
                f.debug_tuple("Value").field(description).finish()
            }
        }
    }
}

impl<P: Provider + 'static> From<P> for ProviderRef {
    fn from(provider: P) -> Self {
        ProviderRef::value(provider)
    }
}

/// Reference to a pre-processor: a ready-made value or a registry name.
pub struct PreProcessorRef {
    kind: PreProcessorRefKind,
}

enum PreProcessorRefKind {
    Named(String),
    Value(Box<dyn PreProcessor>),
}

impl PreProcessorRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            kind: PreProcessorRefKind::Named(name.into()),
        }
    }

    pub fn value<P: PreProcessor + 'static>(processor: P) -> Self {
        Self {
            kind: PreProcessorRefKind::Value(Box::new(processor)),
        }
    }

    pub(crate) fn resolve(self, registry: &Registry) -> Result<Box<dyn PreProcessor>> {
        match self.kind {
            PreProcessorRefKind::Named(name) => registry.resolve_pre_processor(&name),
            PreProcessorRefKind::Value(processor) => Ok(processor),
        }
    }
}

impl<P: PreProcessor + 'static> From<P> for PreProcessorRef {
    fn from(processor: P) -> Self {
        PreProcessorRef::value(processor)
    }
}

/// Reference to a post-processor: a ready-made value or a registry name.
pub struct PostProcessorRef {
    kind: PostProcessorRefKind,
}

enum PostProcessorRefKind {
    Named(String),
    Value(Box<dyn PostProcessor>),
}

impl PostProcessorRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            kind: PostProcessorRefKind::Named(name.into()),
        }
    }

    pub fn value<P: PostProcessor + 'static>(processor: P) -> Self {
        Self {
            kind: PostProcessorRefKind::Value(Box::new(processor)),
        }
    }

    pub(crate) fn resolve(self, registry: &Registry) -> Result<Box<dyn PostProcessor>> {
        match self.kind {
            PostProcessorRefKind::Named(name) => registry.resolve_post_processor(&name),
            PostProcessorRefKind::Value(processor) => Ok(processor),
        }
    }
}

impl<P: PostProcessor + 'static> From<P> for PostProcessorRef {
    fn from(processor: P) -> Self {
        PostProcessorRef::value(processor)
    }
}
