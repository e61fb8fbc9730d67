//! Component registry: named providers and processors.
//!
//! Replaces reflective instantiation with explicit constructor tables. Each
//! capability (provider, pre-processor, post-processor) has its own table of
//! zero-argument constructors; resolving a name against the wrong table
//! reports what the name is actually registered as.

use crate::error::{AggregateError, Result};
use crate::provider::{PostProcessor, PreProcessor, Provider};
use std::collections::HashMap;

type ProviderCtor = Box<dyn Fn() -> Box<dyn Provider>>;
type PreProcessorCtor = Box<dyn Fn() -> Box<dyn PreProcessor>>;
type PostProcessorCtor = Box<dyn Fn() -> Box<dyn PostProcessor>>;

/// Constructor tables for named components.
#[derive(Default)]
pub struct Registry {
    providers: HashMap<String, ProviderCtor>,
    pre_processors: HashMap<String, PreProcessorCtor>,
    post_processors: HashMap<String, PostProcessorCtor>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider constructor under `name`. Re-registering a name
    /// replaces the previous entry.
    pub fn register_provider<P, F>(&mut self, name: impl Into<String>, ctor: F) -> &mut Self
    where
        P: Provider + 'static,
        F: Fn() -> P + 'static,
    {
        self.providers
            .insert(name.into(), Box::new(move || Box::new(ctor())));
        self
    }

    /// Register a pre-processor constructor under `name`.
    pub fn register_pre_processor<P, F>(&mut self, name: impl Into<String>, ctor: F) -> &mut Self
    where
        P: PreProcessor + 'static,
        F: Fn() -> P + 'static,
    {
        self.pre_processors
            .insert(name.into(), Box::new(move || Box::new(ctor())));
        self
    }

    /// Register a post-processor constructor under `name`.
    pub fn register_post_processor<P, F>(&mut self, name: impl Into<String>, ctor: F) -> &mut Self
    where
        P: PostProcessor + 'static,
        F: Fn() -> P + 'static,
    {
        self.post_processors
            .insert(name.into(), Box::new(move || Box::new(ctor())));
        self
    }

    /// Capabilities a name is registered under, for mis-resolution messages.
    fn registered_as(&self, name: &str) -> Option<String> {
        let mut kinds = Vec::new();
        if self.providers.contains_key(name) {
            kinds.push("a provider");
        }
        if self.pre_processors.contains_key(name) {
            kinds.push("a pre-processor");
        }
        if self.post_processors.contains_key(name) {
            kinds.push("a post-processor");
        }
        if kinds.is_empty() {
            None
        } else {
            Some(kinds.join(" and "))
        }
    }

    pub(crate) fn resolve_provider(&self, name: &str) -> Result<Box<dyn Provider>> {
        if let Some(ctor) = self.providers.get(name) {
            return Ok(ctor());
        }
        match self.registered_as(name) {
            Some(actual) => Err(AggregateError::UnsupportedProviderType {
                name: name.to_string(),
                actual,
            }),
            None => Err(AggregateError::UnknownProviderType(name.to_string())),
        }
    }

    pub(crate) fn resolve_pre_processor(&self, name: &str) -> Result<Box<dyn PreProcessor>> {
        if let Some(ctor) = self.pre_processors.get(name) {
            return Ok(ctor());
        }
        match self.registered_as(name) {
            Some(actual) => Err(AggregateError::UnsupportedProcessorType {
                name: name.to_string(),
                expected: "pre-processor",
                actual,
            }),
            None => Err(AggregateError::UnknownProcessorType {
                name: name.to_string(),
                expected: "pre-processor",
            }),
        }
    }

    pub(crate) fn resolve_post_processor(&self, name: &str) -> Result<Box<dyn PostProcessor>> {
        if let Some(ctor) = self.post_processors.get(name) {
            return Ok(ctor());
        }
        match self.registered_as(name) {
            Some(actual) => Err(AggregateError::UnsupportedProcessorType {
                name: name.to_string(),
                expected: "post-processor",
                actual,
            }),
            None => Err(AggregateError::UnknownProcessorType {
                name: name.to_string(),
                expected: "post-processor",
            }),
        }
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("providers", &self.providers.keys().collect::<Vec<_>>())
            .field(
                "pre_processors",
                &self.pre_processors.keys().collect::<Vec<_>>(),
            )
            .field(
                "post_processors",
                &self.post_processors.keys().collect::<Vec<_>>(),
            )
            .finish()
    }
}
