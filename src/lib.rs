//! config-weave: deep-merging configuration aggregation.
//!
//! An ordered list of providers each contributes a configuration fragment;
//! fragments are merge-folded left-to-right into one structure (later
//! providers win), optionally transformed by pre- and post-processors, and
//! optionally persisted to a cache artifact that short-circuits subsequent
//! constructions.

pub mod aggregator;
pub mod cache;
pub mod cli;
pub mod error;
pub mod merge;
pub mod pipeline;
pub mod provider;
pub mod providers;
pub mod registry;
pub mod value;

pub use aggregator::{ConfigAggregator, ConfigAggregatorBuilder};
pub use cache::{CACHE_ENABLED_KEY, CACHE_FILE_MODE_KEY};
pub use error::{AggregateError, Result};
pub use merge::{merge, merge_all};
pub use provider::{
    PostProcessor, PostProcessorRef, PreProcessor, PreProcessorRef, Provider, ProviderOutput,
    ProviderRef,
};
pub use providers::{FileProvider, GlobFileProvider, StaticProvider};
pub use registry::Registry;
pub use value::{ConfigMap, ConfigValue};
