//! Integration tests for the aggregator facade: pipeline ordering, merge
//! directives across providers, and the cache lifecycle.

use config_weave::{
    AggregateError, CACHE_ENABLED_KEY, ConfigAggregator, ConfigMap, ConfigValue, ProviderRef,
    StaticProvider, merge,
};
use serde_json::json;
use tempfile::TempDir;

fn cfg(value: serde_json::Value) -> ConfigValue {
    ConfigValue::from_json(value)
}

#[test]
fn final_config_is_the_left_fold_of_providers() {
    let fragments = [
        cfg(json!({"a": 1, "shared": {"x": 1}})),
        cfg(json!({"b": 2, "shared": {"y": 2}})),
        cfg(json!({"shared": {"x": 3}})),
    ];

    let aggregator = ConfigAggregator::builder()
        .providers(
            fragments
                .iter()
                .cloned()
                .map(|f| ProviderRef::value(StaticProvider::new(f))),
        )
        .build()
        .unwrap();

    let expected = fragments
        .iter()
        .fold(ConfigValue::Map(ConfigMap::new()), merge);
    assert_eq!(aggregator.config(), &expected);
    assert_eq!(
        aggregator.config().to_json().unwrap(),
        json!({"a": 1, "shared": {"x": 3, "y": 2}, "b": 2})
    );
}

#[test]
fn later_provider_can_retract_an_earlier_key() {
    let mut retraction = ConfigMap::new();
    retraction.insert("password".into(), ConfigValue::Remove);

    let aggregator = ConfigAggregator::builder()
        .provider(StaticProvider::new(cfg(
            json!({"user": "app", "password": "hunter2"}),
        )))
        .provider(StaticProvider::new(ConfigValue::Map(retraction)))
        .build()
        .unwrap();

    assert_eq!(
        aggregator.config().to_json().unwrap(),
        json!({"user": "app"})
    );
}

#[test]
fn later_provider_can_replace_a_subtree_wholesale() {
    let mut replacement = ConfigMap::new();
    replacement.insert(
        "routes".into(),
        ConfigValue::replace(cfg(json!({"home": "/"}))),
    );

    let aggregator = ConfigAggregator::builder()
        .provider(StaticProvider::new(cfg(
            json!({"routes": {"admin": "/admin", "home": "/old"}}),
        )))
        .provider(StaticProvider::new(ConfigValue::Map(replacement)))
        .build()
        .unwrap();

    assert_eq!(
        aggregator.config().to_json().unwrap(),
        json!({"routes": {"home": "/"}})
    );
}

#[test]
fn streamed_provider_output_is_flattened_in_yield_order() {
    let aggregator = ConfigAggregator::builder()
        .provider(|| {
            vec![
                cfg(json!({"step": 1, "one": true})),
                cfg(json!({"step": 2, "two": true})),
                cfg(json!({"step": 3})),
            ]
        })
        .build()
        .unwrap();

    assert_eq!(
        aggregator.config().to_json().unwrap(),
        json!({"step": 3, "one": true, "two": true})
    );
}

#[test]
fn invalid_provider_output_exposes_no_partial_config() {
    let result = ConfigAggregator::builder()
        .provider(StaticProvider::new(cfg(json!({"fine": true}))))
        .provider(|| ConfigValue::from("oops"))
        .build();

    match result {
        Err(AggregateError::InvalidProviderReturn { actual, .. }) => {
            assert_eq!(actual, "a string");
        }
        other => panic!("expected InvalidProviderReturn, got {other:?}"),
    }
}

#[test]
fn pre_processor_sees_and_rewrites_the_provider_list() {
    let aggregator = ConfigAggregator::builder()
        .provider(StaticProvider::new(cfg(json!({"origin": "original"}))))
        .pre_processor(|providers: Vec<ProviderRef>| {
            let mut providers = providers;
            providers.push(ProviderRef::value(StaticProvider::new(
                ConfigValue::from_json(json!({"origin": "injected"})),
            )));
            providers
        })
        .build()
        .unwrap();

    assert_eq!(
        aggregator.config().to_json().unwrap(),
        json!({"origin": "injected"})
    );
}

#[test]
fn post_processor_order_determines_outcome() {
    let build = |first: fn(ConfigValue) -> ConfigValue, second: fn(ConfigValue) -> ConfigValue| {
        ConfigAggregator::builder()
            .post_processor(first)
            .post_processor(second)
            .build()
            .unwrap()
            .into_config()
    };

    fn set_k1(config: ConfigValue) -> ConfigValue {
        merge(config, &ConfigValue::from_json(json!({"k": 1})))
    }
    fn set_k2(config: ConfigValue) -> ConfigValue {
        merge(config, &ConfigValue::from_json(json!({"k": 2})))
    }

    assert_eq!(build(set_k1, set_k2).to_json().unwrap(), json!({"k": 2}));
    assert_eq!(build(set_k2, set_k1).to_json().unwrap(), json!({"k": 1}));
}

#[test]
fn cache_disabled_config_writes_no_artifact() {
    let temp = TempDir::new().unwrap();
    let cache_path = temp.path().join("cache.yaml");

    let aggregator = ConfigAggregator::builder()
        .provider(StaticProvider::new(cfg(json!({"a": 1}))))
        .cache_path(&cache_path)
        .build()
        .unwrap();

    assert_eq!(aggregator.config().to_json().unwrap(), json!({"a": 1}));
    assert!(!cache_path.exists());
}

#[test]
fn cache_hit_reproduces_config_without_providers() {
    let temp = TempDir::new().unwrap();
    let cache_path = temp.path().join("cache.yaml");

    let first = ConfigAggregator::builder()
        .provider(StaticProvider::new(cfg(json!({
            CACHE_ENABLED_KEY: true,
            "server": {"host": "localhost", "port": 8080},
            "features": ["a", "b"]
        }))))
        .cache_path(&cache_path)
        .build()
        .unwrap();
    assert!(cache_path.exists());

    // Second construction: empty provider list, cache must be authoritative.
    let second = ConfigAggregator::builder()
        .cache_path(&cache_path)
        .build()
        .unwrap();
    assert_eq!(second.config(), first.config());
}

#[test]
fn cache_hit_skips_providers_entirely() {
    let temp = TempDir::new().unwrap();
    let cache_path = temp.path().join("cache.yaml");

    ConfigAggregator::builder()
        .provider(StaticProvider::new(cfg(json!({CACHE_ENABLED_KEY: true, "v": 1}))))
        .cache_path(&cache_path)
        .build()
        .unwrap();

    // A provider that would fail loudly if invoked.
    let result = ConfigAggregator::builder()
        .provider(|| -> ConfigValue { panic!("provider must not run on a cache hit") })
        .cache_path(&cache_path)
        .build()
        .unwrap();
    assert_eq!(result.config().to_json().unwrap()["v"], json!(1));
}

#[test]
fn pre_processor_refs_survive_reordering() {
    let providers = vec![
        ProviderRef::value(StaticProvider::new(cfg(json!({"who": "low"})))),
        ProviderRef::value(StaticProvider::new(cfg(json!({"who": "high"})))),
    ];

    let aggregator = ConfigAggregator::builder()
        .providers(providers)
        .pre_processor(|mut providers: Vec<ProviderRef>| {
            providers.reverse();
            providers
        })
        .build()
        .unwrap();

    // Reversed order: the originally-first provider now wins.
    assert_eq!(
        aggregator.config().to_json().unwrap(),
        json!({"who": "low"})
    );
}

#[test]
fn named_components_resolve_through_the_registry() {
    let mut registry = config_weave::Registry::new();
    registry.register_provider("defaults", || {
        StaticProvider::new(ConfigValue::from_json(json!({"retries": 3})))
    });
    registry.register_pre_processor("identity", || |providers: Vec<ProviderRef>| providers);
    registry.register_post_processor("stamp", || {
        |config: ConfigValue| merge(config, &ConfigValue::from_json(json!({"stamped": true})))
    });

    let aggregator = ConfigAggregator::builder()
        .named_provider("defaults")
        .named_pre_processor("identity")
        .named_post_processor("stamp")
        .registry(registry)
        .build()
        .unwrap();

    assert_eq!(
        aggregator.config().to_json().unwrap(),
        json!({"retries": 3, "stamped": true})
    );
}
