//! Deep merge engine for configuration structures.
//!
//! Implements key-aware merging where later fragments override earlier ones:
//! maps merge recursively per key, lists accumulate (append semantics), and
//! scalars are last-write-wins. `Replace` and `Remove` directives opt a key
//! out of the default behavior.

use crate::value::{ConfigMap, ConfigValue};

/// Deep-merge `incoming` into `base`, with `incoming` taking precedence.
///
/// `base` is the accumulator of a left fold; `incoming` is the next fragment.
/// The fragment is read but never mutated or consumed.
///
/// - Maps are merged recursively: per incoming key, a `Replace(v)` entry sets
///   the key to `v` unconditionally, a `Remove` entry deletes the key (no-op
///   when absent), two nested structures recurse, anything else overwrites.
/// - Lists accumulate: plain incoming elements append to the base list. A
///   `Replace(v)` element overwrites the base element at its position (or
///   appends past the end); a `Remove` element deletes the base element at
///   its position.
/// - A map merged with a list (or vice versa) is a shape mismatch: the
///   incoming value wins wholesale.
/// - Scalars: incoming wins, even when the base entry is explicitly null.
///
/// # Example
/// ```
/// use config_weave::{ConfigValue, merge};
/// use serde_json::json;
///
/// let base = ConfigValue::from_json(json!({
///     "server": { "port": 8080, "host": "localhost" },
///     "features": ["a"]
/// }));
/// let incoming = ConfigValue::from_json(json!({
///     "server": { "port": 9000 },
///     "features": ["b"]
/// }));
/// let merged = merge(base, &incoming);
/// assert_eq!(
///     merged.to_json().unwrap(),
///     json!({
///         "server": { "port": 9000, "host": "localhost" },
///         "features": ["a", "b"]
///     })
/// );
/// ```
pub fn merge(base: ConfigValue, incoming: &ConfigValue) -> ConfigValue {
    match (base, incoming) {
        (ConfigValue::Map(base_map), ConfigValue::Map(incoming_map)) => {
            ConfigValue::Map(merge_maps(base_map, incoming_map))
        }
        (ConfigValue::List(base_items), ConfigValue::List(incoming_items)) => {
            ConfigValue::List(merge_lists(base_items, incoming_items))
        }
        // A top-level Replace substitutes its payload verbatim.
        (_, ConfigValue::Replace(inner)) => inner.as_ref().clone(),
        // Shape mismatch or scalar: incoming wins.
        (_, incoming) => incoming.clone(),
    }
}

/// Merge a sequence of fragments left-to-right into an initially empty map.
///
/// Equivalent to folding [`merge`] over the sequence; provider precedence
/// follows iteration order (later wins).
pub fn merge_all<'a>(fragments: impl IntoIterator<Item = &'a ConfigValue>) -> ConfigValue {
    fragments
        .into_iter()
        .fold(ConfigValue::Map(ConfigMap::new()), merge)
}

fn merge_maps(mut base: ConfigMap, incoming: &ConfigMap) -> ConfigMap {
    for (key, incoming_value) in incoming {
        match incoming_value {
            // Unconditional substitution, even for keys the base never had.
            // IndexMap::insert keeps the original position of existing keys.
            ConfigValue::Replace(inner) => {
                base.insert(key.clone(), inner.as_ref().clone());
            }
            // Retract the key; absent keys are a no-op.
            ConfigValue::Remove => {
                base.shift_remove(key);
            }
            _ => match base.get_mut(key) {
                Some(slot) => {
                    let existing = std::mem::take(slot);
                    *slot = merge(existing, incoming_value);
                }
                None => {
                    base.insert(key.clone(), incoming_value.clone());
                }
            },
        }
    }
    base
}

fn merge_lists(mut base: Vec<ConfigValue>, incoming: &[ConfigValue]) -> Vec<ConfigValue> {
    // Deletions are applied after the pass so directive positions keep
    // referring to the original base entries.
    let mut removed: Vec<usize> = Vec::new();
    for (index, incoming_value) in incoming.iter().enumerate() {
        match incoming_value {
            ConfigValue::Replace(inner) => {
                if index < base.len() {
                    base[index] = inner.as_ref().clone();
                } else {
                    base.push(inner.as_ref().clone());
                }
            }
            ConfigValue::Remove => {
                if index < base.len() {
                    removed.push(index);
                }
            }
            _ => base.push(incoming_value.clone()),
        }
    }
    for index in removed.into_iter().rev() {
        base.remove(index);
    }
    base
}
