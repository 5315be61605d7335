//! Placeholder interpolation against the merged world and store view.
//!
//! Step text and doc strings may reference `{key}` or `{ns:key}` tokens.
//! Lookups consult the store first and fall back to the world, so values
//! written by earlier steps shadow static configuration. Interpolation runs
//! fresh before every step execution, including retried attempts.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::step::StepError;
use crate::store::{Store, World};

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{([\w:]+)\}")
            .unwrap_or_else(|err| panic!("placeholder pattern must compile: {err}"))
    })
}

/// Render a store value into step text.
///
/// Strings substitute as their content; everything else substitutes as its
/// JSON representation.
fn render(value: &Value) -> String {
    value.as_str().map_or_else(|| value.to_string(), str::to_owned)
}

fn record_miss(key: &str, missing: &mut Vec<String>) {
    if !missing.iter().any(|seen| seen == key) {
        missing.push(key.to_owned());
    }
}

/// Merged snapshot of world and store, with store keys taking precedence.
fn snapshot(world: &World, store: &Store) -> BTreeMap<String, Value> {
    let mut data: BTreeMap<String, Value> = world
        .iter()
        .map(|(key, value)| (key.to_owned(), value.clone()))
        .collect();
    for (key, value) in store.iter() {
        data.insert(key.to_owned(), value.clone());
    }
    data
}

/// Substitute every `{key}` placeholder in `text`.
///
/// # Errors
///
/// Returns [`StepError::StoreKeyUndefined`] listing every unresolved key in
/// order of appearance, together with the full merged data snapshot, when any
/// placeholder cannot be resolved. The substituted text is rescanned, so a
/// placeholder token smuggled in by a substituted value also fails rather
/// than leaking into the step text.
pub fn interpolate(text: &str, world: &World, store: &Store) -> Result<String, StepError> {
    let mut missing: Vec<String> = Vec::new();
    let interpolated = placeholder_regex().replace_all(text, |captures: &regex::Captures<'_>| {
        let key = captures.get(1).map_or("", |group| group.as_str());
        match store.get(key).or_else(|| world.get(key)) {
            Some(value) => render(value),
            None => {
                record_miss(key, &mut missing);
                String::new()
            }
        }
    });
    for captures in placeholder_regex().captures_iter(&interpolated) {
        let key = captures.get(1).map_or("", |group| group.as_str());
        record_miss(key, &mut missing);
    }
    if missing.is_empty() {
        Ok(interpolated.into_owned())
    } else {
        Err(StepError::StoreKeyUndefined {
            keys: missing,
            data: snapshot(world, store),
        })
    }
}

#[cfg(test)]
mod tests {
    #![expect(clippy::expect_used, reason = "tests assert interpolation results")]

    use super::*;
    use serde_json::json;

    fn world_with(entries: &[(&str, Value)]) -> World {
        entries
            .iter()
            .map(|(key, value)| ((*key).to_owned(), value.clone()))
            .collect()
    }

    #[test]
    fn substitutes_a_simple_key() {
        let store = Store::from_iter([("foo", json!("bar"))]);
        let result =
            interpolate("{foo}", &World::new(), &store).expect("interpolation should succeed");
        assert_eq!(result, "bar");
    }

    #[test]
    fn unresolved_key_lists_the_name() {
        let error = interpolate("{foo}", &World::new(), &Store::new())
            .expect_err("missing key should fail");
        let StepError::StoreKeyUndefined { keys, data } = error else {
            panic!("expected StoreKeyUndefined");
        };
        assert_eq!(keys, vec!["foo".to_string()]);
        assert!(data.is_empty());
    }

    #[test]
    fn store_shadows_world_on_conflict() {
        let world = world_with(&[("stage", json!("prod"))]);
        let store = Store::from_iter([("stage", json!("test"))]);
        let result =
            interpolate("stage is {stage}", &world, &store).expect("interpolation should succeed");
        assert_eq!(result, "stage is test");
    }

    #[test]
    fn namespaced_keys_resolve() {
        let store = Store::from_iter([("cognito:alice:AccessKeyId", json!("AKIA123"))]);
        let result = interpolate("key {cognito:alice:AccessKeyId}", &World::new(), &store)
            .expect("interpolation should succeed");
        assert_eq!(result, "key AKIA123");
    }

    #[test]
    fn all_missing_keys_are_reported_once_each() {
        let store = Store::from_iter([("known", json!("v"))]);
        let error = interpolate("{a} {known} {b} {a}", &World::new(), &store)
            .expect_err("missing keys should fail");
        let StepError::StoreKeyUndefined { keys, data } = error else {
            panic!("expected StoreKeyUndefined");
        };
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(data.get("known"), Some(&json!("v")));
    }

    #[test]
    fn non_string_values_render_as_json() {
        let store = Store::from_iter([("count", json!(3)), ("flags", json!([1, 2]))]);
        let result = interpolate("{count} and {flags}", &World::new(), &store)
            .expect("interpolation should succeed");
        assert_eq!(result, "3 and [1,2]");
    }

    #[test]
    fn substituted_value_may_not_introduce_placeholders() {
        let store = Store::from_iter([("outer", json!("{inner}"))]);
        let error = interpolate("{outer}", &World::new(), &store)
            .expect_err("a leftover token should fail");
        let StepError::StoreKeyUndefined { keys, .. } = error else {
            panic!("expected StoreKeyUndefined");
        };
        assert_eq!(keys, vec!["inner".to_string()]);
    }

    #[test]
    fn text_without_placeholders_passes_through() {
        let result = interpolate("plain text", &World::new(), &Store::new())
            .expect("interpolation should succeed");
        assert_eq!(result, "plain text");
    }
}
