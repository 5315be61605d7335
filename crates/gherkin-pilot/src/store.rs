//! Run-scoped mutable state shared between steps.
//!
//! Three containers with distinct lifetimes: the [`World`] is immutable
//! configuration for the whole run, the [`Store`] is the mutable key-value
//! map steps use to pass data forward (it outlives scenarios and features),
//! and the [`FlightRecorder`] holds per-feature flags and settings that are
//! discarded once the feature finishes.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// Read-only configuration merged beneath the store at interpolation time.
///
/// # Examples
/// ```
/// use gherkin_pilot::World;
/// use serde_json::json;
///
/// let world = World::from_iter([("restEndpoint", json!("https://api.example.com"))]);
/// assert_eq!(world.get("restEndpoint").and_then(|v| v.as_str()),
///            Some("https://api.example.com"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct World(BTreeMap<String, Value>);

impl World {
    /// An empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a configuration value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Iterate over all configuration entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for World {
    fn from_iter<T: IntoIterator<Item = (K, Value)>>(entries: T) -> Self {
        Self(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        )
    }
}

/// The mutable run-scoped key-value store.
///
/// Writes persist across scenarios and features for the duration of one run;
/// the orchestrator owns the store and lends it to step handlers one call at
/// a time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Store(BTreeMap<String, Value>);

impl Store {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a stored value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Insert or replace a value, returning the previous one if present.
    pub fn set(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Remove a value by key.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Iterate over all entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Store {
    fn from_iter<T: IntoIterator<Item = (K, Value)>>(entries: T) -> Self {
        Self(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        )
    }
}

/// Per-feature ephemeral state passed to step handlers.
///
/// One step can raise a flag or stash a setting (for example "auth mode
/// active" or the current credentials) for later steps of the same feature
/// to read. The recorder is created fresh per feature run and dropped
/// afterwards; it never leaks into the store snapshot.
#[derive(Debug, Clone, Default)]
pub struct FlightRecorder {
    flags: BTreeMap<String, bool>,
    settings: BTreeMap<String, Value>,
}

impl FlightRecorder {
    /// A recorder with no flags or settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise or lower a boolean feature toggle.
    pub fn set_flag(&mut self, name: impl Into<String>, value: bool) {
        self.flags.insert(name.into(), value);
    }

    /// Read a flag; absent flags read as `false`.
    #[must_use]
    pub fn flag(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    /// Stash a keyed payload for later steps of the same feature.
    pub fn set_setting(&mut self, name: impl Into<String>, value: Value) {
        self.settings.insert(name.into(), value);
    }

    /// Read a previously stashed payload.
    #[must_use]
    pub fn setting(&self, name: &str) -> Option<&Value> {
        self.settings.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn store_set_returns_previous_value() {
        let mut store = Store::new();
        assert_eq!(store.set("token", json!("abc")), None);
        assert_eq!(store.set("token", json!("def")), Some(json!("abc")));
        assert_eq!(store.get("token"), Some(&json!("def")));
    }

    #[test]
    fn world_is_built_from_iterator() {
        let world = World::from_iter([("stage", json!("test")), ("tenant", json!("t-1"))]);
        assert_eq!(world.iter().count(), 2);
        assert_eq!(world.get("stage"), Some(&json!("test")));
    }

    #[test]
    fn recorder_flags_default_to_false() {
        let mut recorder = FlightRecorder::new();
        assert!(!recorder.flag("authenticated"));
        recorder.set_flag("authenticated", true);
        assert!(recorder.flag("authenticated"));
    }

    #[test]
    fn recorder_settings_round_trip() {
        let mut recorder = FlightRecorder::new();
        recorder.set_setting("credentials", json!({"user": "alice"}));
        assert_eq!(
            recorder.setting("credentials"),
            Some(&json!({"user": "alice"}))
        );
        assert_eq!(recorder.setting("missing"), None);
    }
}
