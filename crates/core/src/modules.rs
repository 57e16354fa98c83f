//! Feature-module toggles.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Lowercase module key → enabled flag.
///
/// Ordered so that serialized output and iteration are deterministic. Keys are
/// lowercased on the way in; a key that is absent means "no opinion", which is
/// different from an explicit `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, bool>", into = "BTreeMap<String, bool>")]
pub struct EnabledModules(BTreeMap<String, bool>);

impl EnabledModules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, module: &str, enabled: bool) {
        self.0.insert(normalize_module_key(module), enabled);
    }

    pub fn with(mut self, module: &str, enabled: bool) -> Self {
        self.insert(module, enabled);
        self
    }

    /// The explicit flag for `module`, if any source set one.
    pub fn get(&self, module: &str) -> Option<bool> {
        self.0.get(&normalize_module_key(module)).copied()
    }

    /// True only when the module is explicitly disabled.
    pub fn is_disabled(&self, module: &str) -> bool {
        self.get(module) == Some(false)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Merge layered sources, highest precedence first.
    ///
    /// For every key, the first layer that defines it wins. Missing layers are skipped.
    pub fn layered<'a, I>(layers: I) -> Self
    where
        I: IntoIterator<Item = Option<&'a EnabledModules>>,
    {
        let mut merged = BTreeMap::new();
        for layer in layers.into_iter().flatten() {
            for (key, enabled) in &layer.0 {
                merged.entry(key.clone()).or_insert(*enabled);
            }
        }
        Self(merged)
    }
}

impl From<BTreeMap<String, bool>> for EnabledModules {
    fn from(value: BTreeMap<String, bool>) -> Self {
        let mut modules = Self::new();
        for (key, enabled) in value {
            modules.insert(&key, enabled);
        }
        modules
    }
}

impl From<EnabledModules> for BTreeMap<String, bool> {
    fn from(value: EnabledModules) -> Self {
        value.0
    }
}

impl<'a> FromIterator<(&'a str, bool)> for EnabledModules {
    fn from_iter<T: IntoIterator<Item = (&'a str, bool)>>(iter: T) -> Self {
        let mut modules = Self::new();
        for (key, enabled) in iter {
            modules.insert(key, enabled);
        }
        modules
    }
}

pub fn normalize_module_key(module: &str) -> String {
    module.trim().to_ascii_lowercase()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
