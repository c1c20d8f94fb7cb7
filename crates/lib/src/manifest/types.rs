//! Per-feature configuration.

use indexmap::IndexMap;
use serde::Serialize;

/// Legacy prefix some manifests put in front of formula identifiers.
const FORMULA_PREFIX: &str = "sprinter.formula.";

/// Ordered key/value configuration of one manifest section.
///
/// Equality ignores key order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FeatureConfig(IndexMap<String, String>);

impl FeatureConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn get(&self, key: &str) -> Option<&str> {
    self.0.get(key).map(String::as_str)
  }

  pub fn has(&self, key: &str) -> bool {
    self.0.contains_key(key)
  }

  pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
    self.0.insert(key.into(), value.into());
  }

  pub fn remove(&mut self, key: &str) -> Option<String> {
    self.0.shift_remove(key)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
  }

  pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut String)> {
    self.0.iter_mut()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  /// The formula identifier, without the legacy prefix.
  pub fn formula(&self) -> Option<&str> {
    self
      .get("formula")
      .map(|f| f.trim())
      .map(|f| f.strip_prefix(FORMULA_PREFIX).unwrap_or(f))
      .filter(|f| !f.is_empty())
  }

  /// Phases listed under `phases`, lowercased. `None` when unrestricted.
  pub fn phases(&self) -> Option<Vec<String>> {
    self.get("phases").map(|raw| {
      raw
        .split(',')
        .map(|p| p.trim().to_lowercase())
        .filter(|p| !p.is_empty())
        .collect()
    })
  }

  /// Whether an action for `phase` may run under this config.
  pub fn runs_in(&self, phase: &str) -> bool {
    match self.phases() {
      Some(phases) => phases.iter().any(|p| p.eq_ignore_ascii_case(phase)),
      None => true,
    }
  }

  /// Whether `key` holds a truthy value (`true`, `yes`, `1`, `on`).
  pub fn is_true(&self, key: &str) -> bool {
    self.get(key).is_some_and(is_truthy)
  }
}

pub(crate) fn is_truthy(value: &str) -> bool {
  matches!(value.trim().to_lowercase().as_str(), "true" | "yes" | "1" | "on")
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FeatureConfig {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
  }
}
