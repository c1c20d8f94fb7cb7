//! Diff computation between an installed and a desired manifest.
//!
//! Every feature key lands in exactly one category:
//!
//! - target only → setup
//! - source only → destroy
//! - both, configs differ → update
//! - both, configs equal → unchanged
//!
//! A feature whose formula changed between the two manifests yields two
//! keys: the old one is destroyed and the new one set up.

use std::fmt;

use serde::Serialize;

use super::{FeatureConfig, Manifest};

/// Identity of one handler within a run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FeatureKey {
  pub feature: String,
  pub formula: String,
}

impl FeatureKey {
  pub fn new(feature: impl Into<String>, formula: impl Into<String>) -> Self {
    Self {
      feature: feature.into(),
      formula: formula.into(),
    }
  }
}

impl fmt::Display for FeatureKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} ({})", self.feature, self.formula)
  }
}

/// Everything a formula handler is constructed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSpec {
  pub name: String,
  pub source: Option<FeatureConfig>,
  pub target: Option<FeatureConfig>,
}

impl FeatureSpec {
  /// The key of this spec. The target's formula wins when both are present.
  pub fn key(&self) -> FeatureKey {
    let formula = self
      .target
      .as_ref()
      .and_then(FeatureConfig::formula)
      .or_else(|| self.source.as_ref().and_then(FeatureConfig::formula))
      .unwrap_or_default();
    FeatureKey::new(&self.name, formula)
  }

  /// The config an action for `phase` is filtered against.
  pub fn config_for(&self, prefer_target: bool) -> Option<&FeatureConfig> {
    if prefer_target {
      self.target.as_ref().or(self.source.as_ref())
    } else {
      self.source.as_ref().or(self.target.as_ref())
    }
  }
}

/// Partition of feature specs between two manifests.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FeatureDiff {
  pub setup: Vec<FeatureSpec>,
  pub update: Vec<FeatureSpec>,
  pub destroy: Vec<FeatureSpec>,
  pub unchanged: Vec<FeatureSpec>,
}

impl FeatureDiff {
  /// Returns true if there are no changes to make.
  pub fn is_empty(&self) -> bool {
    self.setup.is_empty() && self.update.is_empty() && self.destroy.is_empty()
  }

  /// Every spec, in category order setup, update, destroy, unchanged.
  pub fn all(&self) -> impl Iterator<Item = &FeatureSpec> {
    self
      .setup
      .iter()
      .chain(&self.update)
      .chain(&self.destroy)
      .chain(&self.unchanged)
  }
}

fn config_formula(config: &FeatureConfig) -> &str {
  config.formula().unwrap_or_default()
}

/// Compute the category partition between `source` and `target`.
///
/// Setups, updates and unchanged specs follow target order; destroys follow
/// source order.
pub fn compute_diff(source: Option<&Manifest>, target: Option<&Manifest>) -> FeatureDiff {
  let mut diff = FeatureDiff::default();

  if let Some(target) = target {
    for (name, target_config) in &target.features {
      let source_config = source.and_then(|s| s.features.get(name));

      match source_config {
        Some(source_config) if config_formula(source_config) == config_formula(target_config) => {
          let spec = FeatureSpec {
            name: name.clone(),
            source: Some(source_config.clone()),
            target: Some(target_config.clone()),
          };
          if source_config == target_config {
            diff.unchanged.push(spec);
          } else {
            diff.update.push(spec);
          }
        }
        _ => diff.setup.push(FeatureSpec {
          name: name.clone(),
          source: None,
          target: Some(target_config.clone()),
        }),
      }
    }
  }

  if let Some(source) = source {
    for (name, source_config) in &source.features {
      let kept = target
        .and_then(|t| t.features.get(name))
        .is_some_and(|t| config_formula(t) == config_formula(source_config));
      if !kept {
        diff.destroy.push(FeatureSpec {
          name: name.clone(),
          source: Some(source_config.clone()),
          target: None,
        });
      }
    }
  }

  diff
}

/// The installed and desired manifests of one run.
#[derive(Debug, Clone, Default)]
pub struct ManifestPair {
  pub source: Option<Manifest>,
  pub target: Option<Manifest>,
}

impl ManifestPair {
  pub fn new(source: Option<Manifest>, target: Option<Manifest>) -> Self {
    Self { source, target }
  }

  pub fn diff(&self) -> FeatureDiff {
    compute_diff(self.source.as_ref(), self.target.as_ref())
  }

  pub fn setups(&self) -> Vec<FeatureSpec> {
    self.diff().setup
  }

  pub fn updates(&self) -> Vec<FeatureSpec> {
    self.diff().update
  }

  pub fn destroys(&self) -> Vec<FeatureSpec> {
    self.diff().destroy
  }

  /// Every installed feature.
  pub fn activations(&self) -> Vec<FeatureSpec> {
    self.installed()
  }

  pub fn deactivations(&self) -> Vec<FeatureSpec> {
    self.installed()
  }

  pub fn reloads(&self) -> Vec<FeatureSpec> {
    self.installed()
  }

  fn installed(&self) -> Vec<FeatureSpec> {
    self
      .source
      .iter()
      .flat_map(|m| &m.features)
      .map(|(name, config)| FeatureSpec {
        name: name.clone(),
        source: Some(config.clone()),
        target: None,
      })
      .collect()
  }

  /// Target `[config]` when present, else source.
  pub fn config(&self) -> Option<&FeatureConfig> {
    self
      .target
      .as_ref()
      .or(self.source.as_ref())
      .map(|m| &m.config)
  }
}
