//! Per-feature outcomes and the report returned by every operation.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use super::phase::Phase;
use super::run::Operation;
use crate::manifest::FeatureKey;

/// A soft failure of one feature during one phase.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{key} {phase}: {message}")]
pub struct FeatureActionError {
  pub key: FeatureKey,
  pub phase: Phase,
  pub message: String,
}

/// What happened to one feature during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureRecord {
  /// Phases whose action actually ran, in order.
  pub actions: Vec<Phase>,
  pub errors: Vec<FeatureActionError>,
}

impl FeatureRecord {
  pub fn has_errors(&self) -> bool {
    !self.errors.is_empty()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
  Success,
  CompletedWithErrors,
}

/// One feature's line in a [`RunReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureOutcome {
  pub key: FeatureKey,
  pub actions: Vec<Phase>,
  pub errors: Vec<String>,
}

/// Summary of a finished operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
  pub namespace: String,
  pub operation: Operation,
  pub root_dir: PathBuf,
  pub features: Vec<FeatureOutcome>,
  pub errors: Vec<FeatureActionError>,
}

impl RunReport {
  pub fn status(&self) -> RunStatus {
    if self.errors.is_empty() {
      RunStatus::Success
    } else {
      RunStatus::CompletedWithErrors
    }
  }

  pub fn is_success(&self) -> bool {
    self.status() == RunStatus::Success
  }

  /// How many features ran an action for `phase`.
  pub fn ran(&self, phase: Phase) -> usize {
    self.features.iter().filter(|f| f.actions.contains(&phase)).count()
  }

  /// Actions recorded for `feature`, across every formula it used.
  pub fn actions_for(&self, feature: &str) -> Vec<Phase> {
    self
      .features
      .iter()
      .filter(|f| f.key.feature == feature)
      .flat_map(|f| f.actions.iter().copied())
      .collect()
  }
}
