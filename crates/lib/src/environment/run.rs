//! State of one engine operation.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::trace;

use super::EnvironmentError;
use super::record::FeatureRecord;
use crate::directory::Directory;
use crate::formula::Formula;
use crate::injections::Injections;
use crate::manifest::{FeatureKey, ManifestPair};

/// Operations the engine performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
  Install,
  Update,
  Remove,
  Activate,
  Deactivate,
  Reload,
  Validate,
}

impl Operation {
  pub fn as_str(&self) -> &'static str {
    match self {
      Operation::Install => "install",
      Operation::Update => "update",
      Operation::Remove => "remove",
      Operation::Activate => "activate",
      Operation::Deactivate => "deactivate",
      Operation::Reload => "reload",
      Operation::Validate => "validate",
    }
  }
}

impl fmt::Display for Operation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Stages of a run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RunState {
  Uninitialized,
  WarmedUp,
  Resolved,
  Executing,
  Finalized,
}

impl RunState {
  fn next(&self) -> Option<RunState> {
    match self {
      RunState::Uninitialized => Some(RunState::WarmedUp),
      RunState::WarmedUp => Some(RunState::Resolved),
      RunState::Resolved => Some(RunState::Executing),
      RunState::Executing => Some(RunState::Finalized),
      RunState::Finalized => None,
    }
  }
}

impl fmt::Display for RunState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      RunState::Uninitialized => "uninitialized",
      RunState::WarmedUp => "warmed up",
      RunState::Resolved => "resolved",
      RunState::Executing => "executing",
      RunState::Finalized => "finalized",
    };
    f.write_str(name)
  }
}

/// Everything owned by one operation: the manifests, the handler cache,
/// per-feature records and pending injections.
pub(crate) struct Run {
  pub operation: Operation,
  pub state: RunState,
  pub directory: Directory,
  pub injections: Injections,
  /// Manifests as loaded; this is what gets persisted.
  pub raw: ManifestPair,
  /// Manifests after context substitution; this is what handlers see.
  pub pair: ManifestPair,
  pub handlers: IndexMap<FeatureKey, Box<dyn Formula>>,
  pub records: IndexMap<FeatureKey, FeatureRecord>,
}

impl Run {
  pub fn new(operation: Operation, directory: Directory, injections: Injections, pair: ManifestPair) -> Self {
    Self {
      operation,
      state: RunState::Uninitialized,
      directory,
      injections,
      raw: pair.clone(),
      pair,
      handlers: IndexMap::new(),
      records: IndexMap::new(),
    }
  }

  /// Move to `to`, which must directly follow the current state.
  pub fn advance(&mut self, to: RunState) -> Result<(), EnvironmentError> {
    if self.state.next() != Some(to) {
      return Err(EnvironmentError::InvalidState { from: self.state, to });
    }
    trace!(operation = %self.operation, from = %self.state, to = %to, "run state");
    self.state = to;
    Ok(())
  }
}
