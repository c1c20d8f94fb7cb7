//! Pluggable handlers that manage one feature each.
//!
//! A [`Formula`] is constructed from a [`FeatureSpec`] (the feature's
//! installed and desired configuration) and driven through lifecycle actions
//! by the environment engine. Actions report soft failures as a list of
//! messages; returning `Err` aborts the whole run.
//!
//! Built-in formulas:
//!
//! | id        | manages                                                  |
//! |-----------|----------------------------------------------------------|
//! | `package` | a system package via brew, apt-get or yum                |
//! | `unpack`  | a downloaded tar.gz with an executable linked into `bin/`|
//! | `command` | arbitrary shell commands per lifecycle phase             |

mod command;
mod common;
mod package;
mod registry;
mod unpack;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::directory::{Directory, DirectoryError};
use crate::injections::Injections;
use crate::manifest::FeatureSpec;
use crate::platform::System;

pub use command::CommandFormula;
pub use package::{PackageFormula, PackageManager};
pub use registry::{Constructor, FormulaRegistry, FormulaResolver};
pub use unpack::UnpackFormula;

/// Outcome of one action: soft error messages, or a fatal error.
pub type ActionResult = Result<Vec<String>, FormulaError>;

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum FormulaError {
  #[error(transparent)]
  Directory(#[from] DirectoryError),

  #[error("io error at {}: {source}", path.display())]
  Io { path: PathBuf, source: io::Error },

  #[error("failed to run {command}: {source}")]
  Spawn { command: String, source: io::Error },

  #[error("{0}")]
  Failed(String),
}

/// No formula is registered, or resolvable, under an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaResolutionError {
  #[error("unknown formula: {0}")]
  Unknown(String),

  #[error("feature {0} does not name a formula")]
  Missing(String),
}

/// What an action may touch besides its own configuration.
pub struct FormulaContext<'a> {
  pub directory: &'a mut Directory,
  pub injections: &'a mut Injections,
  pub system: &'a System,
}

/// A handler for one `(feature, formula)` pair.
///
/// Only `setup` is required; every other action defaults to doing nothing.
pub trait Formula {
  /// The feature this handler was constructed for.
  fn spec(&self) -> &FeatureSpec;

  fn setup(&mut self, ctx: &mut FormulaContext<'_>) -> ActionResult;

  fn update(&mut self, _ctx: &mut FormulaContext<'_>) -> ActionResult {
    Ok(Vec::new())
  }

  fn destroy(&mut self, _ctx: &mut FormulaContext<'_>) -> ActionResult {
    Ok(Vec::new())
  }

  fn activate(&mut self, _ctx: &mut FormulaContext<'_>) -> ActionResult {
    Ok(Vec::new())
  }

  fn deactivate(&mut self, _ctx: &mut FormulaContext<'_>) -> ActionResult {
    Ok(Vec::new())
  }

  fn reload(&mut self, _ctx: &mut FormulaContext<'_>) -> ActionResult {
    Ok(Vec::new())
  }

  /// Gather anything interactive before changes are made.
  fn prompt(&mut self, _ctx: &mut FormulaContext<'_>) -> ActionResult {
    Ok(Vec::new())
  }

  /// Check the configuration without side effects.
  fn validate(&self) -> Vec<String> {
    Vec::new()
  }
}
