//! Lifecycle phases a formula action can run in.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
  Setup,
  Update,
  Destroy,
  Activate,
  Deactivate,
  Reload,
  Validate,
  Prompt,
  /// Context substitution and handler construction. Never dispatched to a formula.
  Resolve,
}

impl Phase {
  pub fn as_str(&self) -> &'static str {
    match self {
      Phase::Setup => "setup",
      Phase::Update => "update",
      Phase::Destroy => "destroy",
      Phase::Activate => "activate",
      Phase::Deactivate => "deactivate",
      Phase::Reload => "reload",
      Phase::Validate => "validate",
      Phase::Prompt => "prompt",
      Phase::Resolve => "resolve",
    }
  }

  /// Forced phases run even for features with recorded errors and ignore
  /// the `phases` filter.
  pub fn is_forced(&self) -> bool {
    matches!(self, Phase::Validate | Phase::Prompt | Phase::Resolve)
  }

  /// Whether the action reads the desired config rather than the installed one.
  pub fn uses_target(&self) -> bool {
    matches!(self, Phase::Setup | Phase::Update | Phase::Validate | Phase::Prompt)
  }
}

impl fmt::Display for Phase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}
