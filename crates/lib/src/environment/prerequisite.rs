//! Environment-wide tools installed into the root before any feature runs.

use tracing::{debug, info};

use crate::directory::Directory;
use crate::formula::FormulaError;
use crate::util::process::run_shell;

/// Something a whole environment needs, switched on by a `[config]` flag.
///
/// ```toml
/// [config]
/// virtualenv = true
/// ```
pub trait Prerequisite {
  /// Name used in logs and errors.
  fn name(&self) -> &str;

  /// The `[config]` key enabling this prerequisite.
  fn config_key(&self) -> &str;

  fn install(&self, directory: &Directory) -> Result<(), FormulaError>;
}

/// A Python virtualenv created over the environment root, so `bin/python`
/// and `bin/pip` resolve inside it.
pub struct Virtualenv {
  command: String,
}

impl Virtualenv {
  /// Prefer a `virtualenv` binary on `PATH`, falling back to the stdlib
  /// `venv` module.
  pub fn detect() -> Self {
    let command = match which::which("virtualenv") {
      Ok(path) => format!("{:?} --quiet", path.display().to_string()),
      Err(_) => "python3 -m venv".to_string(),
    };
    debug!(command = %command, "virtualenv command");
    Self { command }
  }

  /// Use `command` followed by the root path to create the virtualenv.
  pub fn with_command(command: impl Into<String>) -> Self {
    Self { command: command.into() }
  }
}

impl Prerequisite for Virtualenv {
  fn name(&self) -> &str {
    "virtualenv"
  }

  fn config_key(&self) -> &str {
    "virtualenv"
  }

  fn install(&self, directory: &Directory) -> Result<(), FormulaError> {
    let root = directory.root_dir().display().to_string();
    let script = format!("{} {:?}", self.command, root);
    info!(root = %root, "creating virtualenv");

    let output = run_shell(&script, None, None).map_err(|source| FormulaError::Spawn {
      command: script.clone(),
      source,
    })?;
    if output.success {
      return Ok(());
    }
    Err(FormulaError::Failed(format!(
      "`{}` exited with {}: {}",
      script,
      output.code.map(|c| c.to_string()).unwrap_or_else(|| "signal".to_string()),
      output.stderr.trim()
    )))
  }
}

/// Whether a prerequisite gated by `enabled_in_target` should be installed.
///
/// A fresh root gets every enabled prerequisite; an existing root only those
/// newly enabled.
pub(crate) fn should_install(fresh: bool, enabled_in_target: bool, enabled_in_source: bool) -> bool {
  enabled_in_target && (fresh || !enabled_in_source)
}
