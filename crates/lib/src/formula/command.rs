//! `command`: run shell commands for each lifecycle phase.
//!
//! ```toml
//! [dotfiles]
//! formula = "command"
//! setup = "git clone https://example.com/dotfiles.git ."
//! update = "git pull"
//! destroy = "echo bye"
//! ```
//!
//! Commands run through `/bin/sh -c` inside the feature's install directory
//! with the environment's `bin/` first on `PATH`. A non-zero exit is reported
//! as a soft error.

use tracing::{info, warn};

use super::common::apply_rc;
use super::{ActionResult, Formula, FormulaContext, FormulaError};
use crate::manifest::{FeatureConfig, FeatureSpec};
use crate::util::process::run_shell;

pub struct CommandFormula {
  spec: FeatureSpec,
}

impl CommandFormula {
  pub fn new(spec: FeatureSpec) -> Self {
    Self { spec }
  }

  fn run(&self, config: Option<&FeatureConfig>, phase: &str, ctx: &mut FormulaContext<'_>) -> ActionResult {
    let Some(script) = config.and_then(|c| c.get(phase)).filter(|s| !s.trim().is_empty()) else {
      return Ok(Vec::new());
    };

    let cwd = ctx.directory.install_directory(&self.spec.name);
    let bin = ctx.directory.bin_path();
    info!(feature = %self.spec.name, phase = %phase, "running command");

    let output = run_shell(script, Some(&cwd), Some(&bin)).map_err(|source| FormulaError::Spawn {
      command: script.to_string(),
      source,
    })?;

    if output.success {
      return Ok(Vec::new());
    }

    warn!(feature = %self.spec.name, phase = %phase, code = ?output.code, "command failed");
    let code = output.code.map(|c| c.to_string()).unwrap_or_else(|| "signal".to_string());
    Ok(vec![format!(
      "{} {phase}: `{script}` exited with {code}: {}",
      self.spec.name,
      output.stderr.trim()
    )])
  }

  fn run_with_rc(&self, phase: &str, ctx: &mut FormulaContext<'_>) -> ActionResult {
    let errors = self.run(self.spec.target.as_ref(), phase, ctx)?;
    if let Some(target) = &self.spec.target {
      apply_rc(target, ctx)?;
    }
    Ok(errors)
  }
}

impl Formula for CommandFormula {
  fn spec(&self) -> &FeatureSpec {
    &self.spec
  }

  fn setup(&mut self, ctx: &mut FormulaContext<'_>) -> ActionResult {
    self.run_with_rc("setup", ctx)
  }

  fn update(&mut self, ctx: &mut FormulaContext<'_>) -> ActionResult {
    self.run_with_rc("update", ctx)
  }

  fn destroy(&mut self, ctx: &mut FormulaContext<'_>) -> ActionResult {
    let errors = self.run(self.spec.source.as_ref(), "destroy", ctx)?;
    let install_dir = ctx.directory.install_directory(&self.spec.name);
    if install_dir.exists() {
      std::fs::remove_dir_all(&install_dir).map_err(|source| FormulaError::Io {
        path: install_dir,
        source,
      })?;
    }
    Ok(errors)
  }

  fn activate(&mut self, ctx: &mut FormulaContext<'_>) -> ActionResult {
    self.run(self.spec.source.as_ref(), "activate", ctx)
  }

  fn deactivate(&mut self, ctx: &mut FormulaContext<'_>) -> ActionResult {
    self.run(self.spec.source.as_ref(), "deactivate", ctx)
  }

  fn reload(&mut self, ctx: &mut FormulaContext<'_>) -> ActionResult {
    self.run(self.spec.source.as_ref(), "reload", ctx)
  }
}
