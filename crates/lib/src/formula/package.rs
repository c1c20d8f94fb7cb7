//! `package`: install a system package with the native package manager.
//!
//! ```toml
//! [git]
//! formula = "package"
//! apt-get = "git"
//! brew = "git"
//! yum = "git"
//! ```

use std::fmt;
use std::process::{Command, Stdio};

use tracing::{info, warn};

use super::common::apply_rc;
use super::{ActionResult, Formula, FormulaContext, FormulaError};
use crate::manifest::{FeatureConfig, FeatureSpec};
use crate::platform::System;

/// Package managers the formula knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
  Brew,
  AptGet,
  Yum,
}

impl PackageManager {
  pub const ALL: [PackageManager; 3] = [PackageManager::AptGet, PackageManager::Brew, PackageManager::Yum];

  /// Binary name, which is also the manifest key holding the package name.
  pub fn as_str(&self) -> &'static str {
    match self {
      PackageManager::Brew => "brew",
      PackageManager::AptGet => "apt-get",
      PackageManager::Yum => "yum",
    }
  }

  /// The manager native to `system`, falling back to whichever is on `PATH`.
  pub fn detect(system: &System) -> Option<Self> {
    let native = if system.is_osx() {
      Some(PackageManager::Brew)
    } else if system.is_debian_based() {
      Some(PackageManager::AptGet)
    } else if system.is_fedora_based() {
      Some(PackageManager::Yum)
    } else {
      None
    };

    native.or_else(|| Self::ALL.into_iter().find(|m| m.is_available()))
  }

  pub fn is_available(&self) -> bool {
    which::which(self.as_str()).is_ok()
  }

  /// Command line installing `package`. Everything but brew runs under sudo.
  pub fn install_command(&self, package: &str) -> Vec<String> {
    let args: &[&str] = match self {
      PackageManager::Brew => &["brew", "install"],
      PackageManager::AptGet => &["sudo", "apt-get", "-y", "install"],
      PackageManager::Yum => &["sudo", "yum", "install"],
    };
    args.iter().map(|a| a.to_string()).chain([package.to_string()]).collect()
  }
}

impl fmt::Display for PackageManager {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

pub struct PackageFormula {
  spec: FeatureSpec,
}

impl PackageFormula {
  pub fn new(spec: FeatureSpec) -> Self {
    Self { spec }
  }

  fn install(&self, config: &FeatureConfig, ctx: &mut FormulaContext<'_>) -> ActionResult {
    let Some(manager) = PackageManager::detect(ctx.system) else {
      return Ok(vec![format!("{}: no supported package manager found", self.spec.name)]);
    };
    let Some(package) = config.get(manager.as_str()) else {
      info!(feature = %self.spec.name, manager = %manager, "no package configured for this package manager");
      return Ok(Vec::new());
    };

    let argv = manager.install_command(package);
    info!(feature = %self.spec.name, command = %argv.join(" "), "installing package");

    let output = Command::new(&argv[0])
      .args(&argv[1..])
      .stdin(Stdio::null())
      .output()
      .map_err(|source| FormulaError::Spawn {
        command: argv.join(" "),
        source,
      })?;

    if output.status.success() {
      Ok(Vec::new())
    } else {
      let stderr = String::from_utf8_lossy(&output.stderr);
      warn!(feature = %self.spec.name, status = %output.status, "package install failed");
      Ok(vec![format!(
        "{}: `{}` failed ({}): {}",
        self.spec.name,
        argv.join(" "),
        output.status,
        stderr.trim()
      )])
    }
  }

  fn target(&self) -> Result<&FeatureConfig, FormulaError> {
    self
      .spec
      .target
      .as_ref()
      .ok_or_else(|| FormulaError::Failed(format!("{}: no target configuration", self.spec.name)))
  }
}

impl Formula for PackageFormula {
  fn spec(&self) -> &FeatureSpec {
    &self.spec
  }

  fn setup(&mut self, ctx: &mut FormulaContext<'_>) -> ActionResult {
    let target = self.target()?.clone();
    let errors = self.install(&target, ctx)?;
    apply_rc(&target, ctx)?;
    Ok(errors)
  }

  fn update(&mut self, ctx: &mut FormulaContext<'_>) -> ActionResult {
    let target = self.target()?.clone();
    let manager = PackageManager::detect(ctx.system);
    let changed = match (manager, self.spec.source.as_ref()) {
      (Some(m), Some(source)) => source.get(m.as_str()) != target.get(m.as_str()),
      _ => true,
    };

    let errors = if changed { self.install(&target, ctx)? } else { Vec::new() };
    apply_rc(&target, ctx)?;
    Ok(errors)
  }

  fn validate(&self) -> Vec<String> {
    if PackageManager::ALL.iter().any(PackageManager::is_available) {
      Vec::new()
    } else {
      vec![format!(
        "{}: package requires one of {} to be installed",
        self.spec.name,
        PackageManager::ALL.map(|m| m.as_str()).join(", ")
      )]
    }
  }
}
