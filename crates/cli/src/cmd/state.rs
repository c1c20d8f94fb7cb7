//! `sprinter activate`, `deactivate` and `reload`.

use std::process::ExitCode;

use anyhow::{Context, Result};

use super::{environment, exit_code};
use crate::output::{OutputFormat, print_report};

pub fn cmd_activate(namespace: &str, output: OutputFormat, verbose: bool) -> Result<ExitCode> {
  let report = environment()
    .activate(namespace)
    .with_context(|| format!("Failed to activate {}", namespace))?;
  print_report(&report, "Activated", output, verbose)?;
  Ok(exit_code(&report))
}

pub fn cmd_deactivate(namespace: &str, output: OutputFormat, verbose: bool) -> Result<ExitCode> {
  let report = environment()
    .deactivate(namespace)
    .with_context(|| format!("Failed to deactivate {}", namespace))?;
  print_report(&report, "Deactivated", output, verbose)?;
  Ok(exit_code(&report))
}

/// Re-run every feature's reload action. Shell files are left untouched.
pub fn cmd_reload(namespace: &str, output: OutputFormat, verbose: bool) -> Result<ExitCode> {
  let report = environment()
    .reload(namespace)
    .with_context(|| format!("Failed to reload {}", namespace))?;
  print_report(&report, "Reloaded", output, verbose)?;
  Ok(exit_code(&report))
}
