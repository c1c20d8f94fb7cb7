//! Implementation of the `sprinter remove` command.

use std::process::ExitCode;

use anyhow::{Context, Result};

use super::{environment, exit_code};
use crate::output::{OutputFormat, print_info, print_report};
use crate::prompts::confirm_removal;

/// Destroy every feature of `namespace`, delete its root and clear its
/// activation hook.
pub fn cmd_remove(namespace: &str, force: bool, output: OutputFormat, verbose: bool) -> Result<ExitCode> {
  let mut engine = environment();
  let installed = engine
    .installed_manifest(namespace)
    .with_context(|| format!("Cannot remove {}", namespace))?;
  let features: Vec<&str> = installed.formula_sections().collect();

  if !confirm_removal(namespace, &features, force)? {
    print_info("Aborted.");
    return Ok(ExitCode::SUCCESS);
  }

  let report = engine
    .remove(namespace)
    .with_context(|| format!("Failed to remove {}", namespace))?;

  print_report(&report, "Removed", output, verbose)?;
  Ok(exit_code(&report))
}
