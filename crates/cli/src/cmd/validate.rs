//! Implementation of the `sprinter validate` command.

use std::process::ExitCode;

use anyhow::{Context, Result};

use sprinter_lib::manifest::Manifest;

use super::{environment, exit_code};
use crate::output::{OutputFormat, print_report};

/// Check a manifest without installing anything.
pub fn cmd_validate(location: &str, output: OutputFormat, verbose: bool) -> Result<ExitCode> {
  let manifest = Manifest::load(location).with_context(|| format!("Failed to load manifest {}", location))?;
  let report = environment().validate_manifest(manifest).context("Validation failed")?;

  print_report(&report, "Validated", output, verbose)?;
  Ok(exit_code(&report))
}
