//! Implementation of the `sprinter update` command.

use std::process::ExitCode;

use anyhow::{Context, Result};

use sprinter_lib::manifest::Manifest;

use super::{environment, exit_code};
use crate::output::{OutputFormat, print_report};

/// Update `namespace` from its recorded manifest source, or from `location`
/// when given.
pub fn cmd_update(namespace: &str, location: Option<&str>, output: OutputFormat, verbose: bool) -> Result<ExitCode> {
  let mut engine = environment();

  let report = match location {
    Some(location) => {
      let manifest = Manifest::load(location).with_context(|| format!("Failed to load manifest {}", location))?;
      engine.update_to(namespace, manifest)
    }
    None => engine.update(namespace),
  }
  .with_context(|| format!("Failed to update {}", namespace))?;

  print_report(&report, "Updated", output, verbose)?;
  Ok(exit_code(&report))
}
