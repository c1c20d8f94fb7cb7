//! Implementation of the `sprinter install` command.

use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing::info;

use sprinter_lib::manifest::Manifest;

use super::{environment, exit_code};
use crate::output::{OutputFormat, print_info, print_report};

/// Install the manifest at `location` (a path or URL).
///
/// An existing namespace is updated to the manifest instead.
pub fn cmd_install(location: &str, namespace: Option<&str>, output: OutputFormat, verbose: bool) -> Result<ExitCode> {
  let mut manifest = Manifest::load(location).with_context(|| format!("Failed to load manifest {}", location))?;
  if let Some(namespace) = namespace {
    manifest.set_namespace(namespace);
  }

  let mut engine = environment();
  info!(location = %location, "installing");
  let report = engine.install(manifest).context("Install failed")?;

  print_report(&report, "Installed", output, verbose)?;
  if !output.is_json() {
    print_info(&format!(
      "Open a new shell or run: source {}",
      report.root_dir.join(".rc").display()
    ));
  }

  Ok(exit_code(&report))
}
