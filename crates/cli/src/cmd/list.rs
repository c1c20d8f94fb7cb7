//! Implementation of the `sprinter list` command.

use std::process::ExitCode;

use anyhow::{Context, Result};

use super::environment;
use crate::output::{OutputFormat, print_info, print_json, print_stat, print_success};

/// List installed namespaces with their source and features.
pub fn cmd_list(output: OutputFormat, verbose: bool) -> Result<ExitCode> {
  let engine = environment();
  let namespaces = engine
    .installed_namespaces()
    .context("Failed to list environments")?;

  let mut entries = Vec::with_capacity(namespaces.len());
  for namespace in &namespaces {
    let manifest = engine
      .installed_manifest(namespace)
      .with_context(|| format!("Failed to read manifest of {}", namespace))?;
    let features: Vec<String> = manifest.formula_sections().map(str::to_string).collect();
    entries.push((namespace, manifest.source().map(str::to_string), features));
  }

  if output.is_json() {
    let items: Vec<_> = entries
      .iter()
      .map(|(namespace, source, features)| {
        let directory = engine.directory(namespace, false);
        serde_json::json!({
          "namespace": namespace,
          "root_dir": directory.root_dir(),
          "source": source,
          "features": features,
        })
      })
      .collect();
    print_json(&serde_json::json!({ "environments": items }))?;
    return Ok(ExitCode::SUCCESS);
  }

  if entries.is_empty() {
    print_info("No environments installed.");
    return Ok(ExitCode::SUCCESS);
  }

  for (namespace, source, features) in &entries {
    print_success(namespace);
    print_stat("Source", source.as_deref().unwrap_or("-"));
    print_stat("Features", &features.len().to_string());
    if verbose {
      for feature in features {
        println!("    {}", feature);
      }
    }
  }

  Ok(ExitCode::SUCCESS)
}
