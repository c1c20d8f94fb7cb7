//! CLI output formatting utilities.
//!
//! Colored status lines for humans, pretty JSON for scripts.

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};

use sprinter_lib::environment::{Phase, RunReport};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
  pub const ARROW: &str = "→";
}

/// Comma separated phase names, or `no actions`.
pub fn format_actions(actions: &[Phase]) -> String {
  if actions.is_empty() {
    return "no actions".to_string();
  }
  actions.iter().map(Phase::as_str).collect::<Vec<_>>().join(", ")
}

pub fn print_success(message: &str) {
  println!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    message
  );
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_warning(message: &str) {
  eprintln!(
    "{} {}",
    symbols::WARNING.if_supports_color(Stream::Stderr, |s| s.yellow()),
    message.if_supports_color(Stream::Stderr, |s| s.yellow())
  );
}

pub fn print_info(message: &str) {
  println!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    message
  );
}

pub fn print_stat(label: &str, value: &str) {
  println!(
    "  {}: {}",
    label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value
  );
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}

/// Print the outcome of an operation. `done` is the past-tense verb.
pub fn print_report(report: &RunReport, done: &str, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
  if format.is_json() {
    let value = serde_json::json!({
      "status": report.status(),
      "report": report,
    });
    return print_json(&value);
  }

  if report.is_success() {
    print_success(&format!("{} {}", done, report.namespace));
  } else {
    print_warning(&format!(
      "{} {} with {} error(s)",
      done,
      report.namespace,
      report.errors.len()
    ));
  }
  print_stat("Root", &report.root_dir.display().to_string());

  for feature in &report.features {
    if verbose || !feature.errors.is_empty() {
      println!("  {} {}: {}", symbols::ARROW, feature.key, format_actions(&feature.actions));
    }
  }
  for error in &report.errors {
    print_error(&error.to_string());
  }

  Ok(())
}
