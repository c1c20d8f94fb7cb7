//! Interactive confirmation before destructive commands.

use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{Result, bail};

/// Question asked before `remove` deletes an environment root.
fn removal_question(namespace: &str, features: &[&str]) -> String {
  match features {
    [] => format!("Remove environment {namespace}?"),
    _ => format!(
      "Remove environment {namespace} and its {} feature(s) ({})?",
      features.len(),
      features.join(", ")
    ),
  }
}

/// Ask whether `namespace` may be removed. `force` answers yes without asking.
///
/// Without a terminal there is nobody to ask, so the removal is refused.
pub fn confirm_removal(namespace: &str, features: &[&str], force: bool) -> Result<bool> {
  if force {
    return Ok(true);
  }
  if !io::stdin().is_terminal() || !io::stderr().is_terminal() {
    bail!("Refusing to remove {namespace} without confirmation from a non-interactive shell. Pass --force to remove it.");
  }

  let mut stderr = io::stderr().lock();
  write!(stderr, "{} [y/N] ", removal_question(namespace, features))?;
  stderr.flush()?;
  read_answer(io::stdin().lock())
}

fn read_answer(mut input: impl BufRead) -> Result<bool> {
  let mut line = String::new();
  input.read_line(&mut line)?;
  Ok(is_yes(&line))
}

fn is_yes(answer: &str) -> bool {
  matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
