//! Running shell commands on behalf of formulas.

use std::io;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use tracing::{debug, trace};

/// Shell binary and arguments that run `script`.
#[cfg(unix)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("/bin/sh", vec!["-c".to_string(), script.to_string()])
}

#[cfg(windows)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("cmd.exe", vec!["/C".to_string(), script.to_string()])
}

/// Outcome of a finished shell command.
#[derive(Debug, Clone)]
pub struct ShellOutput {
  pub success: bool,
  pub code: Option<i32>,
  pub stdout: String,
  pub stderr: String,
}

impl From<Output> for ShellOutput {
  fn from(output: Output) -> Self {
    Self {
      success: output.status.success(),
      code: output.status.code(),
      stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
      stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    }
  }
}

/// Run `script` through the platform shell.
///
/// `cwd` is created beforehand if it does not exist. `path_prefix` is
/// prepended to the inherited `PATH`.
pub fn run_shell(script: &str, cwd: Option<&Path>, path_prefix: Option<&Path>) -> io::Result<ShellOutput> {
  let (shell, args) = shell_cmd(script);
  let mut command = Command::new(shell);
  command.args(&args).stdin(Stdio::null());

  if let Some(dir) = cwd {
    std::fs::create_dir_all(dir)?;
    command.current_dir(dir);
  }

  if let Some(prefix) = path_prefix {
    let inherited = std::env::var_os("PATH").unwrap_or_default();
    let mut paths = vec![prefix.to_path_buf()];
    paths.extend(std::env::split_paths(&inherited));
    let joined = std::env::join_paths(paths).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    command.env("PATH", joined);
  }

  debug!(script = %script, cwd = ?cwd, "running shell command");
  let output: ShellOutput = command.output()?.into();
  trace!(code = ?output.code, stdout = %output.stdout.trim_end(), "shell command finished");
  Ok(output)
}
