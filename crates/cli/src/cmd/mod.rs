mod install;
mod list;
mod remove;
mod state;
mod update;
mod validate;

use std::process::ExitCode;

use sprinter_lib::environment::{Environment, EnvironmentOptions, RunReport};

pub use install::cmd_install;
pub use list::cmd_list;
pub use remove::cmd_remove;
pub use state::{cmd_activate, cmd_deactivate, cmd_reload};
pub use update::cmd_update;
pub use validate::cmd_validate;

/// Engine rooted at `SPRINTER_ROOT` (or `~/.sprinter`) with shell files in `HOME`.
fn environment() -> Environment {
  Environment::new(EnvironmentOptions::from_env())
}

/// 0 on success, 2 when features reported errors.
fn exit_code(report: &RunReport) -> ExitCode {
  if report.is_success() {
    ExitCode::SUCCESS
  } else {
    ExitCode::from(2)
  }
}
