//! Activation, deactivation and reload.

use std::fs;

use sprinter_lib::environment::{Operation, Phase};

use super::common::{TestEnv, calls_for, manifest};

const TOOLS: &str = r#"
[config]
namespace = "dev"

[tools]
formula = "recorder"
"#;

#[test]
fn deactivate_clears_hook_and_activate_restores_it() {
  let env = TestEnv::new();
  let mut engine = env.environment();
  engine.install(manifest(TOOLS)).unwrap();
  env.take_calls();
  let installed_bashrc = env.read_shell_file(".bashrc");

  let report = engine.deactivate("dev").unwrap();
  assert_eq!(report.operation, Operation::Deactivate);
  assert_eq!(calls_for(&env.take_calls(), Phase::Deactivate), vec!["tools (recorder)"]);
  for file in [".bash_profile", ".bashrc", ".profile"] {
    assert!(!env.read_shell_file(file).contains("#SPRINTER_dev"), "{file} still has the hook");
  }
  assert!(env.root_dir("dev").exists(), "deactivate keeps the root");

  engine.activate("dev").unwrap();
  assert_eq!(calls_for(&env.take_calls(), Phase::Activate), vec!["tools (recorder)"]);
  assert_eq!(env.read_shell_file(".bashrc"), installed_bashrc);
}

#[test]
fn reload_runs_reload_and_leaves_shell_files_alone() {
  let env = TestEnv::new();
  let mut engine = env.environment();
  engine.install(manifest(TOOLS)).unwrap();
  env.take_calls();
  fs::write(env.shell_file(".profile"), "edited by hand\n").unwrap();

  let report = engine.reload("dev").unwrap();

  assert!(report.is_success());
  assert_eq!(calls_for(&env.take_calls(), Phase::Reload), vec!["tools (recorder)"]);
  assert_eq!(env.read_shell_file(".profile"), "edited by hand\n");
}

#[test]
fn activate_is_idempotent() {
  let env = TestEnv::new();
  let mut engine = env.environment();
  engine.install(manifest(TOOLS)).unwrap();
  let before = env.read_shell_file(".bash_profile");

  engine.activate("dev").unwrap();
  engine.activate("dev").unwrap();

  assert_eq!(env.read_shell_file(".bash_profile"), before);
}

#[test]
fn soft_error_in_activate_is_reported() {
  let env = TestEnv::new();
  let mut engine = env.environment();
  engine
    .install(manifest(&format!("{TOOLS}soft_error = \"activate\"\n")))
    .unwrap();

  let report = engine.activate("dev").unwrap();

  assert!(!report.is_success());
  assert_eq!(report.errors[0].phase, Phase::Activate);
  assert!(env.read_shell_file(".bashrc").contains("#SPRINTER_dev"));
}
