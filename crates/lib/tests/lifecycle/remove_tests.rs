//! Removing environments.

use std::fs;

use sprinter_lib::environment::{EnvironmentError, Operation, Phase};

use super::common::{TestEnv, calls_for, manifest};

const TWO_FEATURES: &str = r#"
[config]
namespace = "dev"

[git]
formula = "recorder"

[ruby]
formula = "recorder"
"#;

#[test]
fn remove_destroys_features_and_deletes_root() {
  let env = TestEnv::new();
  fs::create_dir_all(env.home()).unwrap();
  fs::write(env.shell_file(".bashrc"), "export EDITOR=vim\n").unwrap();

  let mut engine = env.environment();
  engine.install(manifest(TWO_FEATURES)).unwrap();
  env.take_calls();

  let report = engine.remove("dev").unwrap();

  assert_eq!(report.operation, Operation::Remove);
  assert_eq!(
    calls_for(&env.take_calls(), Phase::Destroy),
    vec!["git (recorder)", "ruby (recorder)"]
  );
  assert!(!env.root_dir("dev").exists());
  assert!(!engine.is_installed("dev"));
  assert_eq!(env.read_shell_file(".bashrc"), "export EDITOR=vim\n");
  assert!(!env.read_shell_file(".profile").contains("#SPRINTER_dev"));
}

#[test]
fn remove_twice_reports_not_installed() {
  let env = TestEnv::new();
  let mut engine = env.environment();
  engine.install(manifest(TWO_FEATURES)).unwrap();
  engine.remove("dev").unwrap();

  let err = engine.remove("dev").unwrap_err();
  assert!(matches!(err, EnvironmentError::NotInstalled { .. }));
}

#[test]
fn remove_leaves_other_namespaces() {
  let env = TestEnv::new();
  let mut engine = env.environment();
  engine.install(manifest(TWO_FEATURES)).unwrap();
  engine
    .install(manifest("[config]\nnamespace = \"work\"\n\n[jq]\nformula = \"recorder\"\n"))
    .unwrap();

  engine.remove("dev").unwrap();

  assert_eq!(engine.installed_namespaces().unwrap(), vec!["work"]);
  let bashrc = env.read_shell_file(".bashrc");
  assert!(bashrc.contains("#SPRINTER_work"));
  assert!(!bashrc.contains("#SPRINTER_dev"));
}
