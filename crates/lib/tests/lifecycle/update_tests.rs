//! Updates between installed and target manifests.

use std::fs;

use sprinter_lib::environment::{EnvironmentError, Operation, Phase};
use sprinter_lib::manifest::Manifest;

use super::common::{TestEnv, calls_for, manifest};

const BASE: &str = r#"
[config]
namespace = "dev"

[git]
formula = "package"
apt-get = "git"

[ruby]
formula = "recorder"
version = "3.3"
"#;

fn installed(env: &TestEnv) -> sprinter_lib::environment::Environment {
  let mut engine = env.environment();
  engine.install(manifest(BASE)).unwrap();
  env.take_calls();
  engine
}

#[test]
fn unchanged_update_runs_no_actions() {
  let env = TestEnv::new();
  let mut engine = installed(&env);

  let report = engine.update_to("dev", manifest(BASE)).unwrap();

  assert_eq!(report.operation, Operation::Update);
  assert!(report.is_success());
  assert!(env.take_calls().is_empty());
}

#[test]
fn removed_feature_is_destroyed_once() {
  let env = TestEnv::new();
  let mut engine = installed(&env);
  let target = r#"
[config]
namespace = "dev"

[git]
formula = "package"
apt-get = "git"
"#;

  engine.update_to("dev", manifest(target)).unwrap();

  let calls = env.take_calls();
  assert_eq!(calls_for(&calls, Phase::Destroy), vec!["ruby (recorder)"]);
  assert!(calls_for(&calls, Phase::Setup).is_empty());
  assert!(calls_for(&calls, Phase::Update).is_empty());

  let persisted = Manifest::read(&env.root_dir("dev").join("manifest")).unwrap();
  assert!(persisted.get_feature_config("ruby").is_none());
}

#[test]
fn changed_config_runs_update_and_new_feature_runs_setup() {
  let env = TestEnv::new();
  let mut engine = installed(&env);
  let target = BASE.replace("3.3", "3.4") + "\n[node]\nformula = \"recorder\"\n";

  engine.update_to("dev", manifest(&target)).unwrap();

  let calls = env.take_calls();
  assert_eq!(calls_for(&calls, Phase::Update), vec!["ruby (recorder)"]);
  assert_eq!(calls_for(&calls, Phase::Setup), vec!["node (recorder)"]);
  assert!(calls_for(&calls, Phase::Destroy).is_empty());
}

#[test]
fn formula_change_destroys_old_and_sets_up_new() {
  let env = TestEnv::new();
  let mut engine = installed(&env);
  let target = BASE.replace("formula = \"recorder\"", "formula = \"package\"");

  engine.update_to("dev", manifest(&target)).unwrap();

  let calls = env.take_calls();
  assert_eq!(calls_for(&calls, Phase::Setup), vec!["ruby (package)"]);
  assert_eq!(calls_for(&calls, Phase::Destroy), vec!["ruby (recorder)"]);
  assert!(calls_for(&calls, Phase::Update).is_empty());
}

#[test]
fn update_phase_filter_skips_update() {
  let env = TestEnv::new();
  let mut engine = installed(&env);
  let target = BASE.replace("version = \"3.3\"", "version = \"3.4\"\nphases = \"setup\"");

  let report = engine.update_to("dev", manifest(&target)).unwrap();

  assert!(env.take_calls().is_empty());
  assert!(report.actions_for("ruby").is_empty());
}

#[test]
fn update_refetches_from_recorded_source() {
  let env = TestEnv::new();
  let path = env.temp.path().join("dev.toml");
  fs::write(&path, BASE).unwrap();

  let mut engine = env.environment();
  engine.install(Manifest::load(path.to_str().unwrap()).unwrap()).unwrap();
  env.take_calls();

  fs::write(&path, BASE.replace("3.3", "3.4")).unwrap();
  engine.update("dev").unwrap();

  assert_eq!(calls_for(&env.take_calls(), Phase::Update), vec!["ruby (recorder)"]);
  let persisted = Manifest::read(&env.root_dir("dev").join("manifest")).unwrap();
  assert_eq!(persisted.get_feature_config("ruby").unwrap().get("version"), Some("3.4"));
}

#[test]
fn failing_update_keeps_existing_root() {
  let env = TestEnv::new();
  let mut engine = installed(&env);
  let target = BASE.replace("version = \"3.3\"", "version = \"3.4\"\nfail = \"update\"");

  let err = engine.update_to("dev", manifest(&target)).unwrap_err();

  assert!(matches!(err, EnvironmentError::Formula { phase: Phase::Update, .. }));
  assert!(env.root_dir("dev").join("manifest").exists());
}

const TOOL: &str = r#"
[config]
namespace = "dev"

[tool]
formula = "command"
phases = "setup"
rc = "export TOOL_HOME=/opt/tool"
note = "a"
"#;

#[test]
fn filtered_update_keeps_rc_line() {
  let env = TestEnv::new();
  let mut engine = env.environment();
  engine.install(manifest(TOOL)).unwrap();
  let rc = env.root_dir("dev").join(".rc");
  assert!(fs::read_to_string(&rc).unwrap().contains("export TOOL_HOME=/opt/tool"));

  let report = engine.update_to("dev", manifest(&TOOL.replace("note = \"a\"", "note = \"b\""))).unwrap();

  assert!(report.actions_for("tool").is_empty());
  let content = fs::read_to_string(&rc).unwrap();
  assert_eq!(content.matches("export TOOL_HOME=/opt/tool").count(), 1);
}

#[test]
fn updated_feature_rc_line_is_not_duplicated() {
  let env = TestEnv::new();
  let mut engine = env.environment();
  let updating = TOOL.replace("phases = \"setup\"\n", "");
  engine.install(manifest(&updating)).unwrap();

  engine.update_to("dev", manifest(&updating.replace("note = \"a\"", "note = \"b\""))).unwrap();

  let content = fs::read_to_string(env.root_dir("dev").join(".rc")).unwrap();
  assert_eq!(content.matches("export TOOL_HOME=/opt/tool").count(), 1);
}
