//! Install command integration tests.

use std::fs;

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn install_minimal_creates_layout_and_hook() {
  let env = TestEnv::from_fixture("minimal.toml");

  env
    .install()
    .assert()
    .success()
    .stdout(predicate::str::contains("Installed minimal"));

  let root = env.root_dir("minimal");
  assert!(root.join("bin").is_dir());
  assert!(root.join("manifest").is_file());
  assert!(root.join(".rc").is_file());
  for file in [".bash_profile", ".bashrc", ".profile"] {
    assert!(env.read_home_file(file).contains("#SPRINTER_minimal"), "{file} lacks the hook");
  }
}

#[test]
fn install_namespace_flag_overrides_manifest() {
  let env = TestEnv::from_fixture("minimal.toml");

  env.install().args(["--namespace", "other"]).assert().success();

  assert!(env.root_dir("other").join("manifest").is_file());
  assert!(!env.root_dir("minimal").exists());
}

#[test]
fn install_json_reports_status() {
  let env = TestEnv::from_fixture("minimal.toml");

  let output = env.sprinter_cmd().args(["-o", "json"]).arg("install").arg(&env.manifest_path).output().unwrap();

  assert!(output.status.success());
  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["status"], "success");
  assert_eq!(json["report"]["namespace"], "minimal");
  assert_eq!(json["report"]["operation"], "install");
}

#[cfg(unix)]
#[test]
fn install_runs_feature_setup() {
  let env = TestEnv::from_fixture("tools.toml");

  env.install().assert().success();

  let root = env.root_dir("tools");
  let marker = fs::read_to_string(root.join("opt/hello/marker")).unwrap();
  assert_eq!(marker.trim(), "installed");
  let rc = fs::read_to_string(root.join(".rc")).unwrap();
  assert!(rc.contains("export HELLO=1"));
}

#[cfg(unix)]
#[test]
fn install_with_feature_errors_exits_two() {
  let env = TestEnv::from_fixture("broken.toml");

  env
    .install()
    .assert()
    .code(2)
    .stderr(predicate::str::contains("exited with 3"));

  let root = env.root_dir("broken");
  assert!(root.join("manifest").is_file(), "soft errors keep the environment");
  assert!(root.join("opt/fine/marker").is_file());
}

#[test]
fn list_shows_installed_environments() {
  let env = TestEnv::from_fixture("minimal.toml");
  env.install().assert().success();

  env
    .sprinter_cmd()
    .arg("list")
    .assert()
    .success()
    .stdout(predicate::str::contains("minimal"));

  let output = env.sprinter_cmd().args(["--output", "json", "list"]).output().unwrap();
  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["environments"][0]["namespace"], "minimal");
  assert!(
    json["environments"][0]["source"]
      .as_str()
      .unwrap()
      .ends_with("minimal.toml")
  );
}
