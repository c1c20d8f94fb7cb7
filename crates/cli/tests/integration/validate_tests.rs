//! Validate command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn validate_clean_manifest() {
  let env = TestEnv::from_fixture("minimal.toml");

  env
    .sprinter_cmd()
    .arg("validate")
    .arg(&env.manifest_path)
    .assert()
    .success()
    .stdout(predicate::str::contains("Validated minimal"));
  assert!(!env.sprinter_root().exists());
}

#[test]
fn validate_reports_unknown_formula() {
  let env = TestEnv::from_fixture("unknown_formula.toml");

  env
    .sprinter_cmd()
    .arg("validate")
    .arg(&env.manifest_path)
    .assert()
    .code(2)
    .stderr(predicate::str::contains("teleport"));
  assert!(!env.sprinter_root().exists());
  assert!(!env.home().exists());
}

#[test]
fn validate_rejects_malformed_manifest() {
  let env = TestEnv::from_fixture("minimal.toml");
  env.write_manifest("[config\nnamespace = ");

  env
    .sprinter_cmd()
    .arg("validate")
    .arg(&env.manifest_path)
    .assert()
    .code(1)
    .stderr(predicate::str::contains("Failed to load manifest"));
}
