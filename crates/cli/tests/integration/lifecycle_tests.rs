//! Update, activation and removal of installed environments.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn deactivate_and_activate_toggle_hook() {
  let env = TestEnv::from_fixture("minimal.toml");
  env.install().assert().success();

  env
    .sprinter_cmd()
    .args(["deactivate", "minimal"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Deactivated minimal"));
  assert!(!env.read_home_file(".bashrc").contains("#SPRINTER_minimal"));
  assert!(env.root_dir("minimal").exists());

  env.sprinter_cmd().args(["activate", "minimal"]).assert().success();
  assert!(env.read_home_file(".bashrc").contains("#SPRINTER_minimal"));
}

#[test]
fn reload_succeeds() {
  let env = TestEnv::from_fixture("minimal.toml");
  env.install().assert().success();

  env
    .sprinter_cmd()
    .args(["reload", "minimal"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Reloaded minimal"));
}

#[test]
fn remove_requires_force_when_not_interactive() {
  let env = TestEnv::from_fixture("minimal.toml");
  env.install().assert().success();

  env
    .sprinter_cmd()
    .args(["remove", "minimal"])
    .assert()
    .code(1)
    .stderr(predicate::str::contains("--force"));
  assert!(env.root_dir("minimal").exists());
}

#[cfg(unix)]
#[test]
fn remove_destroys_features_and_root() {
  let env = TestEnv::from_fixture("tools.toml");
  env.install().assert().success();

  env
    .sprinter_cmd()
    .args(["remove", "tools", "--force"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Removed tools"));

  assert!(!env.root_dir("tools").exists());
  assert!(env.temp_path().join("destroyed").is_file());
  assert!(!env.read_home_file(".profile").contains("#SPRINTER_tools"));
}

#[cfg(unix)]
#[test]
fn update_refetches_changed_manifest() {
  let env = TestEnv::from_fixture("tools.toml");
  env.install().assert().success();

  // Unchanged source: nothing runs.
  env.sprinter_cmd().args(["update", "tools"]).assert().success();
  assert!(!env.temp_path().join("updated").exists());
  let rc = std::fs::read_to_string(env.root_dir("tools").join(".rc")).unwrap();
  assert!(rc.contains("export HELLO=1"), "unchanged features keep their rc lines");

  let changed = TestEnv::fixture_content("tools.toml").replace("HELLO=1", "HELLO=2");
  env.write_manifest(&changed);
  env
    .sprinter_cmd()
    .args(["update", "tools"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Updated tools"));

  assert!(env.temp_path().join("updated").is_file());
  let rc = std::fs::read_to_string(env.root_dir("tools").join(".rc")).unwrap();
  assert!(rc.contains("export HELLO=2"));
}

#[cfg(unix)]
#[test]
fn update_with_explicit_manifest() {
  let env = TestEnv::from_fixture("tools.toml");
  env.install().assert().success();

  let other = env.temp_path().join("other.toml");
  std::fs::write(&other, "[config]\nnamespace = \"tools\"\n").unwrap();

  env
    .sprinter_cmd()
    .args(["update", "tools", "--manifest"])
    .arg(&other)
    .assert()
    .success();

  assert!(env.temp_path().join("destroyed").is_file(), "dropped feature is destroyed");
}
