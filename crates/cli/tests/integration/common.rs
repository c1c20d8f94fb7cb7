//! Common test utilities for integration tests.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Isolated sprinter root, home directory and manifest for one test.
pub struct TestEnv {
  pub temp: TempDir,
  pub manifest_path: PathBuf,
}

impl TestEnv {
  /// Copy `tests/fixtures/<name>` into a fresh temp directory.
  ///
  /// `@TEMP@` in the fixture is replaced with the temp directory path.
  pub fn from_fixture(name: &str) -> Self {
    let temp = TempDir::new().unwrap();
    let manifest_path = temp.path().join(name);
    let env = Self { temp, manifest_path };
    env.write_manifest(&Self::fixture_content(name));
    env
  }

  pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
  }

  pub fn fixture_content(name: &str) -> String {
    fs::read_to_string(Self::fixture_path(name)).unwrap()
  }

  /// Overwrite the manifest, expanding `@TEMP@`.
  pub fn write_manifest(&self, content: &str) {
    let expanded = content.replace("@TEMP@", &self.temp_path().display().to_string());
    fs::write(&self.manifest_path, expanded).unwrap();
  }

  pub fn temp_path(&self) -> PathBuf {
    dunce::canonicalize(self.temp.path()).unwrap_or_else(|_| self.temp.path().to_path_buf())
  }

  pub fn sprinter_root(&self) -> PathBuf {
    self.temp_path().join("root")
  }

  pub fn home(&self) -> PathBuf {
    self.temp_path().join("home")
  }

  pub fn root_dir(&self, namespace: &str) -> PathBuf {
    self.sprinter_root().join(namespace)
  }

  pub fn read_home_file(&self, name: &str) -> String {
    fs::read_to_string(self.home().join(name)).unwrap_or_default()
  }

  /// Get a Command for the sprinter binary with the test's root and home.
  pub fn sprinter_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("sprinter");
    cmd
      .env("SPRINTER_ROOT", self.sprinter_root())
      .env("HOME", self.home())
      .env_remove("RUST_LOG");
    cmd
  }

  /// `sprinter install <manifest>`
  pub fn install(&self) -> Command {
    let mut cmd = self.sprinter_cmd();
    cmd.arg("install").arg(&self.manifest_path);
    cmd
  }
}
