//! Shared helpers for lifecycle tests.

use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use sprinter_lib::directory::Directory;
use sprinter_lib::environment::{Environment, EnvironmentOptions, Phase, Prerequisite};
use sprinter_lib::formula::{ActionResult, Formula, FormulaContext, FormulaError, FormulaRegistry};
use sprinter_lib::manifest::{FeatureSpec, Manifest};
use sprinter_lib::platform::System;
use sprinter_lib::platform::os::{Distro, Os};
use tempfile::TempDir;

/// One action a [`Recorder`] was asked to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
  pub feature: String,
  pub formula: String,
  pub phase: Phase,
}

pub type Calls = Rc<RefCell<Vec<Call>>>;

/// A formula that records every action it runs.
///
/// `fail = "<phase>"` makes that action return `Err`; `soft_error = "<phase>"`
/// makes it report a soft error.
pub struct Recorder {
  spec: FeatureSpec,
  calls: Calls,
}

impl Recorder {
  fn act(&self, phase: Phase) -> ActionResult {
    let key = self.spec.key();
    self.calls.borrow_mut().push(Call {
      feature: key.feature.clone(),
      formula: key.formula.clone(),
      phase,
    });

    let config = self.spec.config_for(phase.uses_target());
    let flag = |name: &str| config.and_then(|c| c.get(name)) == Some(phase.as_str());
    if flag("fail") {
      return Err(FormulaError::Failed(format!("{} refused to {}", key.feature, phase)));
    }
    if flag("soft_error") {
      return Ok(vec![format!("{phase} went wrong")]);
    }
    Ok(Vec::new())
  }
}

impl Formula for Recorder {
  fn spec(&self) -> &FeatureSpec {
    &self.spec
  }

  fn setup(&mut self, _ctx: &mut FormulaContext<'_>) -> ActionResult {
    self.act(Phase::Setup)
  }

  fn update(&mut self, _ctx: &mut FormulaContext<'_>) -> ActionResult {
    self.act(Phase::Update)
  }

  fn destroy(&mut self, _ctx: &mut FormulaContext<'_>) -> ActionResult {
    self.act(Phase::Destroy)
  }

  fn activate(&mut self, _ctx: &mut FormulaContext<'_>) -> ActionResult {
    self.act(Phase::Activate)
  }

  fn deactivate(&mut self, _ctx: &mut FormulaContext<'_>) -> ActionResult {
    self.act(Phase::Deactivate)
  }

  fn reload(&mut self, _ctx: &mut FormulaContext<'_>) -> ActionResult {
    self.act(Phase::Reload)
  }

  fn prompt(&mut self, _ctx: &mut FormulaContext<'_>) -> ActionResult {
    self.act(Phase::Prompt)
  }

  fn validate(&self) -> Vec<String> {
    self.act(Phase::Validate).unwrap_or_default()
  }
}

/// A prerequisite that counts its installs.
pub struct CountingPrerequisite {
  pub key: &'static str,
  pub installs: Rc<RefCell<usize>>,
  pub fail: bool,
}

impl Prerequisite for CountingPrerequisite {
  fn name(&self) -> &str {
    "counting"
  }

  fn config_key(&self) -> &str {
    self.key
  }

  fn install(&self, directory: &Directory) -> Result<(), FormulaError> {
    *self.installs.borrow_mut() += 1;
    if self.fail {
      return Err(FormulaError::Failed(format!("cannot install into {}", directory.root_dir().display())));
    }
    Ok(())
  }
}

/// Isolated sprinter root and home directory.
pub struct TestEnv {
  pub temp: TempDir,
  pub calls: Calls,
}

impl TestEnv {
  pub fn new() -> Self {
    Self {
      temp: TempDir::new().unwrap(),
      calls: Rc::new(RefCell::new(Vec::new())),
    }
  }

  pub fn sprinter_root(&self) -> PathBuf {
    self.temp.path().join("root")
  }

  pub fn home(&self) -> PathBuf {
    self.temp.path().join("home")
  }

  pub fn root_dir(&self, namespace: &str) -> PathBuf {
    self.sprinter_root().join(namespace)
  }

  pub fn shell_file(&self, name: &str) -> PathBuf {
    self.home().join(name)
  }

  pub fn read_shell_file(&self, name: &str) -> String {
    fs::read_to_string(self.shell_file(name)).unwrap_or_default()
  }

  /// Registry with the built-ins plus `recorder`. `package` is replaced by
  /// the recorder so no real package manager runs.
  pub fn registry(&self) -> FormulaRegistry {
    let mut registry = FormulaRegistry::builtin();
    for id in ["recorder", "package"] {
      let calls = self.calls.clone();
      registry.register(id, move |spec| {
        Box::new(Recorder {
          spec: spec.clone(),
          calls: calls.clone(),
        })
      });
    }
    registry
  }

  pub fn environment(&self) -> Environment {
    let options = EnvironmentOptions::new(self.sprinter_root(), self.home());
    Environment::new(options).with_registry(self.registry()).with_system(System {
      os: Some(Os::Linux),
      distro: Some(Distro::Debian),
      node: "testbox".to_string(),
    })
  }

  pub fn take_calls(&self) -> Vec<Call> {
    std::mem::take(&mut *self.calls.borrow_mut())
  }
}

pub fn manifest(toml: &str) -> Manifest {
  toml.parse().unwrap()
}

/// Calls for `phase`, as `feature (formula)` strings.
pub fn calls_for(calls: &[Call], phase: Phase) -> Vec<String> {
  calls
    .iter()
    .filter(|c| c.phase == phase)
    .map(|c| format!("{} ({})", c.feature, c.formula))
    .collect()
}
