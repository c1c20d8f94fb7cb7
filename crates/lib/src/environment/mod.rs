//! The environment lifecycle engine.
//!
//! Each public operation takes an environment from an installed state
//! (the manifest persisted in its root) to a desired state, running formula
//! actions for every feature that changed:
//!
//! | operation    | source    | target   | categories run                  | activation hook |
//! |--------------|-----------|----------|---------------------------------|-----------------|
//! | `install`    | -         | given    | prompt, validate, setup         | injected        |
//! | `update`     | persisted | re-fetch | setup, update, destroy          | injected        |
//! | `remove`     | persisted | -        | destroy                         | cleared         |
//! | `activate`   | persisted | -        | activate                        | injected        |
//! | `deactivate` | persisted | -        | deactivate                      | cleared         |
//! | `reload`     | persisted | -        | reload                          | untouched       |
//!
//! A run moves through [`RunState`]s in order. Per-feature soft errors are
//! collected in the returned [`RunReport`] and stop further actions for that
//! feature only. A formula returning `Err` aborts the run; a failed fresh
//! install removes the root it created.

mod phase;
mod prerequisite;
mod record;
mod run;

use std::fs;
use std::io;
use std::path::PathBuf;

use indexmap::IndexMap;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::consts::{APP_NAME, CONFIG_SECTION, OVERRIDE_MARKER, SHELL_FILES};
use crate::context::{Context, ContextError};
use crate::directory::{Directory, DirectoryError};
use crate::formula::{FormulaContext, FormulaError, FormulaRegistry};
use crate::injections::{InjectionCommitError, Injections};
use crate::manifest::{FeatureSpec, Manifest, ManifestError, ManifestPair, is_truthy, validate_namespace};
use crate::platform::{System, paths, shell};

pub use phase::Phase;
pub use prerequisite::{Prerequisite, Virtualenv};
pub use record::{FeatureActionError, FeatureOutcome, FeatureRecord, RunReport, RunStatus};
pub use run::{Operation, RunState};

use prerequisite::should_install;
use run::Run;

/// Errors that abort an operation.
#[derive(Debug, Error)]
pub enum EnvironmentError {
  #[error("namespace {namespace} is not installed")]
  NotInstalled { namespace: String },

  #[error("installed manifest for {namespace} has no source to update from")]
  NoManifestSource { namespace: String },

  #[error("manifest does not declare a namespace")]
  MissingNamespace,

  #[error(transparent)]
  Directory(#[from] DirectoryError),

  #[error(transparent)]
  Injection(#[from] InjectionCommitError),

  #[error(transparent)]
  Manifest(#[from] ManifestError),

  #[error("{key} {phase} failed: {source}")]
  Formula {
    key: crate::manifest::FeatureKey,
    phase: Phase,
    #[source]
    source: FormulaError,
  },

  #[error("failed to install prerequisite {name}: {source}")]
  Prerequisite {
    name: String,
    #[source]
    source: FormulaError,
  },

  #[error("invalid run state transition from {from} to {to}")]
  InvalidState { from: RunState, to: RunState },

  #[error("failed to read {}: {source}", path.display())]
  Io { path: PathBuf, source: io::Error },
}

/// Where environments live and which shell files activate them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentOptions {
  /// Directory holding one root per namespace.
  pub sprinter_root: PathBuf,
  /// Home directory the shell files are relative to.
  pub home: PathBuf,
  pub shell_files: Vec<String>,
}

impl EnvironmentOptions {
  pub fn new(sprinter_root: impl Into<PathBuf>, home: impl Into<PathBuf>) -> Self {
    Self {
      sprinter_root: sprinter_root.into(),
      home: home.into(),
      shell_files: SHELL_FILES.iter().map(|f| f.to_string()).collect(),
    }
  }

  /// Defaults, honoring `SPRINTER_ROOT` and `HOME`.
  pub fn from_env() -> Self {
    Self::new(paths::sprinter_root(), paths::home_dir())
  }
}

/// What to do with the activation hook at the end of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hook {
  Inject,
  Clear,
  Keep,
}

/// `[config] rewrite_rc`, enabled unless set to a falsy value.
fn rewrite_rc_enabled(manifest: &Manifest) -> bool {
  manifest.config.get("rewrite_rc").map(is_truthy).unwrap_or(true)
}

pub struct Environment {
  options: EnvironmentOptions,
  registry: FormulaRegistry,
  system: System,
  prerequisites: Vec<Box<dyn Prerequisite>>,
}

impl Environment {
  /// An engine with the built-in formulas and prerequisites and the detected
  /// system.
  pub fn new(options: EnvironmentOptions) -> Self {
    Self {
      options,
      registry: FormulaRegistry::builtin(),
      system: System::detect(),
      prerequisites: vec![Box::new(Virtualenv::detect())],
    }
  }

  pub fn with_registry(mut self, registry: FormulaRegistry) -> Self {
    self.registry = registry;
    self
  }

  pub fn with_system(mut self, system: System) -> Self {
    self.system = system;
    self
  }

  pub fn with_prerequisite(mut self, prerequisite: impl Prerequisite + 'static) -> Self {
    self.prerequisites.push(Box::new(prerequisite));
    self
  }

  pub fn registry_mut(&mut self) -> &mut FormulaRegistry {
    &mut self.registry
  }

  pub fn options(&self) -> &EnvironmentOptions {
    &self.options
  }

  pub fn directory(&self, namespace: &str, rewrite_rc: bool) -> Directory {
    Directory::new(namespace, &self.options.sprinter_root, rewrite_rc)
  }

  pub fn is_installed(&self, namespace: &str) -> bool {
    self.directory(namespace, false).exists()
  }

  /// Namespaces with a persisted manifest, sorted.
  pub fn installed_namespaces(&self) -> Result<Vec<String>, EnvironmentError> {
    let root = &self.options.sprinter_root;
    let entries = match fs::read_dir(root) {
      Ok(entries) => entries,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
      Err(source) => {
        return Err(EnvironmentError::Io {
          path: root.clone(),
          source,
        });
      }
    };

    let mut namespaces: Vec<String> = entries
      .filter_map(Result::ok)
      .filter(|entry| entry.path().join("manifest").is_file())
      .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
      .collect();
    namespaces.sort();
    Ok(namespaces)
  }

  /// The manifest persisted for `namespace`.
  pub fn installed_manifest(&self, namespace: &str) -> Result<Manifest, EnvironmentError> {
    self.require_installed(namespace)?;
    let directory = self.directory(namespace, false);
    read_installed(&directory)?.ok_or_else(|| EnvironmentError::NotInstalled {
      namespace: namespace.to_string(),
    })
  }

  /// Install `target`, or update to it when its namespace already exists.
  pub fn install(&mut self, target: Manifest) -> Result<RunReport, EnvironmentError> {
    let namespace = target.namespace().ok_or(EnvironmentError::MissingNamespace)?.to_string();
    validate_namespace(&namespace)?;

    if self.is_installed(&namespace) {
      info!(namespace = %namespace, "namespace already exists, updating");
      return self.update_to(&namespace, target);
    }

    info!(namespace = %namespace, "installing environment");
    let directory = self.directory(&namespace, rewrite_rc_enabled(&target));
    let mut run = self.warm_up(Operation::Install, directory, None, Some(target))?;
    run.directory.initialize()?;

    match self.install_fresh(&mut run) {
      Ok(report) => Ok(report),
      Err(e) => {
        error!(namespace = %namespace, error = %e, "install failed, removing environment root");
        if let Err(cleanup) = run.directory.remove() {
          warn!(namespace = %namespace, error = %cleanup, "failed to remove environment root");
        }
        Err(e)
      }
    }
  }

  fn install_fresh(&mut self, run: &mut Run) -> Result<RunReport, EnvironmentError> {
    self.install_prerequisites(run, true)?;
    self.resolve(run)?;
    run.advance(RunState::Executing)?;

    let specs = run.pair.setups();
    self.run_category(run, Phase::Prompt, &specs)?;
    self.run_category(run, Phase::Validate, &specs)?;
    self.run_category(run, Phase::Setup, &specs)?;

    self.apply_hook(run, Hook::Inject);
    self.finalize(run)
  }

  /// Update `namespace` to the manifest at its recorded source location.
  pub fn update(&mut self, namespace: &str) -> Result<RunReport, EnvironmentError> {
    self.require_installed(namespace)?;
    let directory = self.directory(namespace, false);
    let no_source = || EnvironmentError::NoManifestSource {
      namespace: namespace.to_string(),
    };

    let source = read_installed(&directory)?.ok_or_else(no_source)?;
    let location = source.source().ok_or_else(no_source)?.to_string();
    debug!(namespace = %namespace, location = %location, "re-fetching manifest");

    let target = Manifest::load(&location)?;
    self.update_to(namespace, target)
  }

  /// Update `namespace` to an explicit target manifest.
  pub fn update_to(&mut self, namespace: &str, mut target: Manifest) -> Result<RunReport, EnvironmentError> {
    self.require_installed(namespace)?;
    if target.namespace() != Some(namespace) {
      target.set_namespace(namespace);
    }

    info!(namespace = %namespace, "updating environment");
    let directory = self.directory(namespace, rewrite_rc_enabled(&target));
    let source = read_installed(&directory)?;
    let mut run = self.warm_up(Operation::Update, directory, source, Some(target))?;
    run.directory.initialize()?;

    self.install_prerequisites(&mut run, false)?;
    self.resolve(&mut run)?;
    run.advance(RunState::Executing)?;

    let diff = run.pair.diff();
    self.run_category(&mut run, Phase::Setup, &diff.setup)?;
    self.run_category(&mut run, Phase::Update, &diff.update)?;
    self.run_category(&mut run, Phase::Destroy, &diff.destroy)?;
    keep_rc_lines(&mut run, diff.update.iter().chain(&diff.unchanged))?;

    self.apply_hook(&mut run, Hook::Inject);
    self.finalize(&mut run)
  }

  /// Destroy every feature of `namespace` and delete its root.
  pub fn remove(&mut self, namespace: &str) -> Result<RunReport, EnvironmentError> {
    self.run_installed(Operation::Remove, namespace, Phase::Destroy, Hook::Clear)
  }

  pub fn activate(&mut self, namespace: &str) -> Result<RunReport, EnvironmentError> {
    self.run_installed(Operation::Activate, namespace, Phase::Activate, Hook::Inject)
  }

  pub fn deactivate(&mut self, namespace: &str) -> Result<RunReport, EnvironmentError> {
    self.run_installed(Operation::Deactivate, namespace, Phase::Deactivate, Hook::Clear)
  }

  pub fn reload(&mut self, namespace: &str) -> Result<RunReport, EnvironmentError> {
    self.run_installed(Operation::Reload, namespace, Phase::Reload, Hook::Keep)
  }

  /// Run every feature's `validate` without touching the filesystem.
  pub fn validate_manifest(&mut self, manifest: Manifest) -> Result<RunReport, EnvironmentError> {
    let namespace = manifest.namespace().unwrap_or(APP_NAME).to_string();
    let directory = self.directory(&namespace, false);
    let mut run = self.warm_up(Operation::Validate, directory, None, Some(manifest))?;

    self.resolve(&mut run)?;
    run.advance(RunState::Executing)?;
    let specs = run.pair.setups();
    self.run_category(&mut run, Phase::Validate, &specs)?;
    run.advance(RunState::Finalized)?;

    Ok(build_report(&run))
  }

  /// Operations acting on the installed manifest only.
  fn run_installed(
    &mut self,
    operation: Operation,
    namespace: &str,
    phase: Phase,
    hook: Hook,
  ) -> Result<RunReport, EnvironmentError> {
    self.require_installed(namespace)?;
    info!(namespace = %namespace, operation = %operation, "running operation");

    let directory = self.directory(namespace, false);
    let source = read_installed(&directory)?;
    let mut run = self.warm_up(operation, directory, source, None)?;

    self.resolve(&mut run)?;
    run.advance(RunState::Executing)?;

    let specs = match phase {
      Phase::Destroy => run.pair.destroys(),
      Phase::Activate => run.pair.activations(),
      Phase::Deactivate => run.pair.deactivations(),
      _ => run.pair.reloads(),
    };
    self.run_category(&mut run, phase, &specs)?;

    self.apply_hook(&mut run, hook);
    if operation == Operation::Remove {
      run.directory.remove()?;
    }
    self.finalize(&mut run)
  }

  fn require_installed(&self, namespace: &str) -> Result<(), EnvironmentError> {
    if self.is_installed(namespace) {
      Ok(())
    } else {
      Err(EnvironmentError::NotInstalled {
        namespace: namespace.to_string(),
      })
    }
  }

  /// Start a run with a fresh handler cache.
  fn warm_up(
    &self,
    operation: Operation,
    directory: Directory,
    source: Option<Manifest>,
    target: Option<Manifest>,
  ) -> Result<Run, EnvironmentError> {
    let injections = Injections::new(format!("SPRINTER_{}", directory.namespace())).with_override(OVERRIDE_MARKER);
    let mut run = Run::new(operation, directory, injections, ManifestPair::new(source, target));
    run.advance(RunState::WarmedUp)?;
    debug!(operation = %operation, namespace = %run.directory.namespace(), "warmed up");
    Ok(run)
  }

  fn install_prerequisites(&self, run: &mut Run, fresh: bool) -> Result<(), EnvironmentError> {
    for prerequisite in &self.prerequisites {
      let key = prerequisite.config_key();
      let in_target = run.raw.target.as_ref().is_some_and(|m| m.is_true(CONFIG_SECTION, key));
      let in_source = run.raw.source.as_ref().is_some_and(|m| m.is_true(CONFIG_SECTION, key));
      if !should_install(fresh, in_target, in_source) {
        continue;
      }

      info!(prerequisite = %prerequisite.name(), "installing prerequisite");
      prerequisite
        .install(&run.directory)
        .map_err(|source| EnvironmentError::Prerequisite {
          name: prerequisite.name().to_string(),
          source,
        })?;
    }
    Ok(())
  }

  /// Substitute the context into both manifests and construct one handler
  /// per feature key. Failures are recorded against the feature.
  fn resolve(&mut self, run: &mut Run) -> Result<(), EnvironmentError> {
    run.advance(RunState::Resolved)?;

    let context = Context::for_run(&run.raw, &run.directory, &self.system.node);
    let mut context_errors: IndexMap<String, Vec<ContextError>> = IndexMap::new();
    let mut substitute = |manifest: Option<&Manifest>| {
      manifest.map(|m| {
        let (substituted, errors) = context.apply(m);
        for (section, e) in errors {
          context_errors.entry(section).or_default().push(e);
        }
        substituted
      })
    };
    let source = substitute(run.raw.source.as_ref());
    let target = substitute(run.raw.target.as_ref());
    run.pair = ManifestPair::new(source, target);

    if let Some(errors) = context_errors.get(CONFIG_SECTION) {
      for e in errors {
        warn!(error = %e, "unresolved placeholder in [config]");
      }
    }

    let diff = run.pair.diff();
    for spec in diff.all() {
      let key = spec.key();
      let record = run.records.entry(key.clone()).or_default();

      if let Some(errors) = context_errors.get(&spec.name) {
        for e in errors {
          warn!(feature = %key, error = %e, "context error");
          record.errors.push(FeatureActionError {
            key: key.clone(),
            phase: Phase::Resolve,
            message: format!("context error: {e}"),
          });
        }
        continue;
      }

      match self.registry.construct(spec) {
        Ok(handler) => {
          run.handlers.insert(key, handler);
        }
        Err(e) => {
          warn!(feature = %key, error = %e, "failed to resolve formula");
          record.errors.push(FeatureActionError {
            key: key.clone(),
            phase: Phase::Resolve,
            message: e.to_string(),
          });
        }
      }
    }

    debug!(handlers = run.handlers.len(), "resolved handlers");
    Ok(())
  }

  fn run_category(&self, run: &mut Run, phase: Phase, specs: &[FeatureSpec]) -> Result<(), EnvironmentError> {
    if !specs.is_empty() {
      info!(phase = %phase, features = specs.len(), "running phase");
    }
    for spec in specs {
      self.run_action(run, spec, phase)?;
    }
    Ok(())
  }

  fn run_action(&self, run: &mut Run, spec: &FeatureSpec, phase: Phase) -> Result<(), EnvironmentError> {
    let key = spec.key();
    let record = run.records.entry(key.clone()).or_default();

    if record.has_errors() && !phase.is_forced() {
      debug!(feature = %key, phase = %phase, "skipping feature with errors");
      return Ok(());
    }
    if !phase.is_forced()
      && let Some(config) = spec.config_for(phase.uses_target())
      && !config.runs_in(phase.as_str())
    {
      debug!(feature = %key, phase = %phase, "phase not enabled for feature");
      return Ok(());
    }
    let Some(handler) = run.handlers.get_mut(&key) else {
      return Ok(());
    };

    let mut ctx = FormulaContext {
      directory: &mut run.directory,
      injections: &mut run.injections,
      system: &self.system,
    };

    debug!(feature = %key, phase = %phase, "running action");
    let result = match phase {
      Phase::Setup => handler.setup(&mut ctx),
      Phase::Update => handler.update(&mut ctx),
      Phase::Destroy => handler.destroy(&mut ctx),
      Phase::Activate => handler.activate(&mut ctx),
      Phase::Deactivate => handler.deactivate(&mut ctx),
      Phase::Reload => handler.reload(&mut ctx),
      Phase::Prompt => handler.prompt(&mut ctx),
      Phase::Validate => Ok(handler.validate()),
      Phase::Resolve => Ok(Vec::new()),
    };

    let messages = result.map_err(|source| EnvironmentError::Formula {
      key: key.clone(),
      phase,
      source,
    })?;

    record.actions.push(phase);
    for message in messages {
      warn!(feature = %key, phase = %phase, error = %message, "feature reported an error");
      record.errors.push(FeatureActionError {
        key: key.clone(),
        phase,
        message,
      });
    }
    Ok(())
  }

  fn apply_hook(&self, run: &mut Run, hook: Hook) {
    let content = shell::source_if_present(run.directory.root_dir(), &run.directory.rc_path());
    for file in &self.options.shell_files {
      let path = self.options.home.join(file);
      match hook {
        Hook::Inject => run.injections.inject(&path, &content),
        Hook::Clear => run.injections.clear(&path),
        Hook::Keep => {}
      }
    }
  }

  /// Persist the manifest, write rc exports and commit injections.
  fn finalize(&self, run: &mut Run) -> Result<RunReport, EnvironmentError> {
    run.advance(RunState::Finalized)?;

    if run.directory.exists() {
      if let Some(manifest) = run.raw.target.as_ref().or(run.raw.source.as_ref()) {
        manifest.write(&run.directory.manifest_path())?;
      }

      if run.directory.rewrite_rc() {
        let exports = [
          shell::prepend_path("PATH", &run.directory.bin_path()),
          shell::prepend_path("LIBRARY_PATH", &run.directory.lib_path()),
          shell::prepend_path("C_INCLUDE_PATH", &run.directory.include_path()),
        ];
        for line in exports {
          run.directory.add_to_rc(&line)?;
        }
      }
    }

    run.injections.commit()?;

    let report = build_report(run);
    info!(
      namespace = %report.namespace,
      operation = %report.operation,
      errors = report.errors.len(),
      "operation finished"
    );
    Ok(report)
  }
}

/// Re-add the `rc` lines of every feature that stays installed.
///
/// The rc block is rebuilt on every run, and an updated feature may not have
/// written its line (phase filter, soft error). Lines are deduplicated.
fn keep_rc_lines<'a>(
  run: &mut Run,
  kept: impl IntoIterator<Item = &'a FeatureSpec>,
) -> Result<(), EnvironmentError> {
  if !run.directory.rewrite_rc() {
    return Ok(());
  }
  for spec in kept {
    let line = spec.target.as_ref().and_then(|c| c.get("rc")).map(str::trim);
    if let Some(line) = line.filter(|l| !l.is_empty()) {
      run.directory.add_to_rc(line)?;
    }
  }
  Ok(())
}

fn read_installed(directory: &Directory) -> Result<Option<Manifest>, EnvironmentError> {
  let path = directory.manifest_path();
  if !path.exists() {
    warn!(namespace = %directory.namespace(), "no installed manifest found");
    return Ok(None);
  }
  Ok(Some(Manifest::read(&path)?))
}

fn build_report(run: &Run) -> RunReport {
  let features = run
    .records
    .iter()
    .map(|(key, record)| FeatureOutcome {
      key: key.clone(),
      actions: record.actions.clone(),
      errors: record.errors.iter().map(|e| e.message.clone()).collect(),
    })
    .collect();
  let errors = run.records.values().flat_map(|r| r.errors.iter().cloned()).collect();

  RunReport {
    namespace: run.directory.namespace().to_string(),
    operation: run.operation,
    root_dir: run.directory.root_dir().to_path_buf(),
    features,
    errors,
  }
}
