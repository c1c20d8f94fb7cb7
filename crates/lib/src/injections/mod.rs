//! Named, idempotent blocks of text inside shared files.
//!
//! Several owners (the activation hook of each namespace, individual formulas)
//! write into the same shell files. Each owner's text lives between a pair of
//! marker lines carrying a unique name, so it can be replaced or removed
//! without touching user content or anybody else's block:
//!
//! ```text
//! export EDITOR=vim
//!
//! #SPRINTER_dev
//! [ -d "/home/u/.sprinter/dev" ] && . "/home/u/.sprinter/dev/.rc"
//! #SPRINTER_dev
//!
//! #SPRINTER_OVERRIDES
//! PS1='custom> '
//! #SPRINTER_OVERRIDES
//! ```
//!
//! An optional override region is owned by the user. New blocks are inserted
//! above it and the region itself is never rewritten.
//!
//! Changes are queued with [`Injections::inject`] / [`Injections::clear`]
//! and only touch the filesystem on [`Injections::commit`].

mod content;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::util::fs::{read_or_empty, write_atomic};

pub use content::{clear_content, contains_block, inject_content};

/// A queued change to one block of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectionAction {
  Inject(String),
  Clear,
}

/// A file that could not be written during [`Injections::commit`].
#[derive(Debug, Error)]
#[error("{}: {source}", path.display())]
pub struct InjectionFailure {
  pub path: PathBuf,
  #[source]
  pub source: io::Error,
}

/// Every file that failed during one commit. Files not listed were written.
#[derive(Debug, Error)]
#[error("failed to commit injections to {} file(s): {}", failures.len(), describe(failures))]
pub struct InjectionCommitError {
  pub failures: Vec<InjectionFailure>,
}

fn describe(failures: &[InjectionFailure]) -> String {
  failures.iter().map(|f| f.to_string()).collect::<Vec<_>>().join("; ")
}

/// Pending injections, keyed by target file.
#[derive(Debug, Clone)]
pub struct Injections {
  /// Block name used by [`Injections::inject`] and [`Injections::clear`].
  wrapper: String,
  override_marker: Option<String>,
  pending: IndexMap<PathBuf, Vec<(String, InjectionAction)>>,
}

impl Injections {
  pub fn new(wrapper: impl Into<String>) -> Self {
    Self {
      wrapper: wrapper.into(),
      override_marker: None,
      pending: IndexMap::new(),
    }
  }

  /// Keep the region delimited by `#<marker>` lines below every injected block.
  pub fn with_override(mut self, marker: impl Into<String>) -> Self {
    self.override_marker = Some(marker.into());
    self
  }

  pub fn wrapper(&self) -> &str {
    &self.wrapper
  }

  /// Queue injecting `content` as this engine's block into `path`.
  pub fn inject(&mut self, path: impl AsRef<Path>, content: &str) {
    let block = self.wrapper.clone();
    self.inject_block(path, &block, content);
  }

  /// Queue removing this engine's block from `path`.
  pub fn clear(&mut self, path: impl AsRef<Path>) {
    let block = self.wrapper.clone();
    self.clear_block(path, &block);
  }

  /// Queue injecting `content` under an explicit block name.
  pub fn inject_block(&mut self, path: impl AsRef<Path>, block: &str, content: &str) {
    self.queue(path.as_ref(), block, InjectionAction::Inject(content.to_string()));
  }

  /// Queue removing an explicitly named block.
  pub fn clear_block(&mut self, path: impl AsRef<Path>, block: &str) {
    self.queue(path.as_ref(), block, InjectionAction::Clear);
  }

  fn queue(&mut self, path: &Path, block: &str, action: InjectionAction) {
    debug!(path = %path.display(), block = %block, action = ?action, "queueing injection");
    self
      .pending
      .entry(path.to_path_buf())
      .or_default()
      .push((block.to_string(), action));
  }

  /// Files with queued changes, in the order they were first touched.
  pub fn pending_paths(&self) -> impl Iterator<Item = &Path> {
    self.pending.keys().map(PathBuf::as_path)
  }

  /// Queued changes for one file, in call order.
  pub fn pending_for(&self, path: impl AsRef<Path>) -> &[(String, InjectionAction)] {
    self.pending.get(path.as_ref()).map(Vec::as_slice).unwrap_or(&[])
  }

  pub fn is_empty(&self) -> bool {
    self.pending.is_empty()
  }

  /// Whether this engine's block is currently present in the file on disk.
  pub fn injected(&self, path: impl AsRef<Path>) -> bool {
    match fs::read_to_string(path.as_ref()) {
      Ok(content) => contains_block(&content, &self.wrapper),
      Err(_) => false,
    }
  }

  /// Merge `content` into `original` as this engine's block.
  pub fn inject_content(&self, original: &str, content: &str) -> String {
    inject_content(original, content, &self.wrapper, self.override_marker.as_deref())
  }

  /// Remove this engine's block from `original`.
  pub fn clear_content(&self, original: &str) -> String {
    clear_content(original, &self.wrapper)
  }

  /// Apply every queued change to disk.
  ///
  /// Each file is read once, transformed by its queued actions in call order
  /// and written back. A failure on one file does not stop the others; all
  /// failures are reported together. The queue is empty afterwards either way.
  pub fn commit(&mut self) -> Result<(), InjectionCommitError> {
    let pending = std::mem::take(&mut self.pending);
    let mut failures = Vec::new();

    for (path, actions) in pending {
      match self.commit_file(&path, &actions) {
        Ok(()) => info!(path = %path.display(), changes = actions.len(), "injections committed"),
        Err(source) => {
          warn!(path = %path.display(), error = %source, "failed to commit injections");
          failures.push(InjectionFailure { path, source });
        }
      }
    }

    if failures.is_empty() {
      Ok(())
    } else {
      Err(InjectionCommitError { failures })
    }
  }

  fn commit_file(&self, path: &Path, actions: &[(String, InjectionAction)]) -> io::Result<()> {
    // Write through symlinked dotfiles instead of replacing the link.
    let target = match fs::symlink_metadata(path) {
      Ok(meta) if meta.file_type().is_symlink() => dunce::canonicalize(path)?,
      _ => path.to_path_buf(),
    };

    let original = read_or_empty(&target)?;

    let mut content = original.clone();
    for (block, action) in actions {
      content = match action {
        InjectionAction::Inject(text) => inject_content(&content, text, block, self.override_marker.as_deref()),
        InjectionAction::Clear => clear_content(&content, block),
      };
    }

    if content == original && target.exists() {
      debug!(path = %target.display(), "file unchanged");
      return Ok(());
    }

    write_atomic(&target, content)?;
    Ok(())
  }
}
