//! The private root directory of one environment namespace.
//!
//! Layout:
//!
//! ```text
//! <sprinter_root>/<namespace>/
//!   bin/        symlinks to executables provided by features
//!   lib/        symlinks to libraries
//!   include/    headers
//!   opt/<feat>/ per-feature install directories
//!   manifest    the manifest that was last applied
//!   .rc         sourced by the user's shell when the namespace is active
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::consts::RC_HEADER;
use crate::injections::inject_content;
use crate::util::fs::{make_executable, read_or_empty, write_atomic};

/// Errors raised by [`Directory`] operations.
#[derive(Debug, Error)]
pub enum DirectoryError {
  #[error("environment root {} does not exist", path.display())]
  RootMissing { path: PathBuf },

  #[error("rc rewriting is disabled for namespace {namespace}")]
  RcRewriteDisabled { namespace: String },

  #[error("filesystem error at {}: {source}", path.display())]
  Io { path: PathBuf, source: io::Error },
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> DirectoryError + '_ {
  move |source| DirectoryError::Io {
    path: path.to_path_buf(),
    source,
  }
}

/// Manager for `<sprinter_root>/<namespace>`.
#[derive(Debug, Clone)]
pub struct Directory {
  namespace: String,
  root_dir: PathBuf,
  rewrite_rc: bool,
  new: bool,
  rc_lines: Vec<String>,
}

impl Directory {
  pub fn new(namespace: impl Into<String>, sprinter_root: &Path, rewrite_rc: bool) -> Self {
    let namespace = namespace.into();
    let root_dir = sprinter_root.join(&namespace);
    Self {
      namespace,
      root_dir,
      rewrite_rc,
      new: false,
      rc_lines: Vec::new(),
    }
  }

  /// Create the root and its subdirectories if absent.
  ///
  /// [`Directory::is_new`] reports whether this call created the root.
  /// Calling again on an existing root only resets that flag.
  pub fn initialize(&mut self) -> Result<(), DirectoryError> {
    self.new = !self.root_dir.exists();

    for dir in [self.bin_path(), self.lib_path(), self.include_path()] {
      fs::create_dir_all(&dir).map_err(io_err(&dir))?;
    }

    if self.new {
      info!(namespace = %self.namespace, root = %self.root_dir.display(), "created environment root");
    } else {
      debug!(namespace = %self.namespace, "environment root already exists");
    }
    Ok(())
  }

  /// Delete the whole root. A missing root is not an error.
  pub fn remove(&self) -> Result<(), DirectoryError> {
    match fs::remove_dir_all(&self.root_dir) {
      Ok(()) => {
        info!(namespace = %self.namespace, root = %self.root_dir.display(), "removed environment root");
        Ok(())
      }
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
      Err(e) => Err(io_err(&self.root_dir)(e)),
    }
  }

  /// Link `source` into `bin/<name>` and mark it executable.
  pub fn symlink_to_bin(&self, name: &str, source: &Path) -> Result<PathBuf, DirectoryError> {
    make_executable(source).map_err(io_err(source))?;
    let dest = self.bin_path().join(name);
    replace_symlink(source, &dest)?;
    Ok(dest)
  }

  /// Link `source` into `lib/<name>`.
  pub fn symlink_to_lib(&self, name: &str, source: &Path) -> Result<PathBuf, DirectoryError> {
    let dest = self.lib_path().join(name);
    replace_symlink(source, &dest)?;
    Ok(dest)
  }

  /// Remove `bin/<name>` if present.
  pub fn unlink_from_bin(&self, name: &str) -> Result<(), DirectoryError> {
    remove_entry(&self.bin_path().join(name))
  }

  /// Remove `lib/<name>` if present.
  pub fn unlink_from_lib(&self, name: &str) -> Result<(), DirectoryError> {
    remove_entry(&self.lib_path().join(name))
  }

  /// Add a line of shell content to the rc file.
  ///
  /// Lines accumulate for the lifetime of this manager and are written as a
  /// single named block after the rc header, so content injected into the rc
  /// file by other owners is kept. Adding the same line twice is a no-op.
  pub fn add_to_rc(&mut self, content: &str) -> Result<(), DirectoryError> {
    if !self.rewrite_rc {
      return Err(DirectoryError::RcRewriteDisabled {
        namespace: self.namespace.clone(),
      });
    }
    if !self.root_dir.exists() {
      return Err(DirectoryError::RootMissing {
        path: self.root_dir.clone(),
      });
    }

    if !self.rc_lines.iter().any(|line| line == content) {
      self.rc_lines.push(content.to_string());
    }

    let rc_path = self.rc_path();
    let existing = read_or_empty(&rc_path).map_err(io_err(&rc_path))?;
    let body = existing
      .strip_prefix(RC_HEADER)
      .map(|rest| rest.strip_prefix('\n').unwrap_or(rest))
      .unwrap_or(&existing);

    let block = inject_content(body, &self.rc_lines.join("\n"), &self.rc_block_name(), None);
    write_atomic(&rc_path, format!("{}\n{}", RC_HEADER, block)).map_err(io_err(&rc_path))?;

    debug!(namespace = %self.namespace, line = %content, "updated rc file");
    Ok(())
  }

  fn rc_block_name(&self) -> String {
    format!("SPRINTER_RC_{}", self.namespace)
  }

  pub fn namespace(&self) -> &str {
    &self.namespace
  }

  pub fn root_dir(&self) -> &Path {
    &self.root_dir
  }

  pub fn bin_path(&self) -> PathBuf {
    self.root_dir.join("bin")
  }

  pub fn lib_path(&self) -> PathBuf {
    self.root_dir.join("lib")
  }

  pub fn include_path(&self) -> PathBuf {
    self.root_dir.join("include")
  }

  pub fn manifest_path(&self) -> PathBuf {
    self.root_dir.join("manifest")
  }

  pub fn rc_path(&self) -> PathBuf {
    self.root_dir.join(".rc")
  }

  /// Where a feature keeps its own files.
  pub fn install_directory(&self, feature: &str) -> PathBuf {
    self.root_dir.join("opt").join(feature)
  }

  pub fn exists(&self) -> bool {
    self.root_dir.exists()
  }

  /// Whether the last [`Directory::initialize`] created the root.
  pub fn is_new(&self) -> bool {
    self.new
  }

  pub fn rewrite_rc(&self) -> bool {
    self.rewrite_rc
  }

  /// Lines added to the rc file through this manager.
  pub fn rc_lines(&self) -> &[String] {
    &self.rc_lines
  }
}

fn remove_entry(path: &Path) -> Result<(), DirectoryError> {
  let meta = match fs::symlink_metadata(path) {
    Ok(meta) => meta,
    Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
    Err(e) => return Err(io_err(path)(e)),
  };

  let result = if meta.is_dir() {
    fs::remove_dir_all(path)
  } else {
    fs::remove_file(path)
  };
  result.map_err(io_err(path))
}

fn replace_symlink(source: &Path, dest: &Path) -> Result<(), DirectoryError> {
  remove_entry(dest)?;
  if let Some(parent) = dest.parent() {
    fs::create_dir_all(parent).map_err(io_err(parent))?;
  }

  #[cfg(unix)]
  std::os::unix::fs::symlink(source, dest).map_err(io_err(dest))?;

  #[cfg(windows)]
  std::os::windows::fs::symlink_file(source, dest).map_err(io_err(dest))?;

  debug!(source = %source.display(), link = %dest.display(), "created symlink");
  Ok(())
}
