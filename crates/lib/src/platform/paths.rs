use std::path::PathBuf;

use crate::consts::{DEFAULT_ROOT_DIRNAME, ROOT_ENV};

/// Returns the user's home directory
///
/// `HOME` wins over the platform lookup so tests and wrappers can redirect it.
pub fn home_dir() -> PathBuf {
  std::env::var_os("HOME")
    .filter(|home| !home.is_empty())
    .map(PathBuf::from)
    .or_else(dirs::home_dir)
    .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns the directory holding every environment root.
///
/// `SPRINTER_ROOT` overrides the default of `~/.sprinter`.
pub fn sprinter_root() -> PathBuf {
  if let Some(path) = std::env::var_os(ROOT_ENV).filter(|p| !p.is_empty()) {
    return PathBuf::from(path);
  }

  home_dir().join(DEFAULT_ROOT_DIRNAME)
}
