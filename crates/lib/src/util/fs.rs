//! Filesystem helpers.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Sibling path used while writing `path` atomically.
fn temp_path(path: &Path) -> PathBuf {
  let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
  path.with_file_name(format!(".{}.sprinter.tmp", file_name))
}

/// Write `content` to `path` by writing a temp file next to it and renaming
/// it into place. Parent directories are created as needed.
pub fn write_atomic(path: &Path, content: impl AsRef<[u8]>) -> io::Result<()> {
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    fs::create_dir_all(parent)?;
  }

  let temp = temp_path(path);
  fs::write(&temp, content)?;
  if let Err(e) = fs::rename(&temp, path) {
    let _ = fs::remove_file(&temp);
    return Err(e);
  }

  Ok(())
}

/// Read `path` to a string, treating a missing file as empty.
pub fn read_or_empty(path: &Path) -> io::Result<String> {
  match fs::read_to_string(path) {
    Ok(content) => Ok(content),
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
    Err(e) => Err(e),
  }
}

/// Mark `path` executable for everyone who can read it.
#[cfg(unix)]
pub fn make_executable(path: &Path) -> io::Result<()> {
  use std::os::unix::fs::PermissionsExt;

  let mut perms = fs::metadata(path)?.permissions();
  perms.set_mode(perms.mode() | 0o111);
  fs::set_permissions(path, perms)
}

#[cfg(not(unix))]
pub fn make_executable(_path: &Path) -> io::Result<()> {
  Ok(())
}
