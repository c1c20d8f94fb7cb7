//! POSIX shell snippets written into rc and profile files.

use std::path::Path;

/// Generate a prepend statement for a PATH-like variable
pub fn prepend_path(name: &str, value: &Path) -> String {
  format!("export {}={:?}:${}", name, value.display().to_string(), name)
}

/// Generate the activation hook that sources an environment's rc file while its root exists.
pub fn source_if_present(root: &Path, rc: &Path) -> String {
  format!(
    "[ -d {:?} ] && . {:?}",
    root.display().to_string(),
    rc.display().to_string()
  )
}
