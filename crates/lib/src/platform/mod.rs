pub mod os;
pub mod paths;
pub mod shell;

use std::path::Path;

use os::{Distro, Os};
use tracing::debug;

/// Facts about the machine that formulas and manifest placeholders consult.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct System {
  pub os: Option<Os>,
  pub distro: Option<Distro>,
  /// Host name, exposed to manifests as `%(config:node)s`.
  pub node: String,
}

impl System {
  /// Detect the current system at runtime
  pub fn detect() -> Self {
    let os = Os::current();
    let distro = match os {
      Some(Os::Linux) => Distro::detect(Path::new("/etc")),
      _ => None,
    };
    let node = whoami::fallible::hostname().unwrap_or_else(|_| "localhost".to_string());
    debug!(os = ?os, distro = ?distro, node = %node, "detected system");
    Self { os, distro, node }
  }

  pub fn is_osx(&self) -> bool {
    self.os == Some(Os::MacOs)
  }

  pub fn is_debian_based(&self) -> bool {
    self.distro == Some(Distro::Debian)
  }

  pub fn is_fedora_based(&self) -> bool {
    self.distro == Some(Distro::Fedora)
  }
}
