use std::fmt;
use std::path::Path;

/// Operating system variants supported by sprinter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
  Linux,
  MacOs,
  Windows,
}

impl Os {
  /// Detect the current operating system at runtime
  pub fn current() -> Option<Self> {
    match std::env::consts::OS {
      "linux" => Some(Self::Linux),
      "macos" => Some(Self::MacOs),
      "windows" => Some(Self::Windows),
      _ => None,
    }
  }

  /// Returns the lowercase string identifier for this OS
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Linux => "linux",
      Self::MacOs => "darwin",
      Self::Windows => "windows",
    }
  }
}

impl fmt::Display for Os {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Linux distribution families, as far as package management is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Distro {
  Debian,
  Fedora,
}

impl Distro {
  /// Detect the distribution family from the release files under `etc`.
  pub fn detect(etc: &Path) -> Option<Self> {
    if etc.join("debian_version").exists() {
      return Some(Self::Debian);
    }
    if etc.join("fedora-release").exists() || etc.join("redhat-release").exists() {
      return Some(Self::Fedora);
    }
    None
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Debian => "debian",
      Self::Fedora => "fedora",
    }
  }
}

impl fmt::Display for Distro {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
