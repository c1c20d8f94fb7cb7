//! `unpack`: download a tarball into the feature's install directory and
//! link an executable from it into `bin/`.
//!
//! ```toml
//! [ruby]
//! formula = "unpack"
//! url = "https://example.com/ruby-3.3.tar.gz"
//! type = "tar.gz"
//! executable = "ruby-3.3/bin/ruby"
//! symlink = "ruby"
//! sha256 = "..."
//! ```
//!
//! `url` may also be a local path or a `file://` URL. `sha256`, when given,
//! must match the downloaded archive.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use sha2::{Digest, Sha256};
use tar::Archive;
use tracing::{debug, info};

use super::common::{apply_rc, require};
use super::{ActionResult, Formula, FormulaContext, FormulaError};
use crate::manifest::{FeatureConfig, FeatureSpec};

const SUPPORTED_TYPES: &[&str] = &["tar.gz", "tgz"];

/// Keys whose change requires unpacking again.
const ARCHIVE_KEYS: &[&str] = &["url", "type", "executable", "symlink", "sha256"];

pub struct UnpackFormula {
  spec: FeatureSpec,
}

impl UnpackFormula {
  pub fn new(spec: FeatureSpec) -> Self {
    Self { spec }
  }

  fn target(&self) -> Result<&FeatureConfig, FormulaError> {
    self
      .spec
      .target
      .as_ref()
      .ok_or_else(|| FormulaError::Failed(format!("{}: no target configuration", self.spec.name)))
  }

  fn unpack(&self, config: &FeatureConfig, ctx: &mut FormulaContext<'_>) -> ActionResult {
    let name = &self.spec.name;
    let url = match require(name, config, "url") {
      Ok(url) => url,
      Err(e) => return Ok(vec![e]),
    };
    let kind = config.get("type").unwrap_or("tar.gz");
    if !SUPPORTED_TYPES.contains(&kind) {
      return Ok(vec![format!("{name}: unsupported archive type '{kind}'")]);
    }

    info!(feature = %name, url = %url, "downloading archive");
    let bytes = match download(url) {
      Ok(bytes) => bytes,
      Err(e) => return Ok(vec![format!("{name}: failed to download {url}: {e}")]),
    };

    if let Some(expected) = config.get("sha256") {
      let actual = hex::encode(Sha256::digest(&bytes));
      if !actual.eq_ignore_ascii_case(expected.trim()) {
        return Ok(vec![format!("{name}: sha256 mismatch for {url}: expected {expected}, got {actual}")]);
      }
    }

    let install_dir = ctx.directory.install_directory(name);
    if install_dir.exists() {
      fs::remove_dir_all(&install_dir).map_err(|source| FormulaError::Io {
        path: install_dir.clone(),
        source,
      })?;
    }
    fs::create_dir_all(&install_dir).map_err(|source| FormulaError::Io {
      path: install_dir.clone(),
      source,
    })?;

    if let Err(e) = Archive::new(GzDecoder::new(bytes.as_slice())).unpack(&install_dir) {
      return Ok(vec![format!("{name}: failed to extract {url}: {e}")]);
    }
    debug!(feature = %name, dir = %install_dir.display(), "extracted archive");

    if let Some(executable) = config.get("executable") {
      let source = install_dir.join(executable);
      if !source.exists() {
        return Ok(vec![format!("{name}: executable {executable} not found in archive")]);
      }
      ctx.directory.symlink_to_bin(&link_name(config, executable), &source)?;
    }

    Ok(Vec::new())
  }

  fn remove(&self, config: &FeatureConfig, ctx: &mut FormulaContext<'_>) -> Result<(), FormulaError> {
    if let Some(executable) = config.get("executable") {
      ctx.directory.unlink_from_bin(&link_name(config, executable))?;
    }

    let install_dir = ctx.directory.install_directory(&self.spec.name);
    match fs::remove_dir_all(&install_dir) {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
      Err(source) => Err(FormulaError::Io {
        path: install_dir,
        source,
      }),
    }
  }
}

impl Formula for UnpackFormula {
  fn spec(&self) -> &FeatureSpec {
    &self.spec
  }

  fn setup(&mut self, ctx: &mut FormulaContext<'_>) -> ActionResult {
    let target = self.target()?.clone();
    let errors = self.unpack(&target, ctx)?;
    apply_rc(&target, ctx)?;
    Ok(errors)
  }

  fn update(&mut self, ctx: &mut FormulaContext<'_>) -> ActionResult {
    let target = self.target()?.clone();
    let changed = match &self.spec.source {
      Some(source) => ARCHIVE_KEYS.iter().any(|k| source.get(k) != target.get(k)),
      None => true,
    };

    let errors = if changed {
      if let Some(source) = self.spec.source.clone() {
        self.remove(&source, ctx)?;
      }
      self.unpack(&target, ctx)?
    } else {
      Vec::new()
    };
    apply_rc(&target, ctx)?;
    Ok(errors)
  }

  fn destroy(&mut self, ctx: &mut FormulaContext<'_>) -> ActionResult {
    if let Some(source) = self.spec.source.clone() {
      self.remove(&source, ctx)?;
    }
    Ok(Vec::new())
  }

  fn validate(&self) -> Vec<String> {
    let Some(target) = self.spec.target.as_ref() else {
      return Vec::new();
    };
    let mut errors = Vec::new();
    if let Err(e) = require(&self.spec.name, target, "url") {
      errors.push(e);
    }
    if let Some(kind) = target.get("type")
      && !SUPPORTED_TYPES.contains(&kind)
    {
      errors.push(format!("{}: unsupported archive type '{kind}'", self.spec.name));
    }
    errors
  }
}

fn link_name(config: &FeatureConfig, executable: &str) -> String {
  config.get("symlink").map(str::to_string).unwrap_or_else(|| {
    Path::new(executable)
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_else(|| executable.to_string())
  })
}

/// Fetch `url` over http(s), or read it from disk.
fn download(url: &str) -> Result<Vec<u8>, String> {
  if url.starts_with("http://") || url.starts_with("https://") {
    let response = reqwest::blocking::get(url).map_err(|e| e.to_string())?;
    if !response.status().is_success() {
      return Err(format!("HTTP {}", response.status()));
    }
    return response.bytes().map(|b| b.to_vec()).map_err(|e| e.to_string());
  }

  let path = PathBuf::from(url.strip_prefix("file://").unwrap_or(url));
  fs::read(&path).map_err(|e| e.to_string())
}
