//! Declarative environment manifests.
//!
//! A manifest is a TOML document. The reserved `[config]` table holds
//! environment-level settings; every other table describes one feature and
//! names the formula that manages it:
//!
//! ```toml
//! [config]
//! namespace = "dev"
//!
//! [git]
//! formula = "package"
//! apt-get = "git"
//! brew = "git"
//! ```
//!
//! Values are kept as strings; booleans and numbers are stored in their
//! TOML string form and arrays of scalars are joined with `, `.

mod diff;
mod types;

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use indexmap::IndexMap;
use thiserror::Error;
use tracing::{debug, info};

use crate::consts::CONFIG_SECTION;
use crate::util::fs::write_atomic;

pub use diff::{FeatureDiff, FeatureKey, FeatureSpec, ManifestPair, compute_diff};
pub use types::FeatureConfig;
pub(crate) use types::is_truthy;

/// Errors raised while loading, parsing or writing manifests.
#[derive(Debug, Error)]
pub enum ManifestError {
  #[error("failed to parse manifest: {0}")]
  Parse(#[from] toml::de::Error),

  #[error("section [{section}] must be a table")]
  NotATable { section: String },

  #[error("unsupported value for {section}.{key}: {kind}")]
  InvalidValue {
    section: String,
    key: String,
    kind: &'static str,
  },

  #[error("feature [{feature}] does not name a formula")]
  MissingFormula { feature: String },

  #[error("invalid namespace {namespace:?}: use letters, digits, '-', '_' or '.'")]
  InvalidNamespace { namespace: String },

  #[error("failed to fetch manifest from {url}: {source}")]
  Fetch { url: String, source: reqwest::Error },

  #[error("failed to read manifest {}: {source}", path.display())]
  Read { path: PathBuf, source: io::Error },

  #[error("failed to write manifest {}: {source}", path.display())]
  Write { path: PathBuf, source: io::Error },

  #[error("failed to serialize manifest: {0}")]
  Serialize(#[from] toml::ser::Error),
}

/// Check that `namespace` can be used as a directory and block name.
pub fn validate_namespace(namespace: &str) -> Result<(), ManifestError> {
  let valid = !namespace.is_empty()
    && !namespace.starts_with('.')
    && namespace
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

  if valid {
    Ok(())
  } else {
    Err(ManifestError::InvalidNamespace {
      namespace: namespace.to_string(),
    })
  }
}

fn is_url(location: &str) -> bool {
  location.starts_with("http://") || location.starts_with("https://")
}

/// A parsed manifest: environment config plus features in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
  pub config: FeatureConfig,
  pub features: IndexMap<String, FeatureConfig>,
}

impl Manifest {
  pub fn new() -> Self {
    Self::default()
  }

  /// Load a manifest from a local path or an `http(s)` URL.
  ///
  /// `[config] source` is set to the location when absent (canonicalized
  /// for local files) so that later updates can re-fetch it, and
  /// `[config] namespace` defaults to the file stem.
  pub fn load(location: &str) -> Result<Self, ManifestError> {
    let (content, source) = if is_url(location) {
      debug!(url = %location, "fetching manifest");
      let content = reqwest::blocking::get(location)
        .and_then(|r| r.error_for_status())
        .and_then(|r| r.text())
        .map_err(|source| ManifestError::Fetch {
          url: location.to_string(),
          source,
        })?;
      (content, location.to_string())
    } else {
      let path = Path::new(location);
      let content = fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
      })?;
      let canonical = dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
      (content, canonical.display().to_string())
    };

    let mut manifest: Manifest = content.parse()?;
    if manifest.source().is_none() {
      manifest.set_source(&source);
    }
    if manifest.namespace().is_none()
      && let Some(stem) = stem_of(location)
    {
      manifest.set_namespace(&stem);
    }

    info!(location = %location, features = manifest.features.len(), "loaded manifest");
    Ok(manifest)
  }

  /// Read a manifest persisted by [`Manifest::write`].
  pub fn read(path: &Path) -> Result<Self, ManifestError> {
    let content = fs::read_to_string(path).map_err(|source| ManifestError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    content.parse()
  }

  /// Persist the manifest atomically.
  pub fn write(&self, path: &Path) -> Result<(), ManifestError> {
    let content = self.to_toml_string()?;
    write_atomic(path, content).map_err(|source| ManifestError::Write {
      path: path.to_path_buf(),
      source,
    })
  }

  pub fn to_toml_string(&self) -> Result<String, ManifestError> {
    let mut doc = toml::Table::new();
    if !self.config.is_empty() {
      doc.insert(CONFIG_SECTION.to_string(), toml::Value::Table(to_table(&self.config)));
    }
    for (name, config) in &self.features {
      doc.insert(name.clone(), toml::Value::Table(to_table(config)));
    }
    Ok(toml::to_string(&doc)?)
  }

  pub fn namespace(&self) -> Option<&str> {
    self.config.get("namespace").filter(|n| !n.is_empty())
  }

  pub fn set_namespace(&mut self, namespace: &str) {
    self.config.set("namespace", namespace);
  }

  /// Where this manifest was loaded from.
  pub fn source(&self) -> Option<&str> {
    self.config.get("source").filter(|s| !s.is_empty())
  }

  pub fn set_source(&mut self, source: &str) {
    self.config.set("source", source);
  }

  /// Feature names in document order.
  pub fn formula_sections(&self) -> impl Iterator<Item = &str> {
    self.features.keys().map(String::as_str)
  }

  pub fn get_feature_config(&self, name: &str) -> Option<&FeatureConfig> {
    self.features.get(name)
  }

  pub fn add_feature(&mut self, name: impl Into<String>, config: FeatureConfig) {
    self.features.insert(name.into(), config);
  }

  /// Whether `section.key` is truthy. `config` addresses the environment table.
  pub fn is_true(&self, section: &str, key: &str) -> bool {
    if section == CONFIG_SECTION {
      return self.config.is_true(key);
    }
    self.features.get(section).is_some_and(|c| c.is_true(key))
  }
}

impl FromStr for Manifest {
  type Err = ManifestError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let doc: toml::Table = toml::from_str(s)?;
    let mut manifest = Manifest::new();

    for (section, value) in doc {
      let toml::Value::Table(table) = value else {
        return Err(ManifestError::NotATable { section });
      };
      let config = from_table(&section, table)?;

      if section == CONFIG_SECTION {
        manifest.config = config;
      } else {
        if config.formula().is_none() {
          return Err(ManifestError::MissingFormula { feature: section });
        }
        manifest.features.insert(section, config);
      }
    }

    if let Some(namespace) = manifest.namespace() {
      validate_namespace(namespace)?;
    }
    Ok(manifest)
  }
}

impl fmt::Display for Manifest {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let content = self.to_toml_string().map_err(|_| fmt::Error)?;
    f.write_str(&content)
  }
}

fn scalar_string(value: &toml::Value) -> Option<String> {
  match value {
    toml::Value::String(s) => Some(s.clone()),
    toml::Value::Integer(i) => Some(i.to_string()),
    toml::Value::Float(x) => Some(x.to_string()),
    toml::Value::Boolean(b) => Some(b.to_string()),
    toml::Value::Datetime(d) => Some(d.to_string()),
    toml::Value::Array(_) | toml::Value::Table(_) => None,
  }
}

fn from_table(section: &str, table: toml::Table) -> Result<FeatureConfig, ManifestError> {
  let mut config = FeatureConfig::new();
  for (key, value) in table {
    let invalid = |kind| ManifestError::InvalidValue {
      section: section.to_string(),
      key: key.clone(),
      kind,
    };

    let text = match &value {
      toml::Value::Array(items) => items
        .iter()
        .map(|item| scalar_string(item).ok_or_else(|| invalid("nested array or table")))
        .collect::<Result<Vec<_>, _>>()?
        .join(", "),
      toml::Value::Table(_) => return Err(invalid("table")),
      scalar => scalar_string(scalar).unwrap_or_default(),
    };
    config.set(key, text);
  }
  Ok(config)
}

fn to_table(config: &FeatureConfig) -> toml::Table {
  config
    .iter()
    .map(|(k, v)| (k.to_string(), toml::Value::String(v.to_string())))
    .collect()
}

fn stem_of(location: &str) -> Option<String> {
  let last = location.trim_end_matches('/').rsplit(['/', '\\']).next()?;
  let last = last.split(['?', '#']).next().unwrap_or(last);
  let stem = Path::new(last).file_stem()?.to_string_lossy().into_owned();
  validate_namespace(&stem).ok().map(|_| stem)
}
