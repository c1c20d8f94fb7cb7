//! `%(name)s` substitution in manifest values.
//!
//! Before handlers are constructed, every manifest value is scanned for
//! placeholders naming entries of a flat context:
//!
//! - `%(<feature>:root_dir)s` - install directory of any feature in the run
//! - `%(config:node)s` - host name
//! - `%(config:namespace)s`, `%(config:root_dir)s` - the environment
//! - `%(config:<key>)s` - any `[config]` entry
//!
//! The trailing `s` is optional. `%%` produces a literal `%`, and a `%` not
//! followed by `(` passes through unchanged.
//!
//! # Example
//!
//! ```
//! use sprinter_lib::context::Context;
//!
//! let mut ctx = Context::new();
//! ctx.insert("config:node", "box");
//! assert_eq!(ctx.substitute("host=%(config:node)s 100%%").unwrap(), "host=box 100%");
//! ```

use indexmap::IndexMap;
use thiserror::Error;

use crate::directory::Directory;
use crate::manifest::{Manifest, ManifestPair};

/// Errors raised while substituting a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
  #[error("unclosed placeholder at position {0}")]
  Unclosed(usize),

  #[error("unresolved placeholder: %({0})")]
  Unresolved(String),
}

/// A segment of parsed text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
  Literal(String),
  Placeholder(String),
}

/// Split `input` into literal text and placeholder names.
pub fn parse(input: &str) -> Result<Vec<Segment>, ContextError> {
  let mut segments = Vec::new();
  let mut literal = String::new();
  let mut chars = input.char_indices().peekable();

  while let Some((pos, ch)) = chars.next() {
    if ch != '%' {
      literal.push(ch);
      continue;
    }

    match chars.peek() {
      Some((_, '%')) => {
        chars.next();
        literal.push('%');
      }
      Some((_, '(')) => {
        chars.next();
        if !literal.is_empty() {
          segments.push(Segment::Literal(std::mem::take(&mut literal)));
        }

        let mut name = String::new();
        let mut found_close = false;
        for (_, c) in chars.by_ref() {
          if c == ')' {
            found_close = true;
            break;
          }
          name.push(c);
        }
        if !found_close {
          return Err(ContextError::Unclosed(pos));
        }

        // Conversion character
        if let Some((_, 's')) = chars.peek() {
          chars.next();
        }
        segments.push(Segment::Placeholder(name.trim().to_string()));
      }
      _ => literal.push('%'),
    }
  }

  if !literal.is_empty() {
    segments.push(Segment::Literal(literal));
  }
  Ok(segments)
}

/// Flat name → value map placeholders resolve against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context(IndexMap<String, String>);

impl Context {
  pub fn new() -> Self {
    Self::default()
  }

  /// Context for one run over `pair` in `directory`.
  pub fn for_run(pair: &ManifestPair, directory: &Directory, node: &str) -> Self {
    let mut ctx = Self::new();

    for manifest in [pair.source.as_ref(), pair.target.as_ref()].into_iter().flatten() {
      for name in manifest.formula_sections() {
        let root = directory.install_directory(name);
        ctx.insert(format!("{name}:root_dir"), root.display().to_string());
      }
    }

    // Source config first so target values win.
    for manifest in [pair.source.as_ref(), pair.target.as_ref()].into_iter().flatten() {
      for (key, value) in manifest.config.iter() {
        ctx.insert(format!("config:{key}"), value);
      }
    }

    ctx.insert("config:node", node);
    ctx.insert("config:namespace", directory.namespace());
    ctx.insert("config:root_dir", directory.root_dir().display().to_string());
    ctx
  }

  pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
    self.0.insert(name.into(), value.into());
  }

  pub fn get(&self, name: &str) -> Option<&str> {
    self.0.get(name).map(String::as_str)
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  /// Replace every placeholder in `input`.
  pub fn substitute(&self, input: &str) -> Result<String, ContextError> {
    let mut out = String::with_capacity(input.len());
    for segment in parse(input)? {
      match segment {
        Segment::Literal(text) => out.push_str(&text),
        Segment::Placeholder(name) => {
          let value = self.get(&name).ok_or_else(|| ContextError::Unresolved(name.clone()))?;
          out.push_str(value);
        }
      }
    }
    Ok(out)
  }

  /// Substitute every value of `manifest`.
  ///
  /// A value that fails to substitute is left as written and the error is
  /// returned against its section name, so callers can fail that feature
  /// alone.
  pub fn apply(&self, manifest: &Manifest) -> (Manifest, Vec<(String, ContextError)>) {
    let mut result = manifest.clone();
    let mut errors = Vec::new();

    let sections = std::iter::once((crate::consts::CONFIG_SECTION, &mut result.config))
      .chain(result.features.iter_mut().map(|(name, config)| (name.as_str(), config)));

    for (section, config) in sections {
      for (_, value) in config.iter_mut() {
        match self.substitute(value.as_str()) {
          Ok(substituted) => *value = substituted,
          Err(e) => errors.push((section.to_string(), e)),
        }
      }
    }

    (result, errors)
  }
}
