//! Formula identifier → handler constructor.

use std::collections::HashMap;

use tracing::debug;

use super::{CommandFormula, Formula, FormulaResolutionError, PackageFormula, UnpackFormula};
use crate::manifest::FeatureSpec;

/// Builds a handler for one feature.
pub type Constructor = Box<dyn Fn(&FeatureSpec) -> Box<dyn Formula>>;

/// Fallback lookup for identifiers with no registered constructor.
pub trait FormulaResolver {
  fn resolve(&self, formula: &str) -> Option<Constructor>;
}

/// Registered formula constructors.
#[derive(Default)]
pub struct FormulaRegistry {
  constructors: HashMap<String, Constructor>,
  resolvers: Vec<Box<dyn FormulaResolver>>,
}

impl FormulaRegistry {
  /// A registry with nothing registered.
  pub fn empty() -> Self {
    Self::default()
  }

  /// A registry with the built-in `package`, `unpack` and `command` formulas.
  pub fn builtin() -> Self {
    let mut registry = Self::empty();
    registry.register("package", |spec| Box::new(PackageFormula::new(spec.clone())));
    registry.register("unpack", |spec| Box::new(UnpackFormula::new(spec.clone())));
    registry.register("command", |spec| Box::new(CommandFormula::new(spec.clone())));
    registry
  }

  /// Register (or replace) the constructor for `formula`.
  pub fn register<F>(&mut self, formula: &str, constructor: F)
  where
    F: Fn(&FeatureSpec) -> Box<dyn Formula> + 'static,
  {
    self.constructors.insert(formula.to_string(), Box::new(constructor));
  }

  pub fn with_resolver(mut self, resolver: impl FormulaResolver + 'static) -> Self {
    self.resolvers.push(Box::new(resolver));
    self
  }

  pub fn contains(&self, formula: &str) -> bool {
    self.constructors.contains_key(formula)
  }

  /// Construct a handler for `spec`.
  ///
  /// Unknown identifiers are offered to each resolver in turn; a resolved
  /// constructor is registered so it is only resolved once.
  pub fn construct(&mut self, spec: &FeatureSpec) -> Result<Box<dyn Formula>, FormulaResolutionError> {
    let key = spec.key();
    if key.formula.is_empty() {
      return Err(FormulaResolutionError::Missing(spec.name.clone()));
    }

    if !self.constructors.contains_key(&key.formula) {
      let resolved = self.resolvers.iter().find_map(|r| r.resolve(&key.formula));
      match resolved {
        Some(constructor) => {
          debug!(formula = %key.formula, "resolved formula");
          self.constructors.insert(key.formula.clone(), constructor);
        }
        None => return Err(FormulaResolutionError::Unknown(key.formula)),
      }
    }

    let constructor = self
      .constructors
      .get(&key.formula)
      .ok_or_else(|| FormulaResolutionError::Unknown(key.formula.clone()))?;
    Ok(constructor(spec))
  }
}
