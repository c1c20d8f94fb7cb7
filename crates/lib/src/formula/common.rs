//! Options shared by every built-in formula.

use tracing::debug;

use super::{FormulaContext, FormulaError};
use crate::manifest::FeatureConfig;

/// Add the feature's `rc` line to the environment rc file.
///
/// Skipped when the run does not rewrite the rc file.
pub(super) fn apply_rc(config: &FeatureConfig, ctx: &mut FormulaContext<'_>) -> Result<(), FormulaError> {
  let Some(line) = config.get("rc").map(str::trim).filter(|l| !l.is_empty()) else {
    return Ok(());
  };

  if !ctx.directory.rewrite_rc() {
    debug!(line = %line, "rc rewriting disabled, skipping rc line");
    return Ok(());
  }

  ctx.directory.add_to_rc(line)?;
  Ok(())
}

/// Value of `key`, or a soft error naming the missing option.
pub(super) fn require<'a>(feature: &str, config: &'a FeatureConfig, key: &str) -> Result<&'a str, String> {
  config
    .get(key)
    .filter(|v| !v.trim().is_empty())
    .ok_or_else(|| format!("{feature}: missing required option '{key}'"))
}
