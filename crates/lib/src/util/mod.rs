//! Shared utilities.
//!
//! Atomic file writes and cross-platform shell invocation used by the
//! directory manager, the injection engine and the built-in formulas.

pub mod fs;
pub mod process;
