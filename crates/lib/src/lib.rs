//! sprinter-lib: Core types and logic for sprinter
//!
//! This crate manages per-user development environments:
//! - `Directory`: the private root of one environment namespace
//! - `Injections`: named, idempotent blocks inside shared shell files
//! - `Manifest`: the declarative description of an environment's features
//! - `Environment`: the lifecycle engine driving formulas from one state to another
//! - `Formula`: pluggable handlers that install, update and remove one feature

pub mod consts;
pub mod context;
pub mod directory;
pub mod environment;
pub mod formula;
pub mod injections;
pub mod manifest;
pub mod platform;
pub mod util;
