mod common;

mod install_tests;
mod lifecycle_tests;
mod validate_tests;
