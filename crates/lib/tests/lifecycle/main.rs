//! Lifecycle scenarios driven through the public engine API.

mod common;

mod activation_tests;
mod remove_tests;
mod update_tests;
