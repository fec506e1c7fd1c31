//! Command-line interface module.

mod args;
pub mod classify;
pub mod serve;
pub mod transform;

pub use args::{Cli, Commands, DEFAULT_CONFIG};
