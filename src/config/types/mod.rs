//! Configuration utility types.
//!
//! - `error`: `ConfigError`, `FieldPath` and validation diagnostics
//! - `handle`: global config handle with reload

mod error;
pub mod handle;

pub use error::{ConfigDiagnostics, ConfigError, FieldPath};
pub use handle::{cfg, init_config, reload_config};
