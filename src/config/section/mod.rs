//! Configuration section definitions.
//!
//! Each module corresponds to a section in `hotpatch.toml`:
//!
//! | Module  | TOML Section | Purpose                                  |
//! |---------|--------------|------------------------------------------|
//! | `build` | `[build]`    | Mode, file gate, instrumentation options |
//! | `serve` | `[serve]`    | Development server and watch roots       |

mod build;
mod serve;

pub use build::{BuildConfig, is_identifier};
pub use serve::ServeConfig;
