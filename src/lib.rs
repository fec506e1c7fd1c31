//! Hotpatch - state-preserving hot module replacement for component UIs.
//!
//! - [`classify`]: render-only vs structural edits
//! - [`instrument`]: dev-mode source rewriting
//! - [`runtime`]: instance registry and reconciler
//! - [`actor`] / [`reload`]: the `serve` pipeline

pub mod actor;
pub mod classify;
pub mod cli;
pub mod config;
pub mod core;
pub mod instrument;
pub mod logger;
pub mod reload;
pub mod runtime;
pub mod utils;
