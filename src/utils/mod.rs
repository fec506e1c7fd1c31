//! Small shared helpers.
//!
//! - [`hash`]: content hashing for change detection
//! - [`path`]: path normalization and module ids

pub mod hash;
pub mod path;
