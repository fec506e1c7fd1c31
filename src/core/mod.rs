//! Core types - pure abstractions shared across the codebase.

mod category;
mod driver;
mod key;
mod kind;
mod state;

pub use category::SourceKind;
pub use driver::BuildMode;
pub use key::DeclarationKey;
pub use kind::{Classification, ComponentKind};
pub use state::{is_shutdown, register_shutdown, setup_shutdown_handler};
