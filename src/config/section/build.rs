//! `[build]` section configuration.
//!
//! Controls what gets instrumented and how.
//!
//! # Example
//!
//! ```toml
//! [build]
//! mode = "development"                 # development | production
//! extensions = ["jsx", "tsx"]          # component-bearing file types
//! state_constructors = ["signal", "state", "reactive", "ref"]
//! build_method = "render"              # build method of class components
//! runtime_module = "hotpatch/runtime"  # module the injected import points at
//! accept_footer = true                 # append the import.meta.hot glue
//! ```

use serde::{Deserialize, Serialize};

use crate::classify::DEFAULT_BUILD_METHOD;
use crate::config::{ConfigDiagnostics, FieldPath};
use crate::core::{BuildMode, SourceKind};
use crate::instrument::{DEFAULT_RUNTIME_MODULE, DEFAULT_STATE_CONSTRUCTORS};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Development instruments sources, production leaves them untouched.
    pub mode: BuildMode,

    /// File extensions routed through the instrumentor.
    pub extensions: Vec<String>,

    /// Callee names whose first argument is a preserved initial state.
    pub state_constructors: Vec<String>,

    /// Method holding the view of class-shaped components.
    pub build_method: String,

    /// Module specifier of the runtime the injected code imports.
    pub runtime_module: String,

    /// Append the module accept glue to instrumented files.
    pub accept_footer: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            mode: BuildMode::Development,
            extensions: vec!["jsx".into(), "tsx".into()],
            state_constructors: DEFAULT_STATE_CONSTRUCTORS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            build_method: DEFAULT_BUILD_METHOD.into(),
            runtime_module: DEFAULT_RUNTIME_MODULE.into(),
            accept_footer: true,
        }
    }
}

impl BuildConfig {
    pub const EXTENSIONS: FieldPath = FieldPath::new("build.extensions");
    pub const STATE_CONSTRUCTORS: FieldPath = FieldPath::new("build.state_constructors");
    pub const BUILD_METHOD: FieldPath = FieldPath::new("build.build_method");
    pub const RUNTIME_MODULE: FieldPath = FieldPath::new("build.runtime_module");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.extensions.is_empty() {
            diag.error_with_hint(
                Self::EXTENSIONS,
                "no file types selected",
                "use e.g. [\"jsx\", \"tsx\"]",
            );
        }
        for ext in &self.extensions {
            if SourceKind::from_extension(ext.trim_start_matches('.')).is_none() {
                diag.error_with_hint(
                    Self::EXTENSIONS,
                    format!("`{ext}` is not a JavaScript or TypeScript extension"),
                    "supported: jsx, js, mjs, tsx, ts, mts",
                );
            }
        }

        if self.state_constructors.is_empty() {
            diag.error(Self::STATE_CONSTRUCTORS, "at least one state constructor is required");
        }
        for name in &self.state_constructors {
            if !is_identifier(name) {
                diag.error(
                    Self::STATE_CONSTRUCTORS,
                    format!("`{name}` is not a valid identifier"),
                );
            }
        }

        if !is_identifier(&self.build_method) {
            diag.error(
                Self::BUILD_METHOD,
                format!("`{}` is not a valid identifier", self.build_method),
            );
        }

        if self.runtime_module.trim().is_empty() {
            diag.error(Self::RUNTIME_MODULE, "runtime module must not be empty");
        }
    }
}

/// JavaScript identifier check (ASCII subset plus any non-ASCII letter).
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}
