//! Source Instrumentor
//!
//! Rewrites component sources in development mode so that every mounted
//! instance registers itself with the runtime and keeps its state across
//! hot updates.
//!
//! For each component declaration the following is injected:
//!
//! 1. `const __hmr_node = __hmr.current();` at the top of the body
//! 2. `__hmr.register(__hmr_node, "Name", import.meta.url);` right after it
//! 3. every recognized state constructor's initializer wrapped as
//!    `__hmr.restore(__hmr_node, "count", () => (init))`
//! 4. after the last state declaration, a microtask publishing live getters
//!    on `__hmr_node.$state`
//!
//! plus one namespace import of the runtime module and, optionally, the
//! `import.meta.hot` accept footer. All of it is expressed as insertions at
//! byte offsets of the original text, so user code is never re-printed.

mod edit;
mod inject;
mod scan;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::BuildConfig;
use crate::core::{BuildMode, ComponentKind, DeclarationKey, SourceKind};
use edit::Insertions;

/// Default names of the state constructors whose initializers are preserved.
pub const DEFAULT_STATE_CONSTRUCTORS: &[&str] = &["signal", "state", "reactive", "ref"];

/// Default module specifier the injected import points at.
pub const DEFAULT_RUNTIME_MODULE: &str = "hotpatch/runtime";

/// Errors raised while instrumenting a file.
#[derive(Debug, Error)]
pub enum InstrumentError {
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("not a component source: {0}")]
    Unsupported(PathBuf),
}

/// Settings driving the instrumentor.
#[derive(Debug, Clone)]
pub struct InstrumentOptions {
    pub mode: BuildMode,
    pub extensions: Vec<String>,
    pub state_constructors: Vec<String>,
    pub build_method: String,
    pub runtime_module: String,
    pub accept_footer: bool,
}

impl Default for InstrumentOptions {
    fn default() -> Self {
        Self {
            mode: BuildMode::Development,
            extensions: vec!["jsx".into(), "tsx".into()],
            state_constructors: DEFAULT_STATE_CONSTRUCTORS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            build_method: crate::classify::DEFAULT_BUILD_METHOD.into(),
            runtime_module: DEFAULT_RUNTIME_MODULE.into(),
            accept_footer: true,
        }
    }
}

impl From<&BuildConfig> for InstrumentOptions {
    fn from(build: &BuildConfig) -> Self {
        Self {
            mode: build.mode,
            extensions: build.extensions.clone(),
            state_constructors: build.state_constructors.clone(),
            build_method: build.build_method.clone(),
            runtime_module: build.runtime_module.clone(),
            accept_footer: build.accept_footer,
        }
    }
}

impl InstrumentOptions {
    fn is_state_constructor(&self, name: &str) -> bool {
        self.state_constructors.iter().any(|c| c == name)
    }
}

/// How a component declaration is exported from its module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    None,
    Named,
    Default,
}

/// A component declaration found in a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentInfo {
    pub name: String,
    pub kind: ComponentKind,
    pub export: ExportKind,
    /// Declaration source text, as handed to the classifier.
    pub source: String,
    /// Names of tracked state variables, in declaration order.
    pub state: Vec<String>,
}

impl ComponentInfo {
    /// Registry key of this declaration inside `module`.
    pub fn key(&self, module: &str) -> DeclarationKey {
        DeclarationKey::new(module, &self.name)
    }
}

/// Result of [`instrument`].
#[derive(Debug, Clone)]
pub struct Instrumented {
    pub code: String,
    pub components: Vec<ComponentInfo>,
    /// Whether any code was injected.
    pub injected: bool,
}

impl Instrumented {
    fn untouched(source: &str, components: Vec<ComponentInfo>) -> Self {
        Self {
            code: source.to_string(),
            components,
            injected: false,
        }
    }
}

/// Find component declarations without rewriting anything.
pub fn scan(
    source: &str,
    path: &Path,
    options: &InstrumentOptions,
) -> Result<Vec<ComponentInfo>, InstrumentError> {
    let kind = SourceKind::from_path(path, &options.extensions)
        .ok_or_else(|| InstrumentError::Unsupported(path.to_path_buf()))?;
    let analysis = scan::analyze(source, path, kind, options)?;
    Ok(analysis.into_infos())
}

/// Instrument a component source file.
///
/// Files outside the extension gate, and every file in production mode,
/// come back unchanged.
pub fn instrument(
    source: &str,
    path: &Path,
    options: &InstrumentOptions,
) -> Result<Instrumented, InstrumentError> {
    if !options.mode.is_dev() {
        return Ok(Instrumented::untouched(source, Vec::new()));
    }
    let Some(kind) = SourceKind::from_path(path, &options.extensions) else {
        return Ok(Instrumented::untouched(source, Vec::new()));
    };

    let analysis = scan::analyze(source, path, kind, options)?;
    if analysis.components.is_empty() {
        return Ok(Instrumented::untouched(source, Vec::new()));
    }

    let mut edits = Insertions::new();
    if !analysis.has_runtime_import {
        edits.insert(
            analysis.import_at,
            inject::import(&options.runtime_module, analysis.import_at > 0),
        );
    }
    for component in &analysis.components {
        inject::component(&mut edits, component);
    }
    if options.accept_footer {
        edits.insert(source.len() as u32, inject::accept_footer());
    }

    crate::debug!(
        "instrument";
        "{}: {} component(s), {} insertion(s)",
        path.display(),
        analysis.components.len(),
        edits.len()
    );

    let code = edits.apply(source);
    Ok(Instrumented {
        code,
        components: analysis.into_infos(),
        injected: true,
    })
}

#[cfg(test)]
mod tests;
