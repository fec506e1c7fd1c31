//! File-type gate for component-bearing sources.

use std::path::Path;

/// Kind of component source file, determines parser dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// JavaScript with JSX (.jsx, .js, .mjs)
    Jsx,
    /// TypeScript with JSX (.tsx, .ts, .mts)
    Tsx,
}

impl SourceKind {
    /// Detect source kind from a file extension, ignoring the allow-list.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jsx" | "js" | "mjs" => Some(Self::Jsx),
            "tsx" | "ts" | "mts" => Some(Self::Tsx),
            _ => None,
        }
    }

    /// Detect source kind from a path, gated by the configured extensions.
    ///
    /// Returns `None` for everything that must pass through untouched.
    pub fn from_path<S: AsRef<str>>(path: &Path, allowed: &[S]) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if !allowed
            .iter()
            .any(|a| a.as_ref().trim_start_matches('.').eq_ignore_ascii_case(ext))
        {
            return None;
        }
        Self::from_extension(ext)
    }

    /// Display name for this source kind.
    pub fn name(self) -> &'static str {
        match self {
            Self::Jsx => "jsx",
            Self::Tsx => "tsx",
        }
    }

    #[inline]
    pub fn is_typescript(self) -> bool {
        matches!(self, Self::Tsx)
    }
}
