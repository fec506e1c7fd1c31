//! Component shapes and change classification tags.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Shape of a component declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    /// `function Counter() { ... }` or `const Counter = () => ...`
    Function,
    /// `class Counter extends Component { render() { ... } }`
    Class,
}

impl ComponentKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Class => "class",
        }
    }
}

impl FromStr for ComponentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "function" | "fn" => Ok(Self::Function),
            "class" => Ok(Self::Class),
            other => Err(format!("unknown component kind `{other}`")),
        }
    }
}

/// Outcome of comparing two versions of a declaration.
///
/// `RenderOnly` permits a soft update that keeps state; anything the
/// classifier cannot prove to be view-only is `Structural`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Classification {
    RenderOnly,
    Structural,
}

impl Classification {
    #[inline]
    pub fn is_render_only(self) -> bool {
        matches!(self, Self::RenderOnly)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::RenderOnly => "render-only",
            Self::Structural => "structural",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
