//! Build mode: the process-wide development/production switch.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Environment variable overriding `build.mode` from `hotpatch.toml`.
pub const MODE_ENV: &str = "HOTPATCH_MODE";

/// Build mode configuration.
///
/// Production builds are never instrumented, which leaves the registry and
/// reconciler unreachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    #[default]
    Development,
    Production,
}

impl BuildMode {
    /// Check if this is development mode.
    #[inline]
    pub const fn is_dev(self) -> bool {
        matches!(self, Self::Development)
    }

    /// Read the mode override from `HOTPATCH_MODE`, if set and valid.
    pub fn from_env() -> Option<Self> {
        std::env::var(MODE_ENV).ok()?.parse().ok()
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

impl FromStr for BuildMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!("unknown build mode `{other}`")),
        }
    }
}
