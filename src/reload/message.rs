//! Hot Update Message Protocol
//!
//! Defines the JSON message format for WebSocket communication between
//! the development server and the browser-side runtime.
//!
//! # Message Types
//!
//! - `update`: per-declaration classification for a changed module
//! - `invalidate`: the fast path cannot be used, reload the module
//! - `connected`: handshake, carries the server version
//! - `error` / `clear_error`: parse error overlay

use serde::{Deserialize, Serialize};

use crate::core::Classification;

/// Verdict for one declaration of an updated module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentUpdate {
    pub name: String,
    pub classification: Classification,
}

impl ComponentUpdate {
    pub fn new(name: impl Into<String>, classification: Classification) -> Self {
        Self {
            name: name.into(),
            classification,
        }
    }
}

/// Hot update message sent over WebSocket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HotMessage {
    /// A module changed and every declaration can take the fast path
    Update {
        /// Root-relative module id (e.g., "src/Counter.jsx")
        module: String,
        components: Vec<ComponentUpdate>,
    },

    /// The module must be fully reloaded
    Invalidate {
        module: String,
        /// Human-readable failure string
        reason: String,
    },

    /// Connection established
    Connected {
        /// Server version for compatibility check
        version: String,
    },

    /// Parse error (display overlay, keep the running code)
    Error {
        /// Source file path
        path: String,
        /// Error message
        error: String,
    },

    /// Clear error overlay (parse succeeded after error)
    #[serde(rename = "clear_error")]
    ClearError,
}

impl HotMessage {
    pub fn update(module: impl Into<String>, components: Vec<ComponentUpdate>) -> Self {
        Self::Update {
            module: module.into(),
            components,
        }
    }

    pub fn invalidate(module: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalidate {
            module: module.into(),
            reason: reason.into(),
        }
    }

    /// Create a connected message
    pub fn connected() -> Self {
        Self::Connected {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Create an error message (for parse errors)
    pub fn error(path: impl Into<String>, error: impl Into<String>) -> Self {
        Self::Error {
            path: path.into(),
            error: error.into(),
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"clear_error"}"#.to_string())
    }

    /// Parse from JSON string
    pub fn from_json(s: &str) -> Option<Self> {
        serde_json::from_str(s).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_message() {
        let msg = HotMessage::update(
            "src/Counter.jsx",
            vec![
                ComponentUpdate::new("Counter", Classification::RenderOnly),
                ComponentUpdate::new("Header", Classification::Structural),
            ],
        );

        let json = msg.to_json();
        assert!(json.contains(r#""type":"update""#));
        assert!(json.contains(r#""module":"src/Counter.jsx""#));
        assert!(json.contains(r#""classification":"render-only""#));

        assert_eq!(HotMessage::from_json(&json), Some(msg));
    }

    #[test]
    fn test_invalidate_message() {
        let msg = HotMessage::invalidate("src/App.jsx", "declaration `Header` was removed");
        let json = msg.to_json();
        assert!(json.contains(r#""type":"invalidate""#));
        assert!(json.contains(r#""reason":"declaration `Header` was removed""#));
    }

    #[test]
    fn test_unit_messages() {
        assert_eq!(HotMessage::ClearError.to_json(), r#"{"type":"clear_error"}"#);
        let connected = HotMessage::connected().to_json();
        assert!(connected.contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_from_json_rejects_unknown() {
        assert!(HotMessage::from_json(r#"{"type":"patch","ops":[]}"#).is_none());
        assert!(HotMessage::from_json("not json").is_none());
    }
}
