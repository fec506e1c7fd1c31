//! Actor Message Definitions
//!
//! Message types for inter-actor communication.
//!
//! ```text
//! FsActor --Changed/Removed--> HmrActor --Send--> WsActor
//! ```

use std::net::TcpStream;
use std::path::PathBuf;

use crate::reload::message::HotMessage;

// =============================================================================
// HmrActor Messages
// =============================================================================

/// Messages to HMR Actor
#[derive(Debug)]
pub enum HmrMsg {
    /// Component files created or modified
    Changed(Vec<PathBuf>),
    /// Component files deleted
    Removed(Vec<PathBuf>),
    /// `hotpatch.toml` changed
    ConfigChanged,
    /// Shutdown
    Shutdown,
}

// =============================================================================
// WsActor Messages
// =============================================================================

/// Messages to WebSocket Actor
#[derive(Debug)]
pub enum WsMsg {
    /// Broadcast a message to every client
    Send(HotMessage),
    /// Add client (handshake not yet performed)
    AddClient(TcpStream),
    /// Shutdown
    Shutdown,
}
