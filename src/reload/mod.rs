//! Reload Module
//!
//! Dev-server side of hot updates.
//!
//! # Architecture
//!
//! ```text
//! FsActor -> HmrActor -> WsActor -> Browser
//!  (watch)   (classify)  (broadcast)
//! ```
//!
//! # Modules
//!
//! - `message` - Hot update message types (update, invalidate, error)
//! - `modules` - Per-module declaration cache and change verdicts
//! - `server` - WebSocket server for client connections

pub mod message;
pub mod modules;
pub mod server;
