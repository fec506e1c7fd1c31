//! Actor System for Hot Updates
//!
//! Message-passing concurrency for `hotpatch serve`:
//!
//! ```text
//! FsActor --> HmrActor --> WsActor
//! (watch)    (classify)   (broadcast)
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Message types for inter-actor communication
//! - `fs` - File system watcher with debouncing
//! - `hmr` - Module cache and hot update verdicts
//! - `ws` - WebSocket broadcast
//! - `coordinator` - Wires up and runs actors

pub mod coordinator;
pub mod fs;
pub mod hmr;
pub mod messages;
pub mod ws;

pub use coordinator::Coordinator;
