//! WebSocket Actor - Hot Update Broadcast
//!
//! This actor is responsible for:
//! - Performing the WebSocket handshake for new clients
//! - Broadcasting hot update messages to all connected clients
//! - Replaying the current error overlay to late joiners
//!
//! # Architecture
//!
//! ```text
//! HmrActor --[update/invalidate/error]--> WsActor --[broadcast]--> Clients
//! ```

mod client_io;
mod delivery;

use std::net::TcpStream;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tungstenite::WebSocket;

use super::messages::WsMsg;
use crate::reload::message::HotMessage;

type Clients = Arc<Mutex<Vec<WebSocket<TcpStream>>>>;

/// WebSocket Actor - manages client connections and broadcasts
pub struct WsActor {
    /// Channel to receive messages
    rx: mpsc::Receiver<WsMsg>,
    /// Connected clients (shared for broadcast + read threads)
    clients: Clients,
    /// Error overlay replayed to new clients
    pending_error: Option<HotMessage>,
}

impl WsActor {
    /// Create a new WsActor
    pub fn new(rx: mpsc::Receiver<WsMsg>) -> Self {
        Self {
            rx,
            clients: Arc::new(Mutex::new(Vec::new())),
            pending_error: None,
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        let clients_for_reader = Arc::clone(&self.clients);
        std::thread::spawn(move || {
            Self::client_reader_loop(clients_for_reader);
        });

        while let Some(msg) = self.rx.recv().await {
            match msg {
                WsMsg::Send(message) => {
                    self.remember_error(&message);
                    crate::debug!("ws"; "sending {}", message.to_json());
                    self.broadcast(&message);
                }

                WsMsg::AddClient(stream) => {
                    self.add_client(stream);
                }

                WsMsg::Shutdown => {
                    crate::debug!("ws"; "shutting down");
                    let mut clients = self.clients.lock();
                    for mut ws in clients.drain(..) {
                        let _ = ws.close(None);
                    }
                    break;
                }
            }
        }
    }

    /// Track the overlay state new clients should start with.
    fn remember_error(&mut self, message: &HotMessage) {
        match message {
            HotMessage::Error { .. } => self.pending_error = Some(message.clone()),
            HotMessage::ClearError => self.pending_error = None,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_error_tracks_overlay() {
        let (_tx, rx) = mpsc::channel(1);
        let mut actor = WsActor::new(rx);

        let error = HotMessage::error("src/App.jsx", "Unexpected token");
        actor.remember_error(&error);
        assert_eq!(actor.pending_error, Some(error));

        actor.remember_error(&HotMessage::update("src/App.jsx", Vec::new()));
        assert!(actor.pending_error.is_some());

        actor.remember_error(&HotMessage::ClearError);
        assert!(actor.pending_error.is_none());
    }
}
