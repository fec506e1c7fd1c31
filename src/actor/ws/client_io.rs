use std::net::TcpStream;
use std::time::Duration;

use tungstenite::protocol::Message;

use crate::reload::message::HotMessage;

use super::{Clients, WsActor};

impl WsActor {
    /// Add a new client connection
    pub(super) fn add_client(&self, stream: TcpStream) {
        // Blocking during handshake, non-blocking afterwards for polling reads
        match tungstenite::accept(stream) {
            Ok(mut ws) => {
                let _ = ws.get_ref().set_nonblocking(true);

                let connected = HotMessage::connected();
                if let Err(e) = ws.send(Message::Text(connected.to_json().into())) {
                    crate::log!("ws"; "failed to send connected message: {}", e);
                    return;
                }

                if let Some(error) = &self.pending_error
                    && let Err(e) = ws.send(Message::Text(error.to_json().into()))
                {
                    crate::log!("ws"; "failed to send pending error: {}", e);
                }

                let mut clients = self.clients.lock();
                clients.push(ws);
                crate::debug!("ws"; "client connected (total: {})", clients.len());
            }
            Err(e) => {
                crate::log!("ws"; "handshake failed: {}", e);
            }
        }
    }

    /// Background thread draining client frames to notice disconnects.
    ///
    /// Clients never send anything the server acts on.
    pub(super) fn client_reader_loop(clients: Clients) {
        loop {
            std::thread::sleep(Duration::from_millis(100));
            if crate::core::is_shutdown() {
                break;
            }

            clients.lock().retain_mut(|ws| match ws.read() {
                Ok(Message::Close(_)) => false,
                Ok(_) => true,
                Err(tungstenite::Error::Io(ref e)) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    true
                }
                Err(_) => false,
            });
        }
    }
}
