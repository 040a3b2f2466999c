//! Native WebSocket client for a watchroom server.

use crate::message::ClientEvent;
use crate::response::Response;
use crate::utils::types::ClientId;
use anyhow::{anyhow, Result};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::mpsc::{self, Receiver};
use tokio::sync::Mutex;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};
use tungstenite::protocol::Message;

type WSStream = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;
type WSSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// Decodes a server text frame.
pub fn decode_response(frame: &str) -> Result<Response> {
    serde_json::from_str(frame).map_err(|e| anyhow!("Failed to parse event: {}", e))
}

pub struct RoomClient {
    pub client_id: Option<ClientId>,
    sink: Option<Arc<Mutex<WSSink>>>,
    stream: Option<WSStream>,
}

impl Default for RoomClient {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomClient {
    pub fn new() -> Self {
        RoomClient {
            client_id: None,
            sink: None,
            stream: None,
        }
    }

    /// Opens the socket and waits for the server to name this connection.
    pub async fn connect(&mut self, addr: &str) -> Result<ClientId> {
        let (ws_stream, _) = connect_async(addr).await?;
        let (sink, stream) = ws_stream.split();
        self.sink = Some(Arc::new(Mutex::new(sink)));
        self.stream = Some(stream);

        match self.next_event().await? {
            Some(Response::Connected(id)) => {
                self.client_id = Some(id);
                Ok(id)
            }
            Some(other) => Err(anyhow!("Expected connected event, got {:?}", other)),
            None => Err(anyhow!("Connection closed before handshake")),
        }
    }

    /// Next server event, `None` once the server closed the socket.
    pub async fn next_event(&mut self) -> Result<Option<Response>> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| anyhow!("WebSocket stream is not initialized"))?;
        while let Some(message) = stream.next().await {
            match message? {
                Message::Text(text) => return decode_response(text.as_str()).map(Some),
                Message::Close(_) => return Ok(None),
                _ => continue,
            }
        }
        Ok(None)
    }

    /// Hands the read half to a background task and returns its events.
    ///
    /// Undecodable frames are logged and skipped.
    pub fn listen(&mut self, buffer_size: usize) -> Result<Receiver<Response>> {
        let mut stream = self
            .stream
            .take()
            .ok_or_else(|| anyhow!("WebSocket stream is not initialized"))?;
        let (tx, rx) = mpsc::channel(buffer_size);

        tokio::spawn(async move {
            while let Some(message) = stream.next().await {
                match message {
                    Ok(Message::Text(text)) => match decode_response(text.as_str()) {
                        Ok(response) => {
                            if tx.send(response).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => warn!(error = %e, "skipping server frame"),
                    },
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!(error = %e, "WebSocket error");
                        break;
                    }
                }
            }
            debug!("listener stopped");
        });

        Ok(rx)
    }

    pub async fn send_event(&self, event: &ClientEvent) -> Result<()> {
        let json = serde_json::to_string(event)?;
        let sink = self
            .sink
            .as_ref()
            .ok_or_else(|| anyhow!("WebSocket sink is not initialized"))?;
        sink.lock().await.send(Message::Text(json.into())).await?;
        Ok(())
    }

    pub async fn join_room(&self, room_id: &str, name: &str) -> Result<()> {
        self.send_event(&ClientEvent::join_room(room_id, name)).await
    }

    pub async fn leave_room(&self, room_id: &str) -> Result<()> {
        self.send_event(&ClientEvent::leave_room(room_id)).await
    }

    pub async fn send_message(&self, room_id: &str, text: &str) -> Result<()> {
        self.send_event(&ClientEvent::send_message(room_id, text)).await
    }

    pub async fn close(&self) -> Result<()> {
        if let Some(sink) = &self.sink {
            sink.lock().await.close().await?;
        }
        Ok(())
    }
}
