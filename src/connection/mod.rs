//! Transport seam: every joint speaks to its connections through these two
//! traits, so the room logic never sees a socket.
mod test;

use crate::error::StreamError;
use crate::message::ClientEvent;
use crate::response::Response;
use async_trait::async_trait;

/// Outbound half of a connection.
#[async_trait]
pub trait SinkAdapter {
    async fn send(
        &mut self,
        response: Response,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Inbound half of a connection.
///
/// `Err(StreamError::Malformed)` leaves the connection usable; any other
/// error ends it.
#[async_trait]
pub trait StreamAdapter {
    async fn next(&mut self) -> Result<ClientEvent, StreamError>;
}

/// Decodes one text frame.
pub fn decode_frame(frame: &str) -> Result<ClientEvent, StreamError> {
    Ok(serde_json::from_str(frame)?)
}

/// Encodes one outbound event as a text frame.
pub fn encode_response(response: &Response) -> Result<String, serde_json::Error> {
    serde_json::to_string(response)
}
