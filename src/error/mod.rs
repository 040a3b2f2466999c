mod test;

use crate::utils::types::{ClientId, RoomId};
use thiserror::Error;

/// Failures raised while the hub processes a client event.
///
/// Only validation failures are reported back to the sender; everything else
/// describes a stale or misdirected event and is dropped after logging.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RoomError {
    #[error("display name must not be empty")]
    EmptyDisplayName,
    #[error("room id must not be empty")]
    EmptyRoomId,
    #[error("message text must not be empty")]
    EmptyMessage,
    #[error("reaction emoji must not be empty")]
    EmptyReaction,
    #[error("invalid video: {0}")]
    InvalidVideo(String),
    #[error("invalid playback state: {0}")]
    InvalidPlaybackState(String),
    #[error("client {0} is not in a room")]
    NotInRoom(ClientId),
    #[error("client {client} is not a member of room {room}")]
    RoomMismatch { client: ClientId, room: RoomId },
    #[error("peer {0} is not reachable from this room")]
    UnknownPeer(ClientId),
}

impl RoomError {
    /// True for errors the sender can fix and should hear about.
    pub fn is_client_facing(&self) -> bool {
        matches!(
            self,
            RoomError::EmptyDisplayName
                | RoomError::EmptyRoomId
                | RoomError::EmptyMessage
                | RoomError::EmptyReaction
                | RoomError::InvalidPlaybackState(_)
        )
    }
}

/// Failures raised while reading the next event off a connection.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("connection closed")]
    Closed,
    #[error("malformed frame: {0}")]
    Malformed(String),
    #[error("transport error: {0}")]
    Transport(String),
}

impl StreamError {
    /// Whether the connection can keep being read after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, StreamError::Malformed(_))
    }
}

impl From<serde_json::Error> for StreamError {
    fn from(e: serde_json::Error) -> Self {
        StreamError::Malformed(e.to_string())
    }
}
