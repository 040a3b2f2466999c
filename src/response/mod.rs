
use crate::channels::{ChatMessage, ReactionBroadcast};
use crate::room::RoomSnapshot;
use crate::user::{User, VoiceState};
use crate::utils::types::{Broadcastable, ClientId, RoomId};
use crate::video::{VideoInfo, VideoState};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Debug;

/// Event pushed by the server to a connection.
///
/// Encoded like [`ClientEvent`](crate::message::ClientEvent):
/// `{"event": "<kebab-case name>", "data": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum Response {
    /// First event on every connection: the id it is known by
    Connected(ClientId),
    /// Full snapshot, sent to a connection right after it joins
    RoomState(RoomSnapshot),
    UserJoined(User),
    UserLeft(ClientId),
    /// Merged authoritative playback state
    PlayerStateUpdate(VideoState),
    VideoChanged(VideoInfo),
    NewMessage(ChatMessage),
    NewReaction(ReactionBroadcast),
    /// Voice participants the joiner has to call, sent once
    AllVoiceUsers(VoiceRoster),
    UserJoinedVoice(SignalOffer),
    ReceivingReturnedSignal(SignalAnswer),
    UserVoiceStateUpdated(VoiceStateUpdate),
    UserLeftVoice(UserLeftVoice),
    /// Validation failure, only ever sent to the offending connection
    ClientError(String),
}

impl Broadcastable for Response {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoicePeer {
    pub id: ClientId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceRoster {
    pub users: Vec<VoicePeer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalOffer {
    pub signal: Value,
    #[serde(rename = "callerID")]
    pub caller_id: ClientId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalAnswer {
    pub signal: Value,
    /// The connection that answered.
    pub id: ClientId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceStateUpdate {
    pub user_id: ClientId,
    pub voice_state: VoiceState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserLeftVoice {
    pub user_id: ClientId,
}

/// A response addressed to members of one room.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomResponse {
    pub room: RoomId,
    pub recipients: Vec<ClientId>,
    pub response: Response,
}

impl RoomResponse {
    pub fn new(room: &str, recipients: Vec<ClientId>, response: Response) -> Self {
        RoomResponse {
            room: room.to_string(),
            recipients,
            response,
        }
    }

    pub fn user_joined(room: &str, recipients: Vec<ClientId>, user: User) -> Self {
        Self::new(room, recipients, Response::UserJoined(user))
    }

    pub fn user_left(room: &str, recipients: Vec<ClientId>, client: ClientId) -> Self {
        Self::new(room, recipients, Response::UserLeft(client))
    }

    pub fn player_state_update(room: &str, recipients: Vec<ClientId>, state: VideoState) -> Self {
        Self::new(room, recipients, Response::PlayerStateUpdate(state))
    }

    pub fn video_changed(room: &str, recipients: Vec<ClientId>, video: VideoInfo) -> Self {
        Self::new(room, recipients, Response::VideoChanged(video))
    }
}

/// A response addressed to a single connection.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientResponse {
    pub client: ClientId,
    pub response: Response,
}

impl ClientResponse {
    pub fn new(client: ClientId, response: Response) -> Self {
        ClientResponse { client, response }
    }

    pub fn room_state(client: ClientId, snapshot: RoomSnapshot) -> Self {
        Self::new(client, Response::RoomState(snapshot))
    }

    pub fn client_error(client: ClientId, message: String) -> Self {
        Self::new(client, Response::ClientError(message))
    }
}

/// Everything the hub wants delivered after handling one event.
#[derive(Debug, Clone, PartialEq)]
pub enum Outgoing {
    Room(RoomResponse),
    Client(ClientResponse),
}

impl Outgoing {
    pub fn recipients(&self) -> Vec<ClientId> {
        match self {
            Outgoing::Room(r) => r.recipients.clone(),
            Outgoing::Client(c) => vec![c.client],
        }
    }

    pub fn response(&self) -> &Response {
        match self {
            Outgoing::Room(r) => &r.response,
            Outgoing::Client(c) => &c.response,
        }
    }

    /// Room scope of the delivery, `None` for direct messages.
    pub fn room(&self) -> Option<&str> {
        match self {
            Outgoing::Room(r) => Some(&r.room),
            Outgoing::Client(_) => None,
        }
    }
}

impl From<RoomResponse> for Outgoing {
    fn from(r: RoomResponse) -> Self {
        Outgoing::Room(r)
    }
}

impl From<ClientResponse> for Outgoing {
    fn from(c: ClientResponse) -> Self {
        Outgoing::Client(c)
    }
}
