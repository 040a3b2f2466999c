//! This module contains the `ClientEvent` enum, every event a connection can send.

use crate::utils::types::{ClientId, Receivable, RoomId};
use crate::video::{PartialVideoState, RawVideoInfo};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Debug;

/// Event sent by a connection to the server.
///
/// Encoded as `{"event": "<kebab-case name>", "data": {...}}` with camelCase
/// payload fields.
///
/// # examples
///
/// ```rust
/// use watchroom::message::ClientEvent;
///
/// let event = ClientEvent::join_room("movie-night", "alice");
///
/// let json = serde_json::to_string(&event).unwrap();
/// assert!(json.contains("\"event\":\"join-room\""));
///
/// let deserialized: ClientEvent = serde_json::from_str(&json).unwrap();
/// assert_eq!(deserialized.room_id(), Some("movie-night"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// Join a room by id, creating it if needed (triggers room-state and user-joined)
    JoinRoom(JoinRoomPayload),
    /// Leave the current room (triggers user-left)
    LeaveRoom(RoomScoped),
    /// Submit a playback change (triggers player-state-update)
    PlayerStateChange(PlayerStateChangePayload),
    /// Switch the room's video (triggers video-changed)
    ChangeVideo(ChangeVideoPayload),
    SendMessage(SendMessagePayload),
    SendReaction(SendReactionPayload),
    JoinVoiceChat(RoomScoped),
    LeaveVoiceChat(RoomScoped),
    /// Offer from a voice joiner to one existing voice participant
    SendingSignal(SendingSignalPayload),
    /// Answer from the existing participant back to the joiner
    ReturningSignal(ReturningSignalPayload),
    VoiceStateChange(VoiceStateChangePayload),
}

impl Receivable for ClientEvent {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoiningUser {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomPayload {
    pub room_id: RoomId,
    pub user: JoiningUser,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomScoped {
    pub room_id: RoomId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStateChangePayload {
    pub room_id: RoomId,
    pub state: PartialVideoState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeVideoPayload {
    pub room_id: RoomId,
    pub video: RawVideoInfo,
}

/// Chat text as typed. The server attaches the author and an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDraft {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessagePayload {
    pub room_id: RoomId,
    pub message: MessageDraft,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionDraft {
    pub emoji: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<ClientId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendReactionPayload {
    pub room_id: RoomId,
    pub reaction: ReactionDraft,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendingSignalPayload {
    pub user_to_signal: ClientId,
    /// Ignored by the server, which stamps the real sender instead.
    #[serde(rename = "callerID", default, skip_serializing_if = "Option::is_none")]
    pub caller_id: Option<ClientId>,
    pub signal: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturningSignalPayload {
    pub signal: Value,
    /// The connection that sent the original offer.
    #[serde(rename = "callerID")]
    pub caller_id: ClientId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceStateChangePayload {
    pub room_id: RoomId,
    pub is_muted: bool,
}

impl ClientEvent {
    pub fn join_room(room_id: &str, name: &str) -> Self {
        ClientEvent::JoinRoom(JoinRoomPayload {
            room_id: room_id.to_string(),
            user: JoiningUser {
                name: name.to_string(),
            },
        })
    }

    pub fn leave_room(room_id: &str) -> Self {
        ClientEvent::LeaveRoom(RoomScoped {
            room_id: room_id.to_string(),
        })
    }

    pub fn player_state_change(room_id: &str, state: PartialVideoState) -> Self {
        ClientEvent::PlayerStateChange(PlayerStateChangePayload {
            room_id: room_id.to_string(),
            state,
        })
    }

    pub fn change_video(room_id: &str, video: RawVideoInfo) -> Self {
        ClientEvent::ChangeVideo(ChangeVideoPayload {
            room_id: room_id.to_string(),
            video,
        })
    }

    pub fn send_message(room_id: &str, text: &str) -> Self {
        ClientEvent::SendMessage(SendMessagePayload {
            room_id: room_id.to_string(),
            message: MessageDraft {
                text: text.to_string(),
                timestamp: Some(Utc::now()),
            },
        })
    }

    pub fn send_reaction(room_id: &str, emoji: &str, user_id: Option<ClientId>) -> Self {
        ClientEvent::SendReaction(SendReactionPayload {
            room_id: room_id.to_string(),
            reaction: ReactionDraft {
                emoji: emoji.to_string(),
                user_id,
            },
        })
    }

    pub fn join_voice_chat(room_id: &str) -> Self {
        ClientEvent::JoinVoiceChat(RoomScoped {
            room_id: room_id.to_string(),
        })
    }

    pub fn leave_voice_chat(room_id: &str) -> Self {
        ClientEvent::LeaveVoiceChat(RoomScoped {
            room_id: room_id.to_string(),
        })
    }

    pub fn voice_state_change(room_id: &str, is_muted: bool) -> Self {
        ClientEvent::VoiceStateChange(VoiceStateChangePayload {
            room_id: room_id.to_string(),
            is_muted,
        })
    }

    /// Room the event claims to target. Signaling events are routed by peer.
    pub fn room_id(&self) -> Option<&str> {
        match self {
            ClientEvent::JoinRoom(p) => Some(&p.room_id),
            ClientEvent::LeaveRoom(p)
            | ClientEvent::JoinVoiceChat(p)
            | ClientEvent::LeaveVoiceChat(p) => Some(&p.room_id),
            ClientEvent::PlayerStateChange(p) => Some(&p.room_id),
            ClientEvent::ChangeVideo(p) => Some(&p.room_id),
            ClientEvent::SendMessage(p) => Some(&p.room_id),
            ClientEvent::SendReaction(p) => Some(&p.room_id),
            ClientEvent::VoiceStateChange(p) => Some(&p.room_id),
            ClientEvent::SendingSignal(_) | ClientEvent::ReturningSignal(_) => None,
        }
    }

    /// Wire name, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::JoinRoom(_) => "join-room",
            ClientEvent::LeaveRoom(_) => "leave-room",
            ClientEvent::PlayerStateChange(_) => "player-state-change",
            ClientEvent::ChangeVideo(_) => "change-video",
            ClientEvent::SendMessage(_) => "send-message",
            ClientEvent::SendReaction(_) => "send-reaction",
            ClientEvent::JoinVoiceChat(_) => "join-voice-chat",
            ClientEvent::LeaveVoiceChat(_) => "leave-voice-chat",
            ClientEvent::SendingSignal(_) => "sending-signal",
            ClientEvent::ReturningSignal(_) => "returning-signal",
            ClientEvent::VoiceStateChange(_) => "voice-state-change",
        }
    }
}
