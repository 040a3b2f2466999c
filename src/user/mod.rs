//! A participant of a room, keyed by the id of the connection that joined.
mod test;

use crate::utils::types::{ClientId, RoomId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceState {
    pub is_joined: bool,
    pub is_muted: bool,
}

impl VoiceState {
    pub fn joined() -> Self {
        VoiceState {
            is_joined: true,
            is_muted: false,
        }
    }
}

/// Each user has the connection id, the room it joined, a display name and,
/// once it touched voice chat, a voice state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: ClientId,
    pub name: String,
    pub room_id: RoomId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_state: Option<VoiceState>,
}

impl User {
    /// Creates a user, trimming the display name.
    pub fn new(id: ClientId, name: &str, room_id: RoomId) -> Self {
        User {
            id,
            name: name.trim().to_string(),
            room_id,
            voice_state: None,
        }
    }

    pub fn in_voice(&self) -> bool {
        self.voice_state.map(|v| v.is_joined).unwrap_or(false)
    }
}
