mod test;

use crate::user::User;
use crate::utils::types::{ClientId, RoomId};
use crate::video::{VideoInfo, VideoState};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Authoritative state of one room.
///
/// Users are keyed by connection id; ordering by id keeps snapshots stable.
#[derive(Debug, Clone)]
pub struct RoomState {
    pub id: RoomId,
    pub users: BTreeMap<ClientId, User>,
    pub video_state: VideoState,
    pub current_video: Option<VideoInfo>,
}

impl RoomState {
    pub fn new(id: RoomId) -> Self {
        RoomState {
            id,
            users: BTreeMap::new(),
            video_state: VideoState::default(),
            current_video: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn contains(&self, client_id: ClientId) -> bool {
        self.users.contains_key(&client_id)
    }

    pub fn member_ids(&self) -> Vec<ClientId> {
        self.users.keys().copied().collect()
    }

    pub fn member_ids_except(&self, client_id: ClientId) -> Vec<ClientId> {
        self.users
            .keys()
            .copied()
            .filter(|id| *id != client_id)
            .collect()
    }

    /// Users currently in voice chat, other than `client_id`.
    pub fn voice_peers_of(&self, client_id: ClientId) -> Vec<ClientId> {
        self.users
            .values()
            .filter(|u| u.id != client_id && u.in_voice())
            .map(|u| u.id)
            .collect()
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            users: self.users.values().cloned().collect(),
            video_state: self.video_state,
            current_video: self.current_video.clone(),
        }
    }
}

/// What a joining connection receives as `room-state`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub users: Vec<User>,
    pub video_state: VideoState,
    pub current_video: Option<VideoInfo>,
}
