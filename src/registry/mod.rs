//! The room registry: one `RoomState` per live room id, plus the index from
//! connection to the room it joined.

use crate::room::RoomState;
use crate::utils::random_room_id;
use crate::utils::types::{ClientId, RoomId};
use std::collections::HashMap;
use tracing::info;

#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<RoomId, RoomState>,
    sessions: HashMap<ClientId, RoomId>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        RoomRegistry::default()
    }

    /// Returns the room, creating an empty one on first use.
    ///
    /// Callers must pass a non-empty id.
    pub fn get_or_create_room(&mut self, room_id: &str) -> &mut RoomState {
        self.rooms.entry(room_id.to_string()).or_insert_with(|| {
            info!(room = room_id, "room created");
            RoomState::new(room_id.to_string())
        })
    }

    /// Drops the room if nobody is left in it. Returns whether it was removed.
    pub fn remove_room_if_empty(&mut self, room_id: &str) -> bool {
        match self.rooms.get(room_id) {
            Some(room) if room.is_empty() => {
                self.rooms.remove(room_id);
                info!(room = room_id, "room removed");
                true
            }
            _ => false,
        }
    }

    pub fn room(&self, room_id: &str) -> Option<&RoomState> {
        self.rooms.get(room_id)
    }

    pub fn room_mut(&mut self, room_id: &str) -> Option<&mut RoomState> {
        self.rooms.get_mut(room_id)
    }

    pub fn contains_room(&self, room_id: &str) -> bool {
        self.rooms.contains_key(room_id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Room the connection has joined, if any.
    pub fn room_of(&self, client_id: ClientId) -> Option<&RoomId> {
        self.sessions.get(&client_id)
    }

    pub fn bind_session(&mut self, client_id: ClientId, room_id: &str) {
        self.sessions.insert(client_id, room_id.to_string());
    }

    pub fn unbind_session(&mut self, client_id: ClientId) -> Option<RoomId> {
        self.sessions.remove(&client_id)
    }

    /// A random id that no live room uses.
    pub fn fresh_room_id(&self, len: usize) -> RoomId {
        loop {
            let id = random_room_id(len);
            if !self.rooms.contains_key(&id) {
                return id;
            }
        }
    }
}
