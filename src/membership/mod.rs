//! Join, leave and voice-state bookkeeping.
//!
//! Every operation returns the deliveries it produced; nothing here talks to
//! a connection directly. Leaving is idempotent because a disconnect can race
//! an explicit `leave-room`.

use crate::error::RoomError;
use crate::registry::RoomRegistry;
use crate::response::{
    ClientResponse, Outgoing, Response, RoomResponse, UserLeftVoice, VoiceStateUpdate,
};
use crate::user::{User, VoiceState};
use crate::utils::types::ClientId;
use tracing::{debug, info};

/// Adds the connection to `room_id` under `name`.
///
/// The joiner gets a full snapshot; everybody else gets `user-joined`. A
/// connection already in another room leaves it first. Joining the room it
/// is already in only resends the snapshot.
pub fn join(
    registry: &mut RoomRegistry,
    client_id: ClientId,
    room_id: &str,
    name: &str,
) -> Result<Vec<Outgoing>, RoomError> {
    if room_id.trim().is_empty() {
        return Err(RoomError::EmptyRoomId);
    }
    if name.trim().is_empty() {
        return Err(RoomError::EmptyDisplayName);
    }

    let mut outgoing = Vec::new();
    let current = registry.room_of(client_id).cloned();
    match current.as_deref() {
        Some(current) if current == room_id => {
            if let Some(room) = registry.room(room_id) {
                outgoing.push(ClientResponse::room_state(client_id, room.snapshot()).into());
            }
            return Ok(outgoing);
        }
        Some(_) => outgoing.extend(leave(registry, client_id)),
        None => {}
    }

    let user = User::new(client_id, name, room_id.to_string());
    let room = registry.get_or_create_room(room_id);
    room.users.insert(client_id, user.clone());
    let others = room.member_ids_except(client_id);
    let snapshot = room.snapshot();
    registry.bind_session(client_id, room_id);

    info!(room = room_id, client = client_id, name = %user.name, "user joined");
    outgoing.push(ClientResponse::room_state(client_id, snapshot).into());
    if !others.is_empty() {
        outgoing.push(RoomResponse::user_joined(room_id, others, user).into());
    }
    Ok(outgoing)
}

/// Removes the connection from its room, dropping the room once empty.
///
/// Unknown or already-departed connections are a no-op.
pub fn leave(registry: &mut RoomRegistry, client_id: ClientId) -> Vec<Outgoing> {
    let Some(room_id) = registry.unbind_session(client_id) else {
        debug!(client = client_id, "leave for a connection outside any room");
        return Vec::new();
    };
    let Some(room) = registry.room_mut(&room_id) else {
        debug!(room = %room_id, client = client_id, "leave for a room that is gone");
        return Vec::new();
    };
    let Some(user) = room.users.remove(&client_id) else {
        return Vec::new();
    };

    let remaining = room.member_ids();
    let mut outgoing = Vec::new();
    if !remaining.is_empty() {
        if user.in_voice() {
            outgoing.push(
                RoomResponse::new(
                    &room_id,
                    remaining.clone(),
                    Response::UserLeftVoice(UserLeftVoice { user_id: client_id }),
                )
                .into(),
            );
        }
        outgoing.push(RoomResponse::user_left(&room_id, remaining, client_id).into());
    }

    info!(room = %room_id, client = client_id, "user left");
    registry.remove_room_if_empty(&room_id);
    outgoing
}

/// Replaces the voice state of a user and tells the whole room about it.
///
/// No-op when the user is gone.
pub fn update_voice_state(
    registry: &mut RoomRegistry,
    client_id: ClientId,
    voice_state: VoiceState,
) -> Vec<Outgoing> {
    let Some(room_id) = registry.room_of(client_id).cloned() else {
        debug!(client = client_id, "voice state update outside any room");
        return Vec::new();
    };
    let Some(room) = registry.room_mut(&room_id) else {
        return Vec::new();
    };
    let Some(user) = room.users.get_mut(&client_id) else {
        return Vec::new();
    };
    user.voice_state = Some(voice_state);

    vec![RoomResponse::new(
        &room_id,
        room.member_ids(),
        Response::UserVoiceStateUpdated(VoiceStateUpdate {
            user_id: client_id,
            voice_state,
        }),
    )
    .into()]
}

/// Checks that `client_id` is a member of `room_id`.
pub fn require_member(
    registry: &RoomRegistry,
    client_id: ClientId,
    room_id: &str,
) -> Result<(), RoomError> {
    match registry.room_of(client_id) {
        None => Err(RoomError::NotInRoom(client_id)),
        Some(current) if current != room_id => Err(RoomError::RoomMismatch {
            client: client_id,
            room: room_id.to_string(),
        }),
        Some(_) => Ok(()),
    }
}
