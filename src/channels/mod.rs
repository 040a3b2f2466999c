//! Ephemeral fan-out channels: chat, emoji reactions and the voice
//! signaling relay.
//!
//! Nothing sent through here is stored in the room. Signaling payloads are
//! opaque and forwarded untouched between two connections of the same room.

use crate::error::RoomError;
use crate::membership::update_voice_state;
use crate::message::{MessageDraft, ReactionDraft, ReturningSignalPayload, SendingSignalPayload};
use crate::registry::RoomRegistry;
use crate::response::{
    ClientResponse, Outgoing, Response, RoomResponse, SignalAnswer, SignalOffer, UserLeftVoice,
    VoicePeer, VoiceRoster,
};
use crate::user::{User, VoiceState};
use crate::utils::get_id;
use crate::utils::types::ClientId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A chat line as delivered to the room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: u64,
    pub user: User,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// A reaction as delivered to the room. Receivers derive their own display id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionBroadcast {
    pub emoji: String,
    pub user_id: ClientId,
}

/// Fans a chat message out to every member of the room, author included.
pub fn send_message(
    registry: &RoomRegistry,
    client_id: ClientId,
    room_id: &str,
    draft: MessageDraft,
) -> Result<Vec<Outgoing>, RoomError> {
    let text = draft.text.trim();
    if text.is_empty() {
        return Err(RoomError::EmptyMessage);
    }
    let Some(room) = registry.room(room_id) else {
        debug!(room = room_id, "message for a room that is gone");
        return Ok(Vec::new());
    };
    let Some(author) = room.users.get(&client_id) else {
        return Err(RoomError::NotInRoom(client_id));
    };

    let message = ChatMessage {
        id: get_id(),
        user: author.clone(),
        text: text.to_string(),
        timestamp: draft.timestamp.unwrap_or_else(Utc::now),
    };
    Ok(vec![RoomResponse::new(
        room_id,
        room.member_ids(),
        Response::NewMessage(message),
    )
    .into()])
}

/// Fans a reaction out to every member of the room.
///
/// The user id is always the sender's, whatever the draft claims.
pub fn send_reaction(
    registry: &RoomRegistry,
    client_id: ClientId,
    room_id: &str,
    draft: ReactionDraft,
) -> Result<Vec<Outgoing>, RoomError> {
    let emoji = draft.emoji.trim();
    if emoji.is_empty() {
        return Err(RoomError::EmptyReaction);
    }
    let Some(room) = registry.room(room_id) else {
        debug!(room = room_id, "reaction for a room that is gone");
        return Ok(Vec::new());
    };

    let reaction = ReactionBroadcast {
        emoji: emoji.to_string(),
        user_id: client_id,
    };
    Ok(vec![RoomResponse::new(
        room_id,
        room.member_ids(),
        Response::NewReaction(reaction),
    )
    .into()])
}

/// Puts the connection into voice chat.
///
/// The joiner gets the roster of peers it has to call, then the whole room
/// learns its new voice state. Calling again just resends the roster.
pub fn join_voice(registry: &mut RoomRegistry, client_id: ClientId) -> Vec<Outgoing> {
    let Some(room) = registry.room_of(client_id).and_then(|id| registry.room(id)) else {
        debug!(client = client_id, "voice join outside any room");
        return Vec::new();
    };
    let users = room
        .voice_peers_of(client_id)
        .into_iter()
        .map(|id| VoicePeer { id })
        .collect();

    let mut outgoing: Vec<Outgoing> = vec![ClientResponse::new(
        client_id,
        Response::AllVoiceUsers(VoiceRoster { users }),
    )
    .into()];
    outgoing.extend(update_voice_state(registry, client_id, VoiceState::joined()));
    outgoing
}

/// Takes the connection out of voice chat. No-op when it was not in voice.
pub fn leave_voice(registry: &mut RoomRegistry, client_id: ClientId) -> Vec<Outgoing> {
    let Some(room) = registry.room_of(client_id).and_then(|id| registry.room(id)) else {
        debug!(client = client_id, "voice leave outside any room");
        return Vec::new();
    };
    if !room.users.get(&client_id).is_some_and(User::in_voice) {
        debug!(client = client_id, "voice leave for a user not in voice");
        return Vec::new();
    }

    let mut outgoing = Vec::new();
    let others = room.member_ids_except(client_id);
    if !others.is_empty() {
        outgoing.push(
            RoomResponse::new(
                &room.id,
                others,
                Response::UserLeftVoice(UserLeftVoice { user_id: client_id }),
            )
            .into(),
        );
    }
    outgoing.extend(update_voice_state(
        registry,
        client_id,
        VoiceState::default(),
    ));
    outgoing
}

/// Records the mute flag of a voice participant.
pub fn set_muted(registry: &mut RoomRegistry, client_id: ClientId, is_muted: bool) -> Vec<Outgoing> {
    let current = registry
        .room_of(client_id)
        .and_then(|id| registry.room(id))
        .and_then(|room| room.users.get(&client_id))
        .and_then(|user| user.voice_state);
    match current {
        Some(state) if state.is_joined => update_voice_state(
            registry,
            client_id,
            VoiceState {
                is_joined: true,
                is_muted,
            },
        ),
        _ => {
            debug!(client = client_id, "mute change for a user not in voice");
            Vec::new()
        }
    }
}

/// Forwards a voice offer to `user_to_signal`, stamped with the real caller.
pub fn relay_offer(
    registry: &RoomRegistry,
    client_id: ClientId,
    payload: SendingSignalPayload,
) -> Result<Vec<Outgoing>, RoomError> {
    ensure_same_room(registry, client_id, payload.user_to_signal)?;
    Ok(vec![ClientResponse::new(
        payload.user_to_signal,
        Response::UserJoinedVoice(SignalOffer {
            signal: payload.signal,
            caller_id: client_id,
        }),
    )
    .into()])
}

/// Forwards a voice answer back to the connection that made the offer.
pub fn relay_answer(
    registry: &RoomRegistry,
    client_id: ClientId,
    payload: ReturningSignalPayload,
) -> Result<Vec<Outgoing>, RoomError> {
    ensure_same_room(registry, client_id, payload.caller_id)?;
    Ok(vec![ClientResponse::new(
        payload.caller_id,
        Response::ReceivingReturnedSignal(SignalAnswer {
            signal: payload.signal,
            id: client_id,
        }),
    )
    .into()])
}

fn ensure_same_room(
    registry: &RoomRegistry,
    client_id: ClientId,
    peer: ClientId,
) -> Result<(), RoomError> {
    let Some(room) = registry.room_of(client_id) else {
        return Err(RoomError::NotInRoom(client_id));
    };
    if peer == client_id || registry.room_of(peer) != Some(room) {
        return Err(RoomError::UnknownPeer(peer));
    }
    Ok(())
}
