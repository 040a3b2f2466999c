//! Client voice session: microphone, peer links and the local blocklist.
//!
//! The audio engine itself sits behind [`MediaBackend`]. Signaling payloads
//! it produces are opaque to this module and to the server.

use crate::message::{ClientEvent, ReturningSignalPayload, SendingSignalPayload};
use crate::response::{SignalAnswer, SignalOffer, VoicePeer};
use crate::utils::types::{ClientId, RoomId};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MediaError {
    #[error("microphone permission denied")]
    PermissionDenied,
    #[error("no audio device available: {0}")]
    Unavailable(String),
}

/// The local audio engine.
pub trait MediaBackend {
    fn acquire_microphone(&mut self) -> Result<(), MediaError>;
    fn release_microphone(&mut self);
    fn set_microphone_enabled(&mut self, enabled: bool);
    /// Starts a link to `peer` as the caller and returns the offer.
    fn create_offer(&mut self, peer: ClientId) -> Value;
    /// Accepts an offer from `peer` and returns the answer.
    fn accept_offer(&mut self, peer: ClientId, offer: &Value) -> Value;
    fn accept_answer(&mut self, peer: ClientId, answer: &Value);
    fn close_peer(&mut self, peer: ClientId);
    fn set_peer_audible(&mut self, peer: ClientId, audible: bool);
}

/// Users this viewer does not want to hear. Never leaves the client.
#[derive(Debug, Clone, Default)]
pub struct Blocklist {
    blocked: HashSet<ClientId>,
}

impl Blocklist {
    /// Returns false if the user was already blocked.
    pub fn block(&mut self, user: ClientId) -> bool {
        self.blocked.insert(user)
    }

    pub fn unblock(&mut self, user: ClientId) -> bool {
        self.blocked.remove(&user)
    }

    pub fn is_blocked(&self, user: ClientId) -> bool {
        self.blocked.contains(&user)
    }

    pub fn len(&self) -> usize {
        self.blocked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocked.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerLink {
    /// We sent an offer and wait for the answer.
    Calling,
    /// Both sides have exchanged signals.
    Connected,
}

pub struct VoiceSession<M: MediaBackend> {
    media: M,
    self_id: ClientId,
    room_id: RoomId,
    joined: bool,
    muted: bool,
    awaiting_roster: bool,
    peers: HashMap<ClientId, PeerLink>,
    blocklist: Blocklist,
}

impl<M: MediaBackend> VoiceSession<M> {
    pub fn new(media: M, self_id: ClientId, room_id: &str) -> Self {
        VoiceSession {
            media,
            self_id,
            room_id: room_id.to_string(),
            joined: false,
            muted: false,
            awaiting_roster: false,
            peers: HashMap::new(),
            blocklist: Blocklist::default(),
        }
    }

    pub fn is_joined(&self) -> bool {
        self.joined
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn peer(&self, id: ClientId) -> Option<PeerLink> {
        self.peers.get(&id).copied()
    }

    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    pub fn blocklist(&self) -> &Blocklist {
        &self.blocklist
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    /// Grabs the microphone and announces the join.
    ///
    /// A refused microphone leaves the session untouched.
    pub fn join(&mut self) -> Result<Option<ClientEvent>, MediaError> {
        if self.joined {
            return Ok(None);
        }
        self.media.acquire_microphone()?;
        self.joined = true;
        self.muted = false;
        self.awaiting_roster = true;
        Ok(Some(ClientEvent::join_voice_chat(&self.room_id)))
    }

    /// Calls everybody already in voice. Only the first roster after a join
    /// counts.
    pub fn on_roster(&mut self, users: &[VoicePeer]) -> Vec<ClientEvent> {
        if !self.joined || !self.awaiting_roster {
            debug!("ignoring unexpected voice roster");
            return Vec::new();
        }
        self.awaiting_roster = false;

        let self_id = self.self_id;
        let mut events = Vec::new();
        for peer in users.iter().map(|p| p.id).filter(|id| *id != self_id) {
            let signal = self.media.create_offer(peer);
            self.peers.insert(peer, PeerLink::Calling);
            self.media
                .set_peer_audible(peer, !self.blocklist.is_blocked(peer));
            events.push(ClientEvent::SendingSignal(SendingSignalPayload {
                user_to_signal: peer,
                caller_id: Some(self_id),
                signal,
            }));
        }
        events
    }

    /// Answers a newcomer's offer.
    pub fn on_offer(&mut self, offer: SignalOffer) -> Option<ClientEvent> {
        if !self.joined {
            debug!(caller = offer.caller_id, "offer while not in voice");
            return None;
        }
        let caller = offer.caller_id;
        let signal = self.media.accept_offer(caller, &offer.signal);
        self.peers.insert(caller, PeerLink::Connected);
        self.media
            .set_peer_audible(caller, !self.blocklist.is_blocked(caller));
        Some(ClientEvent::ReturningSignal(ReturningSignalPayload {
            signal,
            caller_id: caller,
        }))
    }

    /// Completes a link we initiated.
    pub fn on_answer(&mut self, answer: SignalAnswer) {
        match self.peers.get_mut(&answer.id) {
            Some(link) => {
                self.media.accept_answer(answer.id, &answer.signal);
                *link = PeerLink::Connected;
            }
            None => warn!(peer = answer.id, "answer from unknown peer"),
        }
    }

    pub fn on_peer_left(&mut self, user_id: ClientId) {
        if self.peers.remove(&user_id).is_some() {
            self.media.close_peer(user_id);
        }
    }

    /// Flips the local microphone and announces the new mute state.
    pub fn toggle_mute(&mut self) -> Option<ClientEvent> {
        if !self.joined {
            return None;
        }
        self.muted = !self.muted;
        self.media.set_microphone_enabled(!self.muted);
        Some(ClientEvent::voice_state_change(&self.room_id, self.muted))
    }

    pub fn leave(&mut self) -> Option<ClientEvent> {
        if !self.joined {
            return None;
        }
        self.close_all();
        Some(ClientEvent::leave_voice_chat(&self.room_id))
    }

    /// Local cleanup without telling the server, for when the room is gone.
    pub fn teardown(&mut self) {
        if self.joined {
            self.close_all();
        }
    }

    pub fn block(&mut self, user: ClientId) {
        if self.blocklist.block(user) && self.peers.contains_key(&user) {
            self.media.set_peer_audible(user, false);
        }
    }

    pub fn unblock(&mut self, user: ClientId) {
        if self.blocklist.unblock(user) && self.peers.contains_key(&user) {
            self.media.set_peer_audible(user, true);
        }
    }

    fn close_all(&mut self) {
        for (peer, _) in self.peers.drain() {
            self.media.close_peer(peer);
        }
        self.media.release_microphone();
        self.joined = false;
        self.muted = false;
        self.awaiting_roster = false;
    }
}
