//! Client side of the protocol.
//!
//! [`RoomView`] mirrors one room from the events the server pushes and turns
//! local intent into [`ClientEvent`]s. Playback goes through the
//! [`Reconciler`](reconciler::Reconciler); voice through
//! [`VoiceSession`](voice::VoiceSession).
pub mod joint_client;
pub mod reconciler;
pub mod voice;

use crate::channels::ChatMessage;
use crate::config::SyncConfig;
use crate::message::ClientEvent;
use crate::response::Response;
use crate::user::User;
use crate::utils::types::{ClientId, RoomId};
use crate::video::{parse_video_url, PartialVideoState, RawVideoInfo, VideoInfo};
use chrono::Utc;
use reconciler::{LocalPlayback, PlayerCommand, Reconciler};
use std::time::Duration;
use tokio::time::Instant;

/// How long a reaction stays on screen.
pub const REACTION_TTL: Duration = Duration::from_secs(3);

/// A reaction currently on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveReaction {
    /// `userId-receiptMillis`, unique enough to key the animation.
    pub id: String,
    pub emoji: String,
    pub user_id: ClientId,
    pub expires_at: Instant,
}

pub struct RoomView {
    room_id: RoomId,
    self_id: Option<ClientId>,
    users: Vec<User>,
    messages: Vec<ChatMessage>,
    reactions: Vec<LiveReaction>,
    current_video: Option<VideoInfo>,
    last_error: Option<String>,
    reconciler: Reconciler,
}

impl RoomView {
    pub fn new(room_id: &str, config: &SyncConfig) -> Self {
        RoomView {
            room_id: room_id.to_string(),
            self_id: None,
            users: Vec::new(),
            messages: Vec::new(),
            reactions: Vec::new(),
            current_video: None,
            last_error: None,
            reconciler: Reconciler::new(config),
        }
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// This viewer, once the snapshot listed it.
    pub fn current_user(&self) -> Option<&User> {
        let id = self.self_id?;
        self.users.iter().find(|u| u.id == id)
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn reactions(&self) -> &[LiveReaction] {
        &self.reactions
    }

    pub fn current_video(&self) -> Option<&VideoInfo> {
        self.current_video.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Folds one server event into the view and returns what the local
    /// player must do. Voice signaling is left to the voice session.
    pub fn apply(&mut self, response: Response, local: LocalPlayback) -> Vec<PlayerCommand> {
        match response {
            Response::Connected(id) => self.self_id = Some(id),
            Response::RoomState(snapshot) => {
                self.users = snapshot.users;
                self.current_video = snapshot.current_video;
                return self.reconciler.apply_authoritative(snapshot.video_state, local);
            }
            Response::UserJoined(user) => {
                self.users.retain(|u| u.id != user.id);
                self.users.push(user);
            }
            Response::UserLeft(id) => self.users.retain(|u| u.id != id),
            Response::PlayerStateUpdate(state) => {
                return self.reconciler.apply_authoritative(state, local);
            }
            Response::VideoChanged(video) => {
                self.current_video = Some(video);
                return self.reconciler.apply_video_change(local);
            }
            Response::NewMessage(message) => self.messages.push(message),
            Response::NewReaction(reaction) => {
                let received = Utc::now().timestamp_millis();
                self.reactions.push(LiveReaction {
                    id: format!("{}-{}", reaction.user_id, received),
                    emoji: reaction.emoji,
                    user_id: reaction.user_id,
                    expires_at: Instant::now() + REACTION_TTL,
                });
            }
            Response::UserVoiceStateUpdated(update) => {
                if let Some(user) = self.users.iter_mut().find(|u| u.id == update.user_id) {
                    user.voice_state = Some(update.voice_state);
                }
            }
            Response::ClientError(message) => self.last_error = Some(message),
            Response::AllVoiceUsers(_)
            | Response::UserJoinedVoice(_)
            | Response::ReceivingReturnedSignal(_)
            | Response::UserLeftVoice(_) => {}
        }
        Vec::new()
    }

    /// Drops reactions whose animation is over.
    pub fn prune_reactions(&mut self) {
        let now = Instant::now();
        self.reactions.retain(|r| r.expires_at > now);
    }

    pub fn join(&self, name: &str) -> ClientEvent {
        ClientEvent::join_room(&self.room_id, name)
    }

    /// Local player observation, forwarded only when it is user intent.
    pub fn local_change(&mut self, observed: PartialVideoState) -> Option<ClientEvent> {
        let state = self.reconciler.local_change(observed)?;
        Some(ClientEvent::player_state_change(&self.room_id, state))
    }

    /// A pasted link. Links that are not a known video produce nothing.
    pub fn change_video_url(&self, input: &str) -> Option<ClientEvent> {
        let video = parse_video_url(input)?;
        Some(ClientEvent::change_video(
            &self.room_id,
            RawVideoInfo::from(video),
        ))
    }

    pub fn send_message(&self, text: &str) -> Option<ClientEvent> {
        self.current_user()?;
        if text.trim().is_empty() {
            return None;
        }
        Some(ClientEvent::send_message(&self.room_id, text))
    }

    pub fn send_reaction(&self, emoji: &str) -> Option<ClientEvent> {
        let user = self.current_user()?;
        Some(ClientEvent::send_reaction(&self.room_id, emoji, Some(user.id)))
    }

    /// Leaves the room and stops all playback reporting.
    pub fn leave(&mut self) -> ClientEvent {
        self.reconciler.teardown();
        self.users.clear();
        self.reactions.clear();
        ClientEvent::leave_room(&self.room_id)
    }
}
