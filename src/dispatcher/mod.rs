//! Routing of client events into the room state machine.

use crate::channels;
use crate::config::SyncConfig;
use crate::error::RoomError;
use crate::membership::{self, require_member};
use crate::message::ClientEvent;
use crate::playback;
use crate::registry::RoomRegistry;
use crate::response::{ClientResponse, Outgoing};
use crate::utils::types::{ClientId, Receivable, RoomId};
use std::future::Future;
use tracing::{debug, warn};

/// State machine a joint drives: one action in, a list of deliveries out.
///
/// Implementations never fail a dispatch. Anything the sender should hear
/// about comes back as a delivery addressed to it.
pub trait Dispatchable: Send + 'static {
    type Action: Receivable;

    fn dispatch(
        &mut self,
        client_id: ClientId,
        action: Self::Action,
    ) -> impl Future<Output = Vec<Outgoing>> + Send;

    /// Same as [`dispatch`](Dispatchable::dispatch), from a raw JSON frame.
    fn extern_dispatch(
        &mut self,
        client_id: ClientId,
        action: &str,
    ) -> impl Future<Output = Vec<Outgoing>> + Send;

    /// Tears down everything the connection owned. Must be idempotent.
    fn disconnect(&mut self, client_id: ClientId) -> Vec<Outgoing>;
}

/// The authoritative hub: owns every room of the process.
#[derive(Debug, Default)]
pub struct RoomHub {
    registry: RoomRegistry,
    config: SyncConfig,
}

impl RoomHub {
    pub fn new(config: SyncConfig) -> Self {
        RoomHub {
            registry: RoomRegistry::new(),
            config,
        }
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    /// A fresh id for `POST /api/rooms`. The room itself appears on first join.
    pub fn create_room_id(&self) -> RoomId {
        self.registry.fresh_room_id(self.config.room_id_length)
    }

    /// Applies one event, reporting failures as errors.
    pub fn handle(
        &mut self,
        client_id: ClientId,
        event: ClientEvent,
    ) -> Result<Vec<Outgoing>, RoomError> {
        if let Some(room_id) = event.room_id() {
            if room_id.trim().is_empty() {
                return Err(RoomError::EmptyRoomId);
            }
        }

        let registry = &mut self.registry;
        match event {
            ClientEvent::JoinRoom(p) => {
                membership::join(registry, client_id, &p.room_id, &p.user.name)
            }
            ClientEvent::LeaveRoom(p) => {
                require_member(registry, client_id, &p.room_id)?;
                Ok(membership::leave(registry, client_id))
            }
            ClientEvent::PlayerStateChange(p) => {
                require_member(registry, client_id, &p.room_id)?;
                playback::apply_state_change(registry, &p.room_id, &p.state)
            }
            ClientEvent::ChangeVideo(p) => {
                require_member(registry, client_id, &p.room_id)?;
                playback::change_video(registry, &p.room_id, p.video)
            }
            ClientEvent::SendMessage(p) => {
                require_member(registry, client_id, &p.room_id)?;
                channels::send_message(registry, client_id, &p.room_id, p.message)
            }
            ClientEvent::SendReaction(p) => {
                require_member(registry, client_id, &p.room_id)?;
                channels::send_reaction(registry, client_id, &p.room_id, p.reaction)
            }
            ClientEvent::JoinVoiceChat(p) => {
                require_member(registry, client_id, &p.room_id)?;
                Ok(channels::join_voice(registry, client_id))
            }
            ClientEvent::LeaveVoiceChat(p) => {
                require_member(registry, client_id, &p.room_id)?;
                Ok(channels::leave_voice(registry, client_id))
            }
            ClientEvent::VoiceStateChange(p) => {
                require_member(registry, client_id, &p.room_id)?;
                Ok(channels::set_muted(registry, client_id, p.is_muted))
            }
            ClientEvent::SendingSignal(p) => channels::relay_offer(registry, client_id, p),
            ClientEvent::ReturningSignal(p) => channels::relay_answer(registry, client_id, p),
        }
    }

    fn report(client_id: ClientId, event: &'static str, error: RoomError) -> Vec<Outgoing> {
        if error.is_client_facing() {
            debug!(client = client_id, event, %error, "rejected event");
            vec![ClientResponse::client_error(client_id, error.to_string()).into()]
        } else {
            match &error {
                RoomError::InvalidVideo(_) => {
                    warn!(client = client_id, event, %error, "dropped event")
                }
                _ => debug!(client = client_id, event, %error, "dropped stale event"),
            }
            Vec::new()
        }
    }
}

impl Dispatchable for RoomHub {
    type Action = ClientEvent;

    async fn dispatch(&mut self, client_id: ClientId, action: ClientEvent) -> Vec<Outgoing> {
        let name = action.name();
        debug!(client = client_id, event = name, "dispatching");
        self.handle(client_id, action)
            .unwrap_or_else(|error| Self::report(client_id, name, error))
    }

    async fn extern_dispatch(&mut self, client_id: ClientId, action: &str) -> Vec<Outgoing> {
        match serde_json::from_str::<ClientEvent>(action) {
            Ok(event) => self.dispatch(client_id, event).await,
            Err(e) => {
                debug!(client = client_id, error = %e, "malformed event");
                let message = format!("malformed event: {}", e);
                vec![ClientResponse::client_error(client_id, message).into()]
            }
        }
    }

    fn disconnect(&mut self, client_id: ClientId) -> Vec<Outgoing> {
        membership::leave(&mut self.registry, client_id)
    }
}
