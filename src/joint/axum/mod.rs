//! WebSocket joint on top of axum, plus the room-creation endpoint.

use crate::connection::{decode_frame, encode_response, SinkAdapter, StreamAdapter};
use crate::dispatcher::{Dispatchable, RoomHub};
use crate::error::StreamError;
use crate::joint::AbstractJoint;
use crate::message::ClientEvent;
use crate::response::Response;
use crate::utils::types::{ClientId, RoomId};
use async_trait::async_trait;
use axum::extract::ws::{Message, Utf8Bytes, WebSocket};
use axum::extract::WebSocketUpgrade;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub struct AxumWSSink {
    sink: SplitSink<WebSocket, Message>,
}

#[async_trait]
impl SinkAdapter for AxumWSSink {
    async fn send(
        &mut self,
        response: Response,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let message = Message::Text(Utf8Bytes::from(encode_response(&response)?));
        self.sink.send(message).await.map_err(|e| Box::new(e) as _)
    }
}

pub struct AxumWSStream {
    stream: SplitStream<WebSocket>,
}

#[async_trait]
impl StreamAdapter for AxumWSStream {
    async fn next(&mut self) -> Result<ClientEvent, StreamError> {
        loop {
            let message = match self.stream.next().await {
                None => return Err(StreamError::Closed),
                Some(Err(e)) => return Err(StreamError::Transport(e.to_string())),
                Some(Ok(message)) => message,
            };
            match message {
                Message::Text(text) => return decode_frame(text.as_str()),
                Message::Binary(_) => {
                    return Err(StreamError::Malformed(
                        "binary frames are not supported".to_string(),
                    ))
                }
                Message::Close(_) => return Err(StreamError::Closed),
                // ping and pong are answered by axum
                _ => continue,
            }
        }
    }
}

/// Body of a `POST /api/rooms` reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedRoom {
    pub room_id: RoomId,
}

pub struct AxumWSJoint<R: Dispatchable<Action = ClientEvent>> {
    joint: Arc<AbstractJoint<R, AxumWSSink>>,
}

impl<R: Dispatchable<Action = ClientEvent>> AxumWSJoint<R> {
    pub fn new(reducer: R) -> Self {
        AxumWSJoint {
            joint: Arc::new(AbstractJoint::new(reducer)),
        }
    }

    pub async fn ws_handler(
        ws: WebSocketUpgrade,
        joint: Arc<AbstractJoint<R, AxumWSSink>>,
    ) -> impl IntoResponse {
        ws.on_upgrade(|socket| async move {
            let (sink, stream) = socket.split();

            let mut stream_adapter = AxumWSStream { stream };

            let sink_adapter = AxumWSSink { sink };

            joint.handle_stream(&mut stream_adapter, sink_adapter).await;
        })
    }

    /// Mounts the WebSocket endpoint on `path`.
    pub fn attach_router(&self, path: &str, router: Router) -> Router {
        let joint = self.joint.clone();
        router.route(path, get(move |ws| AxumWSJoint::ws_handler(ws, joint)))
    }

    pub async fn dispatch(&self, client_id: ClientId, action: &str) {
        self.joint.dispatch(client_id, action).await;
    }

    pub fn joint(&self) -> Arc<AbstractJoint<R, AxumWSSink>> {
        self.joint.clone()
    }
}

impl AxumWSJoint<RoomHub> {
    /// Mounts `POST {path}` handing out fresh room ids.
    pub fn attach_room_api(&self, path: &str, router: Router) -> Router {
        let joint = self.joint.clone();
        router.route(
            path,
            post(move || async move {
                let reducer = joint.broadcaster().get_reducer();
                let room_id = reducer.lock().await.create_room_id();
                Json(CreatedRoom { room_id })
            }),
        )
    }
}
