//! Joints bind a transport to the hub: one task per connection reads events
//! off its stream and feeds them to the shared [`Broadcaster`].
pub mod axum;
pub mod mpsc;
mod test;

use crate::broadcaster::Broadcaster;
use crate::connection::{SinkAdapter, StreamAdapter};
use crate::dispatcher::Dispatchable;
use crate::message::ClientEvent;
use crate::response::Response;
use crate::utils::get_id;
use crate::utils::types::ClientId;
use tracing::{debug, info};

/// Transport-independent connection handling shared by every joint.
pub struct AbstractJoint<R, S>
where
    R: Dispatchable<Action = ClientEvent>,
    S: SinkAdapter + Send + 'static,
{
    broadcaster: Broadcaster<R, S>,
}

impl<R, S> AbstractJoint<R, S>
where
    R: Dispatchable<Action = ClientEvent>,
    S: SinkAdapter + Send + 'static,
{
    pub fn new(reducer: R) -> Self {
        AbstractJoint {
            broadcaster: Broadcaster::new(reducer),
        }
    }

    pub fn broadcaster(&self) -> &Broadcaster<R, S> {
        &self.broadcaster
    }

    /// Serves one connection until its stream ends.
    ///
    /// Malformed frames are answered with `client-error` and the connection
    /// stays open. When the stream closes the connection leaves its room.
    pub async fn handle_stream<T>(&self, stream: &mut T, sink: S) -> ClientId
    where
        T: StreamAdapter + Send,
    {
        let client_id = get_id();
        self.broadcaster.register(client_id, sink).await;
        self.broadcaster
            .send_to(client_id, Response::Connected(client_id))
            .await;
        info!(client = client_id, "connection opened");

        loop {
            match stream.next().await {
                Ok(event) => self.broadcaster.process_event(client_id, event).await,
                Err(e) if e.is_recoverable() => {
                    debug!(client = client_id, error = %e, "rejected frame");
                    self.broadcaster
                        .send_to(client_id, Response::ClientError(e.to_string()))
                        .await;
                }
                Err(e) => {
                    debug!(client = client_id, reason = %e, "stream ended");
                    break;
                }
            }
        }

        self.broadcaster.disconnect(client_id).await;
        info!(client = client_id, "connection closed");
        client_id
    }

    /// Dispatches a raw JSON event on behalf of `client_id`.
    pub async fn dispatch(&self, client_id: ClientId, action: &str) {
        self.broadcaster.process_raw(client_id, action).await;
    }
}
