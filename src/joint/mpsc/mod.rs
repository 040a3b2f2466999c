//! Provides a joint implementation using Tokio MPSC (Multi-Producer, Single-Consumer) channels.
//!
//! This is useful for in-process clients, tests and benchmarks where no network is involved.

use crate::connection::{SinkAdapter, StreamAdapter};
use crate::dispatcher::Dispatchable;
use crate::error::StreamError;
use crate::joint::AbstractJoint;
use crate::message::ClientEvent;
use crate::response::Response;
use crate::utils::types::ClientId;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::io;
use tokio::sync::mpsc::{self, Receiver, Sender};

/// An implementation of [`SinkAdapter`] that sends responses over a `tokio::sync::mpsc::Sender`.
#[derive(Clone)]
pub struct MPSCSink {
    sender: Sender<Response>,
}

#[async_trait]
impl SinkAdapter for MPSCSink {
    async fn send(
        &mut self,
        response: Response,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.sender.send(response).await.map_err(|e| {
            Box::new(io::Error::new(
                io::ErrorKind::BrokenPipe,
                format!("Failed to send response: {}", e),
            )) as _
        })
    }
}

/// An implementation of [`StreamAdapter`] that receives events from a `tokio::sync::mpsc::Receiver`.
pub struct MPSCStream {
    receiver: Receiver<ClientEvent>,
}

#[async_trait]
impl StreamAdapter for MPSCStream {
    async fn next(&mut self) -> Result<ClientEvent, StreamError> {
        self.receiver.recv().await.ok_or(StreamError::Closed)
    }
}

/// A joint whose connections are pairs of channels.
///
/// Each call to [`connect`](MPSCJoint::connect) behaves like a fresh socket:
/// it gets its own id, receives `connected` first, and leaves its room when
/// the sending half is dropped.
pub struct MPSCJoint<R: Dispatchable<Action = ClientEvent>> {
    joint: Arc<AbstractJoint<R, MPSCSink>>,
}

impl<R: Dispatchable<Action = ClientEvent>> MPSCJoint<R> {
    pub fn new(reducer: R) -> Self {
        MPSCJoint {
            joint: Arc::new(AbstractJoint::new(reducer)),
        }
    }

    /// Connects a new client.
    ///
    /// # Arguments
    /// * `buffer_size` - The buffer size for both created channels.
    ///
    /// # Returns
    /// The sender for client events and the receiver for server events.
    pub fn connect(&self, buffer_size: usize) -> (Sender<ClientEvent>, Receiver<Response>) {
        let (event_tx, event_rx) = mpsc::channel(buffer_size);
        let (resp_tx, resp_rx) = mpsc::channel(buffer_size);

        let joint = self.joint.clone();

        tokio::spawn(async move {
            let mut stream = MPSCStream { receiver: event_rx };
            let sink = MPSCSink { sender: resp_tx };

            joint.handle_stream(&mut stream, sink).await;
        });

        (event_tx, resp_rx)
    }

    /// Dispatches a raw JSON event on behalf of `client_id`, as if it came
    /// over that client's connection.
    pub async fn dispatch(&self, client_id: ClientId, action: &str) {
        self.joint.dispatch(client_id, action).await;
    }

    pub fn joint(&self) -> Arc<AbstractJoint<R, MPSCSink>> {
        self.joint.clone()
    }
}
