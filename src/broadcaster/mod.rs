//! Fan-out of hub deliveries to live connections.

use crate::connection::SinkAdapter;
use crate::dispatcher::Dispatchable;
use crate::response::{Outgoing, Response};
use crate::utils::types::ClientId;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Outbound queue of one connection, drained by its own writer task.
struct Outbox {
    queue: UnboundedSender<Response>,
    writer: JoinHandle<()>,
}

/// Owns the reducer and the outbound queue of every connection.
///
/// Events are processed one at a time: the reducer lock is held until the
/// connection table is locked, so deliveries of two events never interleave
/// and each connection sees them in the order the hub applied them.
/// Delivery only enqueues. A connection that stops reading holds up its own
/// writer task and nothing else.
pub struct Broadcaster<R: Dispatchable, S: SinkAdapter + Send + 'static> {
    reducer: Arc<Mutex<R>>,
    connections: Arc<Mutex<HashMap<ClientId, Outbox>>>,
    _sink: PhantomData<fn(S)>,
}

impl<R: Dispatchable, S: SinkAdapter + Send + 'static> Broadcaster<R, S> {
    pub fn new(reducer: R) -> Self {
        Broadcaster {
            reducer: Arc::new(Mutex::new(reducer)),
            connections: Arc::new(Mutex::new(HashMap::new())),
            _sink: PhantomData,
        }
    }

    pub fn get_reducer(&self) -> Arc<Mutex<R>> {
        self.reducer.clone()
    }

    pub async fn is_connected(&self, client_id: ClientId) -> bool {
        self.connections.lock().await.contains_key(&client_id)
    }

    /// Takes ownership of the sink and starts the connection's writer task.
    pub async fn register(&self, client_id: ClientId, sink: S) {
        let (queue, rx) = mpsc::unbounded_channel();
        let writer = tokio::spawn(Self::write_loop(client_id, sink, rx));
        let previous = self
            .connections
            .lock()
            .await
            .insert(client_id, Outbox { queue, writer });
        if let Some(previous) = previous {
            previous.writer.abort();
        }
        debug!(client = client_id, "connection registered");
    }

    /// Runs one event through the reducer and delivers the result.
    pub async fn process_event(&self, client_id: ClientId, action: R::Action) {
        let mut reducer = self.reducer.lock().await;
        let outgoing = reducer.dispatch(client_id, action).await;
        let connections = self.connections.lock().await;
        drop(reducer);
        Self::deliver(&connections, outgoing);
    }

    /// Same as [`process_event`](Broadcaster::process_event) for a raw JSON frame.
    pub async fn process_raw(&self, client_id: ClientId, frame: &str) {
        let mut reducer = self.reducer.lock().await;
        let outgoing = reducer.extern_dispatch(client_id, frame).await;
        let connections = self.connections.lock().await;
        drop(reducer);
        Self::deliver(&connections, outgoing);
    }

    /// Sends directly to one connection, bypassing the reducer.
    pub async fn send_to(&self, client_id: ClientId, response: Response) {
        let connections = self.connections.lock().await;
        Self::enqueue(&connections, client_id, response);
    }

    /// Tears the connection down and tells its room.
    ///
    /// Returns once everything already queued for the connection was written.
    pub async fn disconnect(&self, client_id: ClientId) {
        let mut reducer = self.reducer.lock().await;
        let outgoing = reducer.disconnect(client_id);
        let mut connections = self.connections.lock().await;
        drop(reducer);
        let outbox = connections.remove(&client_id);
        Self::deliver(&connections, outgoing);
        drop(connections);

        if let Some(Outbox { queue, writer }) = outbox {
            drop(queue);
            if let Err(e) = writer.await {
                debug!(client = client_id, error = %e, "writer task ended abnormally");
            }
            debug!(client = client_id, "connection removed");
        }
    }

    fn deliver(connections: &HashMap<ClientId, Outbox>, outgoing: Vec<Outgoing>) {
        for delivery in outgoing {
            for client_id in delivery.recipients() {
                Self::enqueue(connections, client_id, delivery.response().clone());
            }
        }
    }

    fn enqueue(connections: &HashMap<ClientId, Outbox>, client_id: ClientId, response: Response) {
        match connections.get(&client_id) {
            Some(outbox) => {
                if outbox.queue.send(response).is_err() {
                    debug!(client = client_id, "writer task is gone, dropping event");
                }
            }
            None => debug!(client = client_id, "no live connection for delivery"),
        }
    }

    async fn write_loop(client_id: ClientId, mut sink: S, mut rx: UnboundedReceiver<Response>) {
        while let Some(response) = rx.recv().await {
            if let Err(e) = sink.send(response).await {
                warn!(client = client_id, error = %e, "failed to deliver event, closing outbox");
                break;
            }
        }
    }
}
