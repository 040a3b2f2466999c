use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

/// Connection-scoped identity. Doubles as the user id inside a room.
pub type ClientId = u64;

/// Room identifier as it appears in URLs and on the wire.
pub type RoomId = String;

/// Anything the server pushes to connections.
pub trait Broadcastable: Serialize + Debug + Clone + Send + Sync {}

/// Anything the server accepts from connections.
pub trait Receivable: DeserializeOwned + Debug + Send + Sync {}
