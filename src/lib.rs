//! Watchroom keeps every viewer of a room on the same point of the same
//! video while they chat, react and talk over voice.
//!
//! The server side is a [`dispatcher::RoomHub`] driven by a joint
//! ([`joint::axum::AxumWSJoint`] over WebSocket, [`joint::mpsc::MPSCJoint`]
//! in process). The [`client`] module holds the pieces a viewer runs: the
//! room view, the playback reconciler and the voice mesh bookkeeping.
pub mod broadcaster;
pub mod channels;
pub mod client;
pub mod config;
pub mod connection;
pub mod dispatcher;
pub mod error;
pub mod joint;
pub mod membership;
pub mod message;
pub mod playback;
pub mod registry;
pub mod response;
pub mod room;
pub mod user;
pub mod utils;
pub mod video;
