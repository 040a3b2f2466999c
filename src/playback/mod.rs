//! The playback synchronizer: sole writer of a room's `VideoState` and
//! current video.
//!
//! Changes are applied strictly in the order they reach the hub and every
//! result is broadcast to the whole room, submitter included. There is no
//! leader and no timestamp arbitration: the last change applied wins.
mod test;

use crate::error::RoomError;
use crate::registry::RoomRegistry;
use crate::response::{Outgoing, RoomResponse};
use crate::video::{PartialVideoState, RawVideoInfo, VideoInfo, VideoState};
use tracing::debug;

/// Merges `partial` into the room's playback state and broadcasts the result.
pub fn apply_state_change(
    registry: &mut RoomRegistry,
    room_id: &str,
    partial: &PartialVideoState,
) -> Result<Vec<Outgoing>, RoomError> {
    partial.validate()?;

    let Some(room) = registry.room_mut(room_id) else {
        debug!(room = room_id, "state change for a room that is gone");
        return Ok(Vec::new());
    };
    room.video_state.merge(partial);
    debug!(room = room_id, state = ?room.video_state, "playback state applied");

    Ok(vec![RoomResponse::player_state_update(
        room_id,
        room.member_ids(),
        room.video_state,
    )
    .into()])
}

/// Switches the room to a new video and restarts playback from zero.
///
/// Unknown sources and missing ids are rejected before the room is touched.
pub fn change_video(
    registry: &mut RoomRegistry,
    room_id: &str,
    video: RawVideoInfo,
) -> Result<Vec<Outgoing>, RoomError> {
    let video = VideoInfo::try_from(video)?;

    let Some(room) = registry.room_mut(room_id) else {
        debug!(room = room_id, "video change for a room that is gone");
        return Ok(Vec::new());
    };
    room.current_video = Some(video.clone());
    room.video_state = VideoState::fresh();
    debug!(room = room_id, source = video.source(), id = video.id(), "video changed");

    let members = room.member_ids();
    Ok(vec![
        RoomResponse::video_changed(room_id, members.clone(), video).into(),
        RoomResponse::player_state_update(room_id, members, room.video_state).into(),
    ])
}
