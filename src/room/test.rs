#[cfg(test)]
mod tests {
    use crate::room::RoomState;
    use crate::user::{User, VoiceState};
    use crate::utils::types::ClientId;
    use crate::video::VideoState;
    use serde_json::json;

    fn room_with(ids: &[ClientId]) -> RoomState {
        let mut room = RoomState::new("r".to_string());
        for id in ids {
            room.users
                .insert(*id, User::new(*id, &format!("user{}", id), "r".to_string()));
        }
        room
    }

    #[test]
    fn test_new_room_defaults() {
        let room = RoomState::new("r".to_string());
        assert!(room.is_empty());
        assert_eq!(room.video_state, VideoState::default());
        assert!(room.current_video.is_none());
    }

    #[test]
    fn test_member_queries() {
        let mut room = room_with(&[3, 1, 2]);
        assert_eq!(room.member_ids(), vec![1, 2, 3]);
        assert_eq!(room.member_ids_except(2), vec![1, 3]);
        assert!(room.contains(3));
        assert!(!room.contains(4));

        room.users.get_mut(&1).unwrap().voice_state = Some(VoiceState::joined());
        room.users.get_mut(&3).unwrap().voice_state = Some(VoiceState::joined());
        assert_eq!(room.voice_peers_of(1), vec![3]);
        assert_eq!(room.voice_peers_of(2), vec![1, 3]);
    }

    #[test]
    fn test_snapshot_wire_format() {
        let room = room_with(&[1]);
        let value = serde_json::to_value(room.snapshot()).unwrap();
        assert_eq!(
            value,
            json!({
                "users": [{"id": 1, "name": "user1", "roomId": "r"}],
                "videoState": {"isPlaying": false, "time": 0.0, "speed": 1.0},
                "currentVideo": null
            })
        );
    }
}
