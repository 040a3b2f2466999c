#[cfg(test)]
mod tests {
    use crate::error::RoomError;
    use crate::membership::join;
    use crate::playback::{apply_state_change, change_video};
    use crate::registry::RoomRegistry;
    use crate::response::Response;
    use crate::video::{PartialVideoState, RawVideoInfo, VideoInfo, VideoState};

    fn registry_with_two_rooms() -> RoomRegistry {
        let mut registry = RoomRegistry::new();
        join(&mut registry, 1, "a", "alice").unwrap();
        join(&mut registry, 2, "a", "bob").unwrap();
        join(&mut registry, 3, "b", "carol").unwrap();
        registry
    }

    fn youtube(id: &str) -> RawVideoInfo {
        RawVideoInfo {
            source: "youtube".to_string(),
            id: Some(id.to_string()),
        }
    }

    #[test]
    fn test_merge_preserves_unspecified_fields() {
        let mut registry = registry_with_two_rooms();
        registry.room_mut("a").unwrap().video_state = VideoState {
            is_playing: false,
            time: 42.0,
            speed: 1.0,
        };

        let partial = PartialVideoState {
            is_playing: Some(true),
            ..Default::default()
        };
        let outgoing = apply_state_change(&mut registry, "a", &partial).unwrap();

        let expected = VideoState {
            is_playing: true,
            time: 42.0,
            speed: 1.0,
        };
        assert_eq!(registry.room("a").unwrap().video_state, expected);
        assert_eq!(outgoing.len(), 1);
        assert_eq!(outgoing[0].response(), &Response::PlayerStateUpdate(expected));
    }

    #[test]
    fn test_state_update_reaches_whole_room_only() {
        let mut registry = registry_with_two_rooms();
        let partial = PartialVideoState {
            time: Some(10.0),
            ..Default::default()
        };
        let outgoing = apply_state_change(&mut registry, "a", &partial).unwrap();

        // submitter included, other room excluded
        assert_eq!(outgoing[0].recipients(), vec![1, 2]);
        assert_eq!(outgoing[0].room(), Some("a"));
        assert_eq!(registry.room("b").unwrap().video_state, VideoState::default());
    }

    #[test]
    fn test_changes_apply_in_receipt_order() {
        let mut registry = registry_with_two_rooms();
        let pause = PartialVideoState {
            is_playing: Some(false),
            ..Default::default()
        };
        let play = PartialVideoState {
            is_playing: Some(true),
            time: Some(5.0),
            ..Default::default()
        };

        apply_state_change(&mut registry, "a", &pause).unwrap();
        apply_state_change(&mut registry, "a", &play).unwrap();
        let state = registry.room("a").unwrap().video_state;
        assert!(state.is_playing);
        assert_eq!(state.time, 5.0);
    }

    #[test]
    fn test_invalid_state_change_is_rejected() {
        let mut registry = registry_with_two_rooms();
        let bad = PartialVideoState {
            is_playing: Some(true),
            speed: Some(-2.0),
            ..Default::default()
        };
        let result = apply_state_change(&mut registry, "a", &bad);
        assert!(matches!(result, Err(RoomError::InvalidPlaybackState(_))));
        assert_eq!(registry.room("a").unwrap().video_state, VideoState::default());
    }

    #[test]
    fn test_state_change_for_missing_room_is_noop() {
        let mut registry = RoomRegistry::new();
        let outgoing =
            apply_state_change(&mut registry, "ghost", &PartialVideoState::default()).unwrap();
        assert!(outgoing.is_empty());
        assert!(!registry.contains_room("ghost"));
    }

    #[test]
    fn test_change_video_resets_playback() {
        let mut registry = registry_with_two_rooms();
        registry.room_mut("a").unwrap().video_state = VideoState {
            is_playing: false,
            time: 300.0,
            speed: 2.0,
        };

        let outgoing = change_video(&mut registry, "a", youtube("dQw4w9WgXcQ")).unwrap();

        let room = registry.room("a").unwrap();
        assert_eq!(room.video_state, VideoState::fresh());
        assert_eq!(
            room.current_video,
            Some(VideoInfo::Youtube("dQw4w9WgXcQ".to_string()))
        );

        assert_eq!(outgoing.len(), 2);
        assert_eq!(
            outgoing[0].response(),
            &Response::VideoChanged(VideoInfo::Youtube("dQw4w9WgXcQ".to_string()))
        );
        assert_eq!(
            outgoing[1].response(),
            &Response::PlayerStateUpdate(VideoState {
                is_playing: true,
                time: 0.0,
                speed: 1.0
            })
        );
        // submitter included
        assert_eq!(outgoing[0].recipients(), vec![1, 2]);
    }

    #[test]
    fn test_change_video_rejects_invalid_source() {
        let mut registry = registry_with_two_rooms();
        change_video(&mut registry, "a", youtube("dQw4w9WgXcQ")).unwrap();
        registry.room_mut("a").unwrap().video_state.time = 50.0;

        let unknown = RawVideoInfo {
            source: "unknown".to_string(),
            id: None,
        };
        let result = change_video(&mut registry, "a", unknown);
        assert!(matches!(result, Err(RoomError::InvalidVideo(_))));

        let room = registry.room("a").unwrap();
        assert_eq!(room.video_state.time, 50.0);
        assert_eq!(
            room.current_video,
            Some(VideoInfo::Youtube("dQw4w9WgXcQ".to_string()))
        );
    }
}
