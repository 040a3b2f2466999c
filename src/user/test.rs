#[cfg(test)]
mod tests {
    use crate::user::{User, VoiceState};
    use serde_json::json;

    #[test]
    fn test_user_wire_format() {
        let mut user = User::new(7, "  alice ", "room1".to_string());
        assert_eq!(user.name, "alice");
        assert!(!user.in_voice());
        assert_eq!(
            serde_json::to_value(&user).unwrap(),
            json!({"id": 7, "name": "alice", "roomId": "room1"})
        );

        user.voice_state = Some(VoiceState::joined());
        assert!(user.in_voice());
        assert_eq!(
            serde_json::to_value(&user).unwrap()["voiceState"],
            json!({"isJoined": true, "isMuted": false})
        );
    }
}
