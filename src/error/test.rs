#[cfg(test)]
mod tests {
    use crate::error::{RoomError, StreamError};

    #[test]
    fn test_client_facing_errors() {
        assert!(RoomError::EmptyDisplayName.is_client_facing());
        assert!(RoomError::InvalidPlaybackState("speed".into()).is_client_facing());
        assert!(!RoomError::InvalidVideo("unknown".into()).is_client_facing());
        assert!(!RoomError::NotInRoom(4).is_client_facing());
        assert!(!RoomError::UnknownPeer(9).is_client_facing());
    }

    #[test]
    fn test_stream_error_recoverability() {
        let parse_err = serde_json::from_str::<u64>("nope").unwrap_err();
        assert!(StreamError::from(parse_err).is_recoverable());
        assert!(!StreamError::Closed.is_recoverable());
        assert!(!StreamError::Transport("reset".into()).is_recoverable());
    }
}
