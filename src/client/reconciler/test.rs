#[cfg(test)]
mod tests {
    use crate::client::reconciler::{reconcile, LocalPlayback, PlayerCommand, Reconciler};
    use crate::config::SyncConfig;
    use crate::video::{PartialVideoState, VideoState};
    use std::time::Duration;
    use tokio::time::advance;

    fn reconciler() -> Reconciler {
        Reconciler::new(&SyncConfig::default())
    }

    fn playing_at(time: f64) -> LocalPlayback {
        LocalPlayback {
            is_playing: true,
            time,
            speed: 1.0,
        }
    }

    fn pause_at(time: f64) -> PartialVideoState {
        PartialVideoState {
            is_playing: Some(false),
            time: Some(time),
            ..Default::default()
        }
    }

    #[test]
    fn test_tolerance_boundary() {
        let target = VideoState {
            is_playing: true,
            time: 100.0,
            speed: 1.0,
        };
        assert!(reconcile(target, playing_at(101.4), 1.5).is_empty());
        assert_eq!(
            reconcile(target, playing_at(98.0), 1.5),
            vec![PlayerCommand::Seek(100.0)]
        );
    }

    #[test]
    fn test_reconcile_play_state_and_speed() {
        let target = VideoState {
            is_playing: false,
            time: 10.0,
            speed: 2.0,
        };
        assert_eq!(
            reconcile(target, playing_at(10.2), 1.5),
            vec![PlayerCommand::SetSpeed(2.0), PlayerCommand::Pause]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_corrections_inside_window_are_not_reported() {
        let mut reconciler = reconciler();
        let target = VideoState {
            is_playing: false,
            time: 50.0,
            speed: 1.0,
        };

        let commands = reconciler.apply_authoritative(target, playing_at(10.0));
        assert_eq!(
            commands,
            vec![PlayerCommand::Seek(50.0), PlayerCommand::Pause]
        );
        assert!(reconciler.is_suppressed());

        // the player reports the pause we just caused
        advance(Duration::from_millis(200)).await;
        assert_eq!(reconciler.local_change(pause_at(50.0)), None);

        advance(Duration::from_millis(900)).await;
        assert!(!reconciler.is_suppressed());

        // the identical action after expiry is user intent
        let submitted = reconciler.local_change(pause_at(50.0));
        assert_eq!(submitted, Some(PartialVideoState::from(target)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_restarts_instead_of_stacking() {
        let mut reconciler = reconciler();
        reconciler.apply_authoritative(VideoState::default(), playing_at(0.0));

        advance(Duration::from_millis(800)).await;
        reconciler.apply_authoritative(VideoState::fresh(), playing_at(0.0));

        // first window would have ended here
        advance(Duration::from_millis(300)).await;
        assert!(reconciler.is_suppressed());
        assert_eq!(reconciler.window().remaining(), Duration::from_millis(700));

        advance(Duration::from_millis(700)).await;
        assert!(!reconciler.is_suppressed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_optimistic_update_and_echo() {
        let mut reconciler = reconciler();
        let observed = PartialVideoState {
            is_playing: Some(true),
            time: Some(42.0),
            ..Default::default()
        };

        let submitted = reconciler.local_change(observed).unwrap();
        let expected = VideoState {
            is_playing: true,
            time: 42.0,
            speed: 1.0,
        };
        assert_eq!(submitted, PartialVideoState::from(expected));
        assert_eq!(reconciler.authoritative(), expected);
        assert!(reconciler.has_pending_echo());

        // server echo confirms without locking the user out
        let commands = reconciler.apply_authoritative(expected, playing_at(42.1));
        assert!(commands.is_empty());
        assert!(!reconciler.has_pending_echo());
        assert!(!reconciler.is_suppressed());

        let next = reconciler.local_change(pause_at(43.0));
        assert!(next.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_correction_after_confirmed_echo_is_not_reported() {
        let mut reconciler = reconciler();
        let observed = PartialVideoState {
            is_playing: Some(true),
            time: Some(10.0),
            ..Default::default()
        };
        reconciler.local_change(observed).unwrap();

        // slow round trip: the player ran on past the tolerance meanwhile
        let echo = VideoState {
            is_playing: true,
            time: 10.0,
            speed: 1.0,
        };
        let commands = reconciler.apply_authoritative(echo, playing_at(12.0));
        assert_eq!(commands, vec![PlayerCommand::Seek(10.0)]);
        assert!(!reconciler.has_pending_echo());
        assert!(reconciler.is_suppressed());

        // the player reports the seek we just issued
        let seeked = PartialVideoState {
            time: Some(10.0),
            ..Default::default()
        };
        assert_eq!(reconciler.local_change(seeked), None);
        assert!(!reconciler.has_pending_echo());
    }

    #[tokio::test(start_paused = true)]
    async fn test_foreign_update_overwrites_pending_echo() {
        let mut reconciler = reconciler();
        reconciler.local_change(pause_at(5.0)).unwrap();

        let theirs = VideoState {
            is_playing: true,
            time: 80.0,
            speed: 1.0,
        };
        let commands = reconciler.apply_authoritative(
            theirs,
            LocalPlayback {
                is_playing: false,
                time: 5.0,
                speed: 1.0,
            },
        );
        assert_eq!(commands, vec![PlayerCommand::Seek(80.0), PlayerCommand::Play]);
        assert_eq!(reconciler.authoritative(), theirs);
        assert!(!reconciler.has_pending_echo());
        assert!(reconciler.is_suppressed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_video_change_resets_and_suppresses() {
        let mut reconciler = reconciler();
        let commands = reconciler.apply_video_change(LocalPlayback {
            is_playing: false,
            time: 300.0,
            speed: 1.5,
        });
        assert_eq!(
            commands,
            vec![
                PlayerCommand::SetSpeed(1.0),
                PlayerCommand::Seek(0.0),
                PlayerCommand::Play
            ]
        );
        assert_eq!(reconciler.authoritative(), VideoState::fresh());
        assert!(reconciler.is_suppressed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_is_final_and_idempotent() {
        let mut reconciler = reconciler();
        reconciler.apply_authoritative(VideoState::fresh(), playing_at(0.0));

        reconciler.teardown();
        reconciler.teardown();
        assert!(!reconciler.is_suppressed());

        advance(Duration::from_secs(5)).await;
        assert_eq!(reconciler.local_change(pause_at(3.0)), None);
        assert!(reconciler
            .apply_authoritative(VideoState::default(), playing_at(9.0))
            .is_empty());
    }

    #[test]
    fn test_empty_local_change_is_ignored() {
        let mut reconciler = reconciler();
        assert_eq!(reconciler.local_change(PartialVideoState::default()), None);
        assert!(!reconciler.has_pending_echo());
    }
}
