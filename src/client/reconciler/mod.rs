//! Client-side sync reconciler.
//!
//! Every authoritative push opens an echo window. While it is open the local
//! player is being driven by the reconciler, so whatever it reports is an
//! echo of that correction and must not travel back to the server. Outside
//! the window local changes are user intent: applied optimistically and
//! forwarded. The window is purely time based.
mod test;

use crate::config::SyncConfig;
use crate::video::{PartialVideoState, VideoState};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

const SPEED_EPSILON: f64 = 1e-3;

/// Instruction for whatever drives the actual video element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerCommand {
    Play,
    Pause,
    Seek(f64),
    SetSpeed(f64),
}

/// What the local player currently shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalPlayback {
    pub is_playing: bool,
    pub time: f64,
    pub speed: f64,
}

impl From<VideoState> for LocalPlayback {
    fn from(state: VideoState) -> Self {
        LocalPlayback {
            is_playing: state.is_playing,
            time: state.time,
            speed: state.speed,
        }
    }
}

/// A restartable deadline. Reopening moves the deadline instead of stacking
/// a second window; cancelling is idempotent.
#[derive(Debug, Clone)]
pub struct EchoWindow {
    duration: Duration,
    deadline: Option<Instant>,
}

impl EchoWindow {
    pub fn new(duration: Duration) -> Self {
        EchoWindow {
            duration,
            deadline: None,
        }
    }

    pub fn open(&mut self) {
        self.deadline = Some(Instant::now() + self.duration);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_open(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() < d)
    }

    /// Time left before reporting resumes, zero when closed.
    pub fn remaining(&self) -> Duration {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
            .unwrap_or_default()
    }
}

#[derive(Debug)]
pub struct Reconciler {
    window: EchoWindow,
    tolerance: f64,
    authoritative: VideoState,
    /// Optimistic local update waiting for the server echo.
    pending_echo: Option<VideoState>,
    torn_down: bool,
}

impl Reconciler {
    pub fn new(config: &SyncConfig) -> Self {
        Reconciler {
            window: EchoWindow::new(config.echo_window()),
            tolerance: config.seek_tolerance_secs,
            authoritative: VideoState::default(),
            pending_echo: None,
            torn_down: false,
        }
    }

    pub fn authoritative(&self) -> VideoState {
        self.authoritative
    }

    pub fn is_suppressed(&self) -> bool {
        self.window.is_open()
    }

    pub fn window(&self) -> &EchoWindow {
        &self.window
    }

    pub fn has_pending_echo(&self) -> bool {
        self.pending_echo.is_some()
    }

    /// Handles an authoritative state (`room-state` or `player-state-update`)
    /// and returns what the local player has to do to match it.
    ///
    /// The server echo of our own optimistic update only confirms it and
    /// leaves reporting enabled, unless the player drifted far enough to
    /// need a correction. Any correction opens the window.
    pub fn apply_authoritative(
        &mut self,
        state: VideoState,
        local: LocalPlayback,
    ) -> Vec<PlayerCommand> {
        if self.torn_down {
            return Vec::new();
        }
        self.authoritative = state;
        let confirmed = self.pending_echo.take() == Some(state);
        let commands = self.reconcile(local);
        if confirmed && commands.is_empty() {
            debug!("optimistic update confirmed");
        } else {
            self.window.open();
        }
        commands
    }

    /// Handles `video-changed`: playback restarts from zero for everyone.
    pub fn apply_video_change(&mut self, local: LocalPlayback) -> Vec<PlayerCommand> {
        if self.torn_down {
            return Vec::new();
        }
        self.pending_echo = None;
        self.authoritative = VideoState::fresh();
        self.window.open();
        self.reconcile(local)
    }

    /// A change observed on the local player.
    ///
    /// Returns the state to submit as `player-state-change`, or `None` when
    /// the change is an echo of a correction (or the reconciler is gone).
    /// A genuine user action inside the window is dropped too.
    pub fn local_change(&mut self, observed: PartialVideoState) -> Option<PartialVideoState> {
        if self.torn_down || observed.is_empty() {
            return None;
        }
        if self.window.is_open() {
            debug!(remaining = ?self.window.remaining(), "local change suppressed");
            return None;
        }
        let next = self.authoritative.merged(&observed);
        self.authoritative = next;
        self.pending_echo = Some(next);
        Some(PartialVideoState::from(next))
    }

    /// Stops reporting for good. Safe to call more than once.
    pub fn teardown(&mut self) {
        self.window.cancel();
        self.pending_echo = None;
        self.torn_down = true;
    }

    fn reconcile(&self, local: LocalPlayback) -> Vec<PlayerCommand> {
        reconcile(self.authoritative, local, self.tolerance)
    }
}

/// Commands moving `local` onto `target`.
///
/// Position is only corrected when the drift exceeds `tolerance` seconds.
pub fn reconcile(target: VideoState, local: LocalPlayback, tolerance: f64) -> Vec<PlayerCommand> {
    let mut commands = Vec::new();
    if (local.speed - target.speed).abs() > SPEED_EPSILON {
        commands.push(PlayerCommand::SetSpeed(target.speed));
    }
    if (local.time - target.time).abs() > tolerance {
        commands.push(PlayerCommand::Seek(target.time));
    }
    if target.is_playing != local.is_playing {
        commands.push(if target.is_playing {
            PlayerCommand::Play
        } else {
            PlayerCommand::Pause
        });
    }
    commands
}
