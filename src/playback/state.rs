// SPDX-License-Identifier: MPL-2.0
//! Playback state machine and transport controller.
//!
//! Manages the lifecycle of video playback with clear state transitions:
//! - Stopped: no ticking, cursor at the first frame
//! - Playing: the tick loop is advancing the cursor
//! - Paused: ticking suspended, cursor retained
//!
//! The controller is a pure state machine over [`PlaybackState`] and a
//! frame cursor. It forwards transport commands to a [`PlaybackDriver`]
//! when one is attached, and folds the driver's events back into its state
//! via [`PlaybackController::handle_event`], so every transition is
//! testable without decoding a single frame.

use super::driver::{CommandSender, PlaybackCommand, PlaybackEvent};
use super::rate::PlaybackRate;
use crate::error::{Error, Result};
use crate::source::VideoInfo;

/// Represents the current playback state of a video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// No ticking; the cursor is at the first frame.
    #[default]
    Stopped,
    /// The tick loop is running.
    Playing,
    /// Ticking suspended at the current cursor.
    Paused,
}

impl PlaybackState {
    /// Returns true if the video is currently playing.
    #[must_use]
    pub fn is_playing(self) -> bool {
        matches!(self, Self::Playing)
    }

    /// Returns true if the video is paused.
    #[must_use]
    pub fn is_paused(self) -> bool {
        matches!(self, Self::Paused)
    }

    /// Returns true if the video is stopped.
    #[must_use]
    pub fn is_stopped(self) -> bool {
        matches!(self, Self::Stopped)
    }
}

/// Transport controller for one open video.
///
/// Owns the playback state, the current frame cursor, and the playback
/// rate. All operations guard against the degenerate zero-frame video:
/// play and seek fail with [`Error::OutOfRange`] there, so a presentation
/// layer can disable its transport controls off the same conditions.
#[derive(Debug)]
pub struct PlaybackController {
    /// Current playback state.
    state: PlaybackState,

    /// Index of the frame currently presented.
    cursor: u64,

    /// Total frames in the controlled video.
    total_frames: u64,

    /// Current playback rate (independent of the file's native rate).
    rate: PlaybackRate,

    /// Command sender to control the tick loop (set when a driver spawns).
    commands: Option<CommandSender>,
}

impl PlaybackController {
    /// Creates a controller for the given video.
    ///
    /// The controller starts Stopped with the cursor on frame 0 and the
    /// rate matching the file's native frame rate.
    #[must_use]
    pub fn new(info: &VideoInfo) -> Self {
        Self {
            state: PlaybackState::Stopped,
            cursor: 0,
            total_frames: info.total_frames,
            rate: PlaybackRate::new(info.fps),
            commands: None,
        }
    }

    /// Attaches the command sender of a running playback loop.
    pub fn attach(&mut self, sender: CommandSender) {
        self.commands = Some(sender);
    }

    /// Returns true if a playback loop is attached.
    #[must_use]
    pub fn has_driver(&self) -> bool {
        self.commands.is_some()
    }

    /// Returns the current playback state.
    #[must_use]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Returns the index of the frame currently presented.
    #[must_use]
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Returns the total frame count of the controlled video.
    #[must_use]
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Returns the current playback rate.
    #[must_use]
    pub fn rate(&self) -> PlaybackRate {
        self.rate
    }

    fn send(&self, command: PlaybackCommand) {
        if let Some(sender) = &self.commands {
            let _ = sender.send(command);
        }
    }

    fn require_frames(&self) -> Result<()> {
        if self.total_frames == 0 {
            return Err(Error::OutOfRange(
                "video has no frames; playback is unavailable".to_string(),
            ));
        }
        Ok(())
    }

    /// Starts or resumes ticking.
    ///
    /// State transitions:
    /// - Stopped → Playing (cursor stays where it is)
    /// - Paused → Playing (from the retained cursor)
    /// - Playing → no change (idempotent)
    pub fn play(&mut self) -> Result<()> {
        self.require_frames()?;
        if self.state.is_playing() {
            return Ok(());
        }
        self.state = PlaybackState::Playing;
        self.send(PlaybackCommand::Play);
        Ok(())
    }

    /// Pauses ticking at the current cursor. No-op unless Playing.
    pub fn pause(&mut self) {
        if self.state.is_playing() {
            self.state = PlaybackState::Paused;
            self.send(PlaybackCommand::Pause);
        }
    }

    /// Halts ticking and resets the cursor to the first frame.
    ///
    /// The tick loop seeks back to frame 0 so the next [`Self::play`]
    /// starts from the beginning.
    pub fn stop(&mut self) {
        self.state = PlaybackState::Stopped;
        self.cursor = 0;
        self.send(PlaybackCommand::Stop);
    }

    /// Moves the cursor to `index`, clamped to the valid range.
    ///
    /// Never fails on a healthy source: out-of-range indices clamp to the
    /// first or last frame. The playback state is unchanged; while
    /// Playing, the next tick continues from the new position. Returns
    /// the clamped cursor.
    pub fn seek(&mut self, index: i64) -> Result<u64> {
        self.require_frames()?;
        let clamped = index.clamp(0, (self.total_frames - 1) as i64) as u64;
        self.cursor = clamped;
        self.send(PlaybackCommand::Seek {
            index: clamped as i64,
        });
        Ok(clamped)
    }

    /// Advances the cursor by exactly one frame.
    ///
    /// Clamped at the last frame (a no-op there, not an error). Stepping
    /// races with the tick loop while Playing, so it is rejected with
    /// [`Error::Busy`] in that state. Returns the resulting cursor.
    pub fn step_forward(&mut self) -> Result<u64> {
        self.require_frames()?;
        if self.state.is_playing() {
            return Err(Error::Busy("cannot step while playing"));
        }
        let next = (self.cursor + 1).min(self.total_frames - 1);
        if next != self.cursor {
            self.cursor = next;
            self.send(PlaybackCommand::Seek {
                index: next as i64,
            });
        }
        Ok(self.cursor)
    }

    /// Retreats the cursor by exactly one frame.
    ///
    /// Clamped at the first frame (a no-op there, not an error). Rejected
    /// with [`Error::Busy`] while Playing, like [`Self::step_forward`].
    pub fn step_backward(&mut self) -> Result<u64> {
        self.require_frames()?;
        if self.state.is_playing() {
            return Err(Error::Busy("cannot step while playing"));
        }
        if self.cursor > 0 {
            self.cursor -= 1;
            self.send(PlaybackCommand::Seek {
                index: self.cursor as i64,
            });
        }
        Ok(self.cursor)
    }

    /// Changes the playback rate; takes effect on the next scheduled tick.
    ///
    /// Valid in any state, including mid-playback. The rate is clamped to
    /// the supported range.
    pub fn set_rate(&mut self, fps: f64) {
        self.rate = PlaybackRate::new(fps);
        self.send(PlaybackCommand::SetRate {
            fps: self.rate.value(),
        });
    }

    /// Folds a playback-loop event into the controller state.
    ///
    /// - `FrameReady` updates the cursor from the frame's index tag.
    /// - `EndOfStream` auto-transitions to Stopped (cursor back to 0).
    /// - `Error` transitions to Stopped and returns the playback error so
    ///   the caller can surface it; the engine itself keeps running.
    pub fn handle_event(&mut self, event: &PlaybackEvent) -> Result<()> {
        match event {
            PlaybackEvent::FrameReady(frame) => {
                self.cursor = frame.index();
                Ok(())
            }
            PlaybackEvent::EndOfStream => {
                self.state = PlaybackState::Stopped;
                self.cursor = 0;
                self.send(PlaybackCommand::Stop);
                Ok(())
            }
            PlaybackEvent::Error(message) => {
                self.state = PlaybackState::Stopped;
                Err(Error::Playback(message.clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::Frame;
    use std::path::PathBuf;

    fn sample_info(total_frames: u64) -> VideoInfo {
        VideoInfo {
            path: PathBuf::from("/videos/sample.mp4"),
            total_frames,
            fps: 30.0,
            width: 640,
            height: 360,
        }
    }

    fn frame_at(index: u64) -> Frame {
        Frame::filled(4, 4, [0, 0, 0], index)
    }

    #[test]
    fn default_state_is_stopped() {
        assert_eq!(PlaybackState::default(), PlaybackState::Stopped);
    }

    #[test]
    fn state_checks() {
        assert!(PlaybackState::Playing.is_playing());
        assert!(!PlaybackState::Paused.is_playing());

        assert!(PlaybackState::Paused.is_paused());
        assert!(!PlaybackState::Playing.is_paused());

        assert!(PlaybackState::Stopped.is_stopped());
        assert!(!PlaybackState::Playing.is_stopped());
    }

    #[test]
    fn new_controller_starts_stopped_at_zero() {
        let controller = PlaybackController::new(&sample_info(100));
        assert!(controller.state().is_stopped());
        assert_eq!(controller.cursor(), 0);
        assert_eq!(controller.total_frames(), 100);
        assert!(!controller.has_driver());
    }

    #[test]
    fn controller_rate_defaults_to_native_fps() {
        let controller = PlaybackController::new(&sample_info(100));
        assert_eq!(controller.rate().value(), 30.0);
    }

    #[test]
    fn play_from_stopped_keeps_cursor() {
        let mut controller = PlaybackController::new(&sample_info(100));
        controller.seek(40).unwrap();
        controller.play().unwrap();

        assert!(controller.state().is_playing());
        assert_eq!(controller.cursor(), 40);
    }

    #[test]
    fn play_is_idempotent_when_already_playing() {
        let mut controller = PlaybackController::new(&sample_info(100));
        controller.play().unwrap();
        controller.play().unwrap();
        assert!(controller.state().is_playing());
    }

    #[test]
    fn pause_from_playing_preserves_cursor() {
        let mut controller = PlaybackController::new(&sample_info(100));
        controller.play().unwrap();
        controller.handle_event(&PlaybackEvent::FrameReady(frame_at(25))).unwrap();
        controller.pause();

        assert!(controller.state().is_paused());
        assert_eq!(controller.cursor(), 25);
    }

    #[test]
    fn pause_is_a_no_op_unless_playing() {
        let mut controller = PlaybackController::new(&sample_info(100));
        controller.pause();
        assert!(controller.state().is_stopped());
    }

    #[test]
    fn play_from_paused_resumes_at_cursor() {
        let mut controller = PlaybackController::new(&sample_info(100));
        controller.play().unwrap();
        controller.handle_event(&PlaybackEvent::FrameReady(frame_at(25))).unwrap();
        controller.pause();
        controller.play().unwrap();

        assert!(controller.state().is_playing());
        assert_eq!(controller.cursor(), 25);
    }

    #[test]
    fn stop_always_resets_cursor_to_zero() {
        let mut controller = PlaybackController::new(&sample_info(100));

        controller.play().unwrap();
        controller.handle_event(&PlaybackEvent::FrameReady(frame_at(60))).unwrap();
        controller.stop();
        assert!(controller.state().is_stopped());
        assert_eq!(controller.cursor(), 0);

        controller.seek(30).unwrap();
        controller.stop();
        assert_eq!(controller.cursor(), 0);
    }

    #[test]
    fn seek_clamps_on_both_sides() {
        let mut controller = PlaybackController::new(&sample_info(100));

        assert_eq!(controller.seek(-10).unwrap(), 0);
        assert_eq!(controller.seek(500).unwrap(), 99);
        assert_eq!(controller.seek(42).unwrap(), 42);
    }

    #[test]
    fn seek_does_not_change_playback_state() {
        let mut controller = PlaybackController::new(&sample_info(100));

        controller.seek(10).unwrap();
        assert!(controller.state().is_stopped());

        controller.play().unwrap();
        controller.seek(20).unwrap();
        assert!(controller.state().is_playing());
    }

    #[test]
    fn step_forward_advances_by_one() {
        let mut controller = PlaybackController::new(&sample_info(100));
        controller.seek(10).unwrap();

        assert_eq!(controller.step_forward().unwrap(), 11);
        assert_eq!(controller.step_forward().unwrap(), 12);
    }

    #[test]
    fn step_forward_is_a_no_op_at_last_frame() {
        let mut controller = PlaybackController::new(&sample_info(100));
        controller.seek(99).unwrap();

        assert_eq!(controller.step_forward().unwrap(), 99);
    }

    #[test]
    fn step_backward_retreats_by_one() {
        let mut controller = PlaybackController::new(&sample_info(100));
        controller.seek(10).unwrap();

        assert_eq!(controller.step_backward().unwrap(), 9);
    }

    #[test]
    fn step_backward_is_a_no_op_at_first_frame() {
        let mut controller = PlaybackController::new(&sample_info(100));
        assert_eq!(controller.step_backward().unwrap(), 0);
    }

    #[test]
    fn stepping_is_rejected_while_playing() {
        let mut controller = PlaybackController::new(&sample_info(100));
        controller.play().unwrap();

        assert!(matches!(controller.step_forward(), Err(Error::Busy(_))));
        assert!(matches!(controller.step_backward(), Err(Error::Busy(_))));
    }

    #[test]
    fn stepping_works_while_paused() {
        let mut controller = PlaybackController::new(&sample_info(100));
        controller.play().unwrap();
        controller.handle_event(&PlaybackEvent::FrameReady(frame_at(5))).unwrap();
        controller.pause();

        assert_eq!(controller.step_forward().unwrap(), 6);
        assert_eq!(controller.step_backward().unwrap(), 5);
    }

    #[test]
    fn set_rate_clamps_to_valid_range() {
        let mut controller = PlaybackController::new(&sample_info(100));
        controller.set_rate(0.0);
        assert!(controller.rate().value() > 0.0);

        controller.set_rate(60.0);
        assert_eq!(controller.rate().value(), 60.0);
    }

    #[test]
    fn set_rate_is_allowed_mid_playback() {
        let mut controller = PlaybackController::new(&sample_info(100));
        controller.play().unwrap();
        controller.set_rate(15.0);

        assert!(controller.state().is_playing());
        assert_eq!(controller.rate().value(), 15.0);
    }

    #[test]
    fn frame_ready_updates_cursor_from_frame_tag() {
        let mut controller = PlaybackController::new(&sample_info(100));
        controller.play().unwrap();

        controller.handle_event(&PlaybackEvent::FrameReady(frame_at(7))).unwrap();
        assert_eq!(controller.cursor(), 7);
    }

    #[test]
    fn end_of_stream_auto_transitions_to_stopped() {
        let mut controller = PlaybackController::new(&sample_info(3));
        controller.play().unwrap();

        // Ticks walk the whole video, then the loop reports End.
        for index in 0..3 {
            controller.handle_event(&PlaybackEvent::FrameReady(frame_at(index))).unwrap();
        }
        controller.handle_event(&PlaybackEvent::EndOfStream).unwrap();

        assert!(controller.state().is_stopped());
        assert_eq!(controller.cursor(), 0);
    }

    #[test]
    fn error_event_stops_playback_and_surfaces_error() {
        let mut controller = PlaybackController::new(&sample_info(100));
        controller.play().unwrap();

        let result = controller.handle_event(&PlaybackEvent::Error("decode failed".to_string()));

        assert!(matches!(result, Err(Error::Playback(_))));
        assert!(controller.state().is_stopped());
    }

    #[test]
    fn zero_frame_video_disables_transport() {
        let mut controller = PlaybackController::new(&sample_info(0));

        assert!(matches!(controller.play(), Err(Error::OutOfRange(_))));
        assert!(matches!(controller.seek(0), Err(Error::OutOfRange(_))));
        assert!(matches!(
            controller.step_forward(),
            Err(Error::OutOfRange(_))
        ));
        assert!(matches!(
            controller.step_backward(),
            Err(Error::OutOfRange(_))
        ));
        assert!(controller.state().is_stopped());
    }
}
