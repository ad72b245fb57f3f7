// SPDX-License-Identifier: MPL-2.0
//! Background playback loop using the frame source.
//!
//! The driver runs the engine's only recurring schedule: a tick loop that
//! decodes one frame per tick at the configured rate and publishes it to
//! the observer. Commands arrive over an unbounded channel; frames and
//! failures leave over a small bounded channel so a slow observer applies
//! backpressure instead of accumulating frames.
//!
//! FFmpeg contexts are not `Send`, so the loop runs on a blocking thread
//! and opens its own [`FrameSource`] there; its decode cursor is
//! independent of any source the caller holds.

use crate::error::{Error, OpenError, Result};
use crate::media::Frame;
use crate::playback::rate::PlaybackRate;
use crate::source::FrameSource;
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Commands sent to the playback loop.
#[derive(Debug, Clone)]
pub enum PlaybackCommand {
    /// Start or resume ticking from the current position.
    Play,

    /// Suspend ticking, keeping the current position.
    Pause,

    /// Halt ticking and reset to the first frame.
    Stop,

    /// Move the decode cursor to a frame index and publish that frame.
    Seek { index: i64 },

    /// Change the tick rate; takes effect on the next scheduled tick.
    SetRate { fps: f64 },

    /// Terminate the loop and release the decoder.
    Shutdown,
}

/// Events published by the playback loop.
#[derive(Debug, Clone)]
pub enum PlaybackEvent {
    /// A frame was decoded and should be displayed.
    FrameReady(Frame),

    /// The sequential read ran past the last frame.
    EndOfStream,

    /// Decoding failed mid-stream; ticking has halted.
    Error(String),
}

/// Cloneable handle for sending commands to a running playback loop.
#[derive(Debug, Clone)]
pub struct CommandSender {
    tx: mpsc::UnboundedSender<PlaybackCommand>,
}

impl CommandSender {
    /// Sends a command to the playback loop.
    pub fn send(&self, command: PlaybackCommand) -> Result<()> {
        self.tx
            .send(command)
            .map_err(|_| Error::Playback("playback loop is not running".to_string()))
    }
}

/// Handle to a background playback loop.
///
/// Dropping the driver shuts the loop down; the shutdown takes effect at
/// the next tick boundary, never leaving a dangling scheduled tick.
pub struct PlaybackDriver {
    command_tx: CommandSender,
    event_rx: mpsc::Receiver<PlaybackEvent>,
}

impl PlaybackDriver {
    /// Spawns the playback loop for the given video file.
    ///
    /// The loop opens its own frame source on a blocking thread; open
    /// failures surface as an [`PlaybackEvent::Error`] on the event
    /// channel. Must be called within a Tokio runtime.
    pub fn spawn<P: AsRef<Path>>(video_path: P, rate: PlaybackRate) -> Result<Self> {
        let path = video_path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(Error::Open(OpenError::IoError(format!(
                "No such file: {}",
                path.display()
            ))));
        }

        // Commands: unbounded (callers must never block).
        // Events: bounded to two frames for backpressure.
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel(2);

        // FFmpeg contexts are not Send, so the loop runs on a blocking
        // thread that owns them end to end.
        tokio::task::spawn_blocking(move || {
            if let Err(e) = playback_loop_blocking(path, command_rx, event_tx, rate) {
                eprintln!("Playback task failed: {}", e);
            }
        });

        Ok(Self {
            command_tx: CommandSender { tx: command_tx },
            event_rx,
        })
    }

    /// Returns a cloneable handle for sending commands to the loop.
    #[must_use]
    pub fn command_sender(&self) -> CommandSender {
        self.command_tx.clone()
    }

    /// Sends a command to the playback loop.
    pub fn send_command(&self, command: PlaybackCommand) -> Result<()> {
        self.command_tx.send(command)
    }

    /// Receives the next event from the loop (non-blocking).
    ///
    /// Returns `None` if no events are available.
    pub fn try_recv_event(&mut self) -> Option<PlaybackEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Receives the next event from the loop (awaiting).
    ///
    /// Returns `None` if the loop has terminated.
    pub async fn recv_event(&mut self) -> Option<PlaybackEvent> {
        self.event_rx.recv().await
    }
}

impl Drop for PlaybackDriver {
    fn drop(&mut self) {
        let _ = self.command_tx.send(PlaybackCommand::Shutdown);
    }
}

/// Main playback loop running in a blocking thread.
///
/// Processes commands between ticks. While playing, each iteration decodes
/// exactly one frame, publishes it, and sleeps out the remainder of the
/// tick interval. End of stream and decode failures halt ticking and are
/// reported as events rather than crashing the loop.
fn playback_loop_blocking(
    path: std::path::PathBuf,
    mut command_rx: mpsc::UnboundedReceiver<PlaybackCommand>,
    event_tx: mpsc::Sender<PlaybackEvent>,
    rate: PlaybackRate,
) -> Result<()> {
    let mut source = match FrameSource::open(&path) {
        Ok(source) => source,
        Err(e) => {
            let _ = event_tx.blocking_send(PlaybackEvent::Error(e.to_string()));
            return Err(e);
        }
    };

    let mut playing = false;
    let mut tick_interval = rate.tick_interval();

    loop {
        // Check for commands (non-blocking)
        match command_rx.try_recv() {
            Ok(PlaybackCommand::Play) => {
                playing = true;
            }
            Ok(PlaybackCommand::Pause) => {
                playing = false;
            }
            Ok(PlaybackCommand::Stop) => {
                playing = false;
                // Reset so the next Play starts from the first frame.
                if source.info().total_frames > 0 {
                    match source.seek(0) {
                        Ok(frame) => {
                            let _ = event_tx.blocking_send(PlaybackEvent::FrameReady(frame));
                        }
                        Err(e) => {
                            let _ = event_tx.blocking_send(PlaybackEvent::Error(e.to_string()));
                        }
                    }
                }
            }
            Ok(PlaybackCommand::Seek { index }) => match source.seek(index) {
                Ok(frame) => {
                    if event_tx
                        .blocking_send(PlaybackEvent::FrameReady(frame))
                        .is_err()
                    {
                        break;
                    }
                }
                Err(e) => {
                    playing = false;
                    let _ = event_tx.blocking_send(PlaybackEvent::Error(e.to_string()));
                }
            },
            Ok(PlaybackCommand::SetRate { fps }) => {
                tick_interval = PlaybackRate::new(fps).tick_interval();
            }
            Ok(PlaybackCommand::Shutdown) => break,
            Err(mpsc::error::TryRecvError::Disconnected) => break,
            Err(mpsc::error::TryRecvError::Empty) => {}
        }

        // If not playing, yield to avoid busy-waiting
        if !playing {
            std::thread::sleep(Duration::from_millis(10));
            continue;
        }

        // One tick: decode, publish, pace.
        let tick_started = Instant::now();
        match source.read_sequential() {
            Ok(Some(frame)) => {
                if event_tx
                    .blocking_send(PlaybackEvent::FrameReady(frame))
                    .is_err()
                {
                    // Event channel closed
                    break;
                }
                let elapsed = tick_started.elapsed();
                if elapsed < tick_interval {
                    std::thread::sleep(tick_interval - elapsed);
                }
            }
            Ok(None) => {
                playing = false;
                let _ = event_tx.blocking_send(PlaybackEvent::EndOfStream);
            }
            Err(e) => {
                playing = false;
                let _ = event_tx.blocking_send(PlaybackEvent::Error(e.to_string()));
            }
        }
    }

    Ok(())
}
