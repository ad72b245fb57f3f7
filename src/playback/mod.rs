// SPDX-License-Identifier: MPL-2.0
//! Timed playback over a frame source.
//!
//! Playback is split into a pure transport state machine
//! ([`PlaybackController`]) and a background tick loop ([`PlaybackDriver`])
//! connected by command and event channels. The controller can be driven
//! and tested entirely without decoding; the driver owns the only
//! recurring schedule in the engine.

mod driver;
pub mod rate;
mod state;

pub use driver::{CommandSender, PlaybackCommand, PlaybackDriver, PlaybackEvent};
pub use rate::PlaybackRate;
pub use state::{PlaybackController, PlaybackState};
