// SPDX-License-Identifier: MPL-2.0
//! Playback rate domain type.
//!
//! This module provides a type-safe wrapper for playback rates in frames
//! per second, ensuring they are always positive and within the supported
//! range. The rate is independent of the file's native frame rate.

use crate::config::{DEFAULT_PLAYBACK_FPS, MAX_PLAYBACK_FPS, MIN_PLAYBACK_FPS};
use std::time::Duration;

/// Playback rate in frames per second, guaranteed to be within the valid
/// range.
///
/// This newtype enforces validity at the type level, making it impossible
/// to schedule ticks from a zero, negative, or non-finite rate.
///
/// # Example
///
/// ```
/// use vidlens::playback::PlaybackRate;
///
/// let rate = PlaybackRate::new(25.0);
/// assert_eq!(rate.value(), 25.0);
///
/// // Values outside range are clamped
/// let too_fast = PlaybackRate::new(100_000.0);
/// assert_eq!(too_fast.value(), 240.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackRate(f64);

impl PlaybackRate {
    /// Creates a new playback rate, clamping to the valid range.
    ///
    /// Non-finite inputs fall back to the default rate.
    #[must_use]
    pub fn new(fps: f64) -> Self {
        if !fps.is_finite() {
            return Self(DEFAULT_PLAYBACK_FPS);
        }
        Self(fps.clamp(MIN_PLAYBACK_FPS, MAX_PLAYBACK_FPS))
    }

    /// Returns the rate in frames per second.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Returns the interval between two playback ticks at this rate.
    #[must_use]
    pub fn tick_interval(self) -> Duration {
        Duration::from_secs_f64(1.0 / self.0)
    }
}

impl Default for PlaybackRate {
    fn default() -> Self {
        Self(DEFAULT_PLAYBACK_FPS)
    }
}
