// SPDX-License-Identifier: MPL-2.0
//! Grayscale intensity histograms over frames and whole videos.
//!
//! Frames are reduced to single-channel intensity with the same BT.601
//! conversion the grayscale filter uses, then binned into 256 buckets
//! covering `[0, 256)`. Per-frame histograms hold exact integral counts;
//! the whole-video histogram is their elementwise sum, accumulated as
//! `f64` so long videos cannot overflow a counter.

use crate::error::Result;
use crate::media::Frame;
use crate::source::FrameSource;

/// Number of intensity buckets.
pub const HISTOGRAM_BINS: usize = 256;

/// A 256-bin grayscale intensity histogram.
///
/// Bin `i` counts pixels with intensity `i`. Values are non-negative;
/// they are integral for a single frame and accumulated reals for a
/// whole video.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    bins: Vec<f64>,
}

impl Histogram {
    /// Creates an empty histogram with all bins at zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bins: vec![0.0; HISTOGRAM_BINS],
        }
    }

    /// Returns the count in the given intensity bucket.
    ///
    /// # Panics
    ///
    /// Panics if `bucket >= 256`.
    #[must_use]
    pub fn bin(&self, bucket: usize) -> f64 {
        self.bins[bucket]
    }

    /// Borrows all 256 bins, indexed by intensity.
    #[must_use]
    pub fn bins(&self) -> &[f64] {
        &self.bins
    }

    /// Adds another histogram into this one, elementwise.
    pub fn merge(&mut self, other: &Histogram) {
        for (own, other) in self.bins.iter_mut().zip(other.bins.iter()) {
            *own += other;
        }
    }

    /// Sum of all bins (the number of weighted pixels counted).
    #[must_use]
    pub fn total(&self) -> f64 {
        self.bins.iter().sum()
    }

    fn count(&mut self, intensity: u8) {
        self.bins[usize::from(intensity)] += 1.0;
    }
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

/// Computes the intensity histogram of a single frame.
#[must_use]
pub fn frame_histogram(frame: &Frame) -> Histogram {
    let mut histogram = Histogram::new();
    for pixel in frame.to_luma().pixels() {
        histogram.count(pixel.0[0]);
    }
    histogram
}

/// Computes the intensity histogram of the whole video.
///
/// Reads every frame from index 0 to the end, in order, through a fresh
/// handle so the source's own cursor is untouched. The result equals the
/// elementwise sum of [`frame_histogram`] over all frames.
///
/// This is an O(total_frames) full decode of the video and can take a
/// while on long files; consider running it on a blocking task.
pub fn video_histogram(source: &FrameSource) -> Result<Histogram> {
    let mut reader = source.reopen()?;
    let mut histogram = Histogram::new();

    while let Some(frame) = reader.read_sequential()? {
        histogram.merge(&frame_histogram(&frame));
    }

    Ok(histogram)
}
