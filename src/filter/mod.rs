// SPDX-License-Identifier: MPL-2.0
//! Per-frame image filters and the filtered-video pipeline.
//!
//! Filters are first-class values: anything implementing [`FrameFilter`]
//! (every `Fn(&Frame) -> Frame` closure or function does) can be handed to
//! [`preview`] for a transient single-frame application or to
//! [`export_filtered`] to rewrite a whole video into a new file. The
//! pipeline never dispatches on filter names; callers pass the capability
//! itself.

mod builtin;
mod export;

pub use builtin::{
    blur, edge_detect, flip_horizontal, flip_vertical, grayscale, invert, sharpen, ColorAdjust,
};
pub use export::export_filtered;

use crate::media::Frame;

/// A pure per-frame transformation.
///
/// Implementations must be deterministic given the input frame and their
/// own parameters, and should preserve frame dimensions; the video export
/// path rejects geometry changes.
pub trait FrameFilter: Send + Sync {
    /// Applies the filter to one frame, returning a new frame.
    fn apply(&self, frame: &Frame) -> Frame;
}

impl<F> FrameFilter for F
where
    F: Fn(&Frame) -> Frame + Send + Sync,
{
    fn apply(&self, frame: &Frame) -> Frame {
        self(frame)
    }
}

/// Applies a filter to a single frame for preview.
///
/// Pure and synchronous: no I/O, no caching, and the input frame is left
/// untouched. The result carries the input's frame index.
#[must_use]
pub fn preview(frame: &Frame, filter: &dyn FrameFilter) -> Frame {
    filter.apply(frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_filters() {
        let identity = |frame: &Frame| frame.clone();
        let frame = Frame::filled(4, 4, [1, 2, 3], 9);

        let result = preview(&frame, &identity);
        assert_eq!(result, frame);
    }

    #[test]
    fn named_builtins_are_filters() {
        let frame = Frame::filled(4, 4, [10, 20, 30], 0);
        let result = preview(&frame, &invert);
        assert_eq!(result.image().get_pixel(0, 0).0, [245, 235, 225]);
    }

    #[test]
    fn preview_keeps_the_frame_index() {
        let frame = Frame::filled(2, 2, [0, 0, 0], 17);
        assert_eq!(preview(&frame, &grayscale).index(), 17);
    }

    #[test]
    fn preview_does_not_mutate_the_input() {
        let frame = Frame::filled(2, 2, [50, 60, 70], 0);
        let copy = frame.clone();
        let _ = preview(&frame, &invert);
        assert_eq!(frame, copy);
    }

    #[test]
    fn filters_compose() {
        let frame = Frame::filled(4, 4, [10, 20, 30], 0);
        let flipped_inverted = preview(&preview(&frame, &flip_horizontal), &invert);
        assert_eq!(flipped_inverted.width(), 4);
        assert_eq!(flipped_inverted.image().get_pixel(0, 0).0, [245, 235, 225]);
    }
}
