// SPDX-License-Identifier: MPL-2.0
//! `vidlens` is a frame-accurate video playback and inspection engine.
//!
//! It wraps FFmpeg decoding behind an indexable, seekable frame source,
//! drives timed playback through a cancellable tick loop, applies per-frame
//! image filters, and computes grayscale intensity histograms.

#![doc(html_root_url = "https://docs.rs/vidlens/0.1.0")]

pub mod config;
pub mod error;
pub mod filter;
pub mod histogram;
pub mod media;
pub mod playback;
pub mod source;
