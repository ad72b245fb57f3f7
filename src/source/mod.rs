// SPDX-License-Identifier: MPL-2.0
//! Frame access: decoding video files into an indexable frame sequence.
//!
//! [`FrameSource`] wraps FFmpeg's demuxer and video decoder behind two
//! access paths: cheap sequential reads and random-access seeks by frame
//! index. Seeks land on the nearest preceding keyframe and decode forward,
//! so arbitrary seeks are markedly more expensive than sequential reads;
//! a bounded LRU cache absorbs repeated seeks over the same region.
//!
//! A `FrameSource` owns the underlying decode handle exclusively and allows
//! one in-flight decode operation at a time; both are enforced by the
//! `&mut self` receivers.

pub mod frame_cache;

pub use frame_cache::{CacheConfig, CacheStats, FrameCache};

use crate::error::{Error, OpenError, Result};
use crate::media::Frame;
use std::path::{Path, PathBuf};
use std::sync::Once;

/// Static flag to ensure FFmpeg is initialized only once.
static FFMPEG_INIT: Once = Once::new();

/// Initialize FFmpeg with appropriate log level.
///
/// This function is safe to call multiple times - initialization will only
/// happen once thanks to `std::sync::Once`. It sets the FFmpeg log level
/// to ERROR to suppress warning messages on slightly malformed containers.
pub fn init_ffmpeg() -> Result<()> {
    let mut init_result: Result<()> = Ok(());

    FFMPEG_INIT.call_once(|| {
        if let Err(e) = ffmpeg_next::init() {
            init_result = Err(Error::Io(format!("FFmpeg initialization failed: {e}")));
            return;
        }

        // SAFETY: av_log_set_level is thread-safe and only affects logging
        unsafe {
            ffmpeg_next::ffi::av_log_set_level(ffmpeg_next::ffi::AV_LOG_ERROR);
        }
    });

    init_result
}

/// Metadata of an open video, captured eagerly at open time.
///
/// Immutable for the lifetime of the [`FrameSource`] that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoInfo {
    /// Path the video was opened from.
    pub path: PathBuf,
    /// Total number of frames. Zero for degenerate/unreadable streams.
    pub total_frames: u64,
    /// Native frame rate in frames per second.
    pub fps: f64,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
}

/// FFmpeg decode machinery for one open video.
struct DecodeState {
    ictx: ffmpeg_next::format::context::Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: ffmpeg_next::software::scaling::Context,
    stream_index: usize,
    /// Seconds per PTS unit of the video stream.
    time_base: f64,
    /// Frame index the decoder will produce on the next sequential decode.
    decode_pos: u64,
    eof_sent: bool,
}

/// Decodes frames from a video file with sequential and random access.
pub struct FrameSource {
    info: VideoInfo,
    state: Option<DecodeState>,
    /// Logical position: index of the next sequential frame.
    cursor: u64,
    cache: FrameCache,
    cache_config: CacheConfig,
}

impl FrameSource {
    /// Opens a video file with the default seek cache.
    ///
    /// Metadata (frame count, fps, dimensions) is read eagerly; a missing
    /// file, unreadable container, or unsupported codec fails here rather
    /// than on first read.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_cache(path, CacheConfig::default())
    }

    /// Opens a video file with an explicit cache configuration.
    pub fn open_with_cache<P: AsRef<Path>>(path: P, cache_config: CacheConfig) -> Result<Self> {
        init_ffmpeg()?;

        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(Error::Open(OpenError::IoError(format!(
                "No such file: {}",
                path.display()
            ))));
        }

        let ictx = ffmpeg_next::format::input(&path)
            .map_err(|e| Error::Open(OpenError::from_ffmpeg(&e)))?;

        let (stream_index, time_base, fps, stream_frames, stream_duration) = {
            let input = ictx
                .streams()
                .best(ffmpeg_next::media::Type::Video)
                .ok_or(Error::Open(OpenError::NoVideoStream))?;

            let time_base = input.time_base();
            let time_base_f64 =
                f64::from(time_base.numerator()) / f64::from(time_base.denominator());

            let frame_rate = input.avg_frame_rate();
            let fps = if frame_rate.denominator() != 0 {
                f64::from(frame_rate.numerator()) / f64::from(frame_rate.denominator())
            } else {
                0.0
            };

            (
                input.index(),
                time_base_f64,
                fps,
                input.frames(),
                input.duration(),
            )
        };

        if !(fps > 0.0) {
            return Err(Error::Open(OpenError::Other(
                "Video stream reports no frame rate".to_string(),
            )));
        }

        let parameters = ictx
            .stream(stream_index)
            .map(|s| s.parameters())
            .ok_or(Error::Open(OpenError::NoVideoStream))?;

        let context_decoder = ffmpeg_next::codec::context::Context::from_parameters(parameters)
            .map_err(|e| Error::Open(OpenError::from_ffmpeg(&e)))?;
        let decoder = context_decoder
            .decoder()
            .video()
            .map_err(|e| Error::Open(OpenError::from_ffmpeg(&e)))?;

        let width = decoder.width();
        let height = decoder.height();
        if width == 0 || height == 0 {
            return Err(Error::Open(OpenError::Other(format!(
                "Invalid video dimensions: {width}x{height} (possibly unsupported format)"
            ))));
        }

        // Frame count: trust the container when it records one, otherwise
        // estimate from the duration and the native frame rate.
        let total_frames = if stream_frames > 0 {
            stream_frames as u64
        } else {
            let duration_secs = if stream_duration > 0 {
                stream_duration as f64 * time_base
            } else if ictx.duration() > 0 {
                ictx.duration() as f64 / f64::from(ffmpeg_next::ffi::AV_TIME_BASE)
            } else {
                0.0
            };
            (duration_secs * fps).round().max(0.0) as u64
        };

        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )
        .map_err(|e| Error::Open(OpenError::from_ffmpeg(&e)))?;

        let info = VideoInfo {
            path,
            total_frames,
            fps,
            width,
            height,
        };

        Ok(Self {
            info,
            state: Some(DecodeState {
                ictx,
                decoder,
                scaler,
                stream_index,
                time_base,
                decode_pos: 0,
                eof_sent: false,
            }),
            cursor: 0,
            cache: FrameCache::new(cache_config),
            cache_config,
        })
    }

    /// Returns the video metadata.
    #[must_use]
    pub fn info(&self) -> &VideoInfo {
        &self.info
    }

    /// Index of the next frame a sequential read will return.
    #[must_use]
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Returns true until [`FrameSource::close`] is called.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state.is_some()
    }

    /// Returns a snapshot of the seek cache statistics.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Opens a fresh handle on the same file with an independent cursor.
    ///
    /// Long whole-video operations (export, histogram accumulation) read
    /// through a reopened handle so the original cursor stays untouched.
    pub fn reopen(&self) -> Result<Self> {
        Self::open_with_cache(&self.info.path, self.cache_config)
    }

    /// Decodes the next frame in sequence, or `None` at end of stream.
    ///
    /// This is the cheap default access path. If a cache-served seek left
    /// the decoder behind the logical cursor, the decoder is repositioned
    /// first, then the read proceeds.
    pub fn read_sequential(&mut self) -> Result<Option<Frame>> {
        let total = self.info.total_frames;
        let target = self.cursor;
        let fps = self.info.fps;
        let state = self
            .state
            .as_mut()
            .ok_or_else(|| Error::Playback("frame source is closed".to_string()))?;

        if total > 0 && target >= total {
            return Ok(None);
        }

        let decoded = if state.decode_pos == target {
            decode_one(state, target)?
        } else {
            // Decode cursor diverged from the logical cursor (cache-served
            // seek); reposition before reading.
            Some((position_decoder(state, fps, target)?, false))
        };

        match decoded {
            Some((frame, is_keyframe)) => {
                if is_keyframe {
                    self.cache.insert(frame.clone());
                }
                self.cursor = target + 1;
                Ok(Some(frame))
            }
            None => Ok(None),
        }
    }

    /// Seeks to a frame index and decodes that frame.
    ///
    /// Out-of-range indices on a healthy source are clamped to
    /// `[0, total_frames - 1]` rather than failing; only a zero-frame
    /// source produces [`Error::OutOfRange`]. After a seek the next
    /// sequential read returns the following frame.
    pub fn seek(&mut self, index: i64) -> Result<Frame> {
        let total = self.info.total_frames;
        let fps = self.info.fps;
        let state = self
            .state
            .as_mut()
            .ok_or_else(|| Error::Playback("frame source is closed".to_string()))?;

        if total == 0 {
            return Err(Error::OutOfRange(
                "cannot seek in a zero-frame video".to_string(),
            ));
        }

        let clamped = index.clamp(0, (total - 1) as i64) as u64;

        if let Some(frame) = self.cache.get(clamped) {
            self.cursor = clamped + 1;
            return Ok(frame);
        }

        // When the decoder already sits at the target, one sequential
        // decode is cheaper than a demuxer seek.
        let frame = if state.decode_pos == clamped {
            match decode_one(state, clamped)? {
                Some((frame, _)) => frame,
                None => {
                    return Err(Error::Playback(
                        "stream ended before reaching the requested frame".to_string(),
                    ))
                }
            }
        } else {
            position_decoder(state, fps, clamped)?
        };

        self.cache.insert(frame.clone());
        self.cursor = clamped + 1;
        Ok(frame)
    }

    /// Releases the decode resources. Idempotent; safe to call repeatedly.
    ///
    /// Dropping the source has the same effect, so the handle is released
    /// exactly once on every exit path.
    pub fn close(&mut self) {
        self.state = None;
        self.cache.clear();
    }
}

/// Pulls the next undecoded frame out of the decoder, feeding packets from
/// the demuxer as needed. Returns `None` once the stream is drained.
fn decode_next_raw(state: &mut DecodeState) -> Result<Option<ffmpeg_next::frame::Video>> {
    let mut decoded = ffmpeg_next::frame::Video::empty();
    loop {
        if state.decoder.receive_frame(&mut decoded).is_ok() {
            return Ok(Some(decoded));
        }
        if state.eof_sent {
            return Ok(None);
        }

        let mut sent = false;
        for (stream, packet) in state.ictx.packets() {
            if stream.index() == state.stream_index {
                state
                    .decoder
                    .send_packet(&packet)
                    .map_err(|e| Error::Playback(format!("Packet send failed: {e}")))?;
                sent = true;
                break;
            }
        }
        if !sent {
            // Demuxer exhausted; drain the decoder's remaining frames.
            let _ = state.decoder.send_eof();
            state.eof_sent = true;
        }
    }
}

/// Decodes exactly one frame at the decoder's current position and tags it
/// with `index`. Returns the frame plus whether it was a keyframe.
fn decode_one(state: &mut DecodeState, index: u64) -> Result<Option<(Frame, bool)>> {
    match decode_next_raw(state)? {
        Some(decoded) => {
            let is_keyframe = decoded.is_key();
            let frame = scale_to_frame(state, &decoded, index)?;
            state.decode_pos = index + 1;
            Ok(Some((frame, is_keyframe)))
        }
        None => Ok(None),
    }
}

/// Seeks the demuxer to `target` and decodes forward from the landing
/// keyframe until the target frame is reached.
fn position_decoder(state: &mut DecodeState, fps: f64, target: u64) -> Result<Frame> {
    let target_secs = target as f64 / fps;
    // Seek in AV_TIME_BASE units; RangeTo allows landing on the nearest
    // preceding keyframe.
    let timestamp = (target_secs * f64::from(ffmpeg_next::ffi::AV_TIME_BASE)) as i64;
    state
        .ictx
        .seek(timestamp, ..timestamp)
        .map_err(|e| Error::Playback(format!("Seek failed: {e}")))?;
    state.decoder.flush();
    state.eof_sent = false;

    loop {
        match decode_next_raw(state)? {
            Some(decoded) => {
                let landed = frame_index_of(&decoded, state.time_base, fps);
                if landed >= target {
                    let frame = scale_to_frame(state, &decoded, target)?;
                    state.decode_pos = target + 1;
                    return Ok(frame);
                }
            }
            None => {
                return Err(Error::Playback(
                    "stream ended before reaching the requested frame".to_string(),
                ))
            }
        }
    }
}

/// Computes the frame index of a decoded frame from its timestamp.
fn frame_index_of(decoded: &ffmpeg_next::frame::Video, time_base: f64, fps: f64) -> u64 {
    let pts_secs = decoded.timestamp().unwrap_or(0) as f64 * time_base;
    (pts_secs * fps).round().max(0.0) as u64
}

/// Converts a decoded frame to RGB24 and wraps it as a [`Frame`].
fn scale_to_frame(
    state: &mut DecodeState,
    decoded: &ffmpeg_next::frame::Video,
    index: u64,
) -> Result<Frame> {
    let mut rgb_frame = ffmpeg_next::frame::Video::empty();
    state
        .scaler
        .run(decoded, &mut rgb_frame)
        .map_err(|e| Error::Playback(format!("Scaling failed: {e}")))?;

    let width = rgb_frame.width();
    let height = rgb_frame.height();
    let data = rgb_frame.data(0);
    let stride = rgb_frame.stride(0);

    // Copy row by row; the scaler's stride may exceed width * 3.
    let mut rgb_bytes = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        let row_start = y as usize * stride;
        let row_end = row_start + (width * 3) as usize;
        rgb_bytes.extend_from_slice(&data[row_start..row_end]);
    }

    Frame::from_raw(width, height, rgb_bytes, index)
        .ok_or_else(|| Error::Playback("Decoded frame has inconsistent dimensions".to_string()))
}
