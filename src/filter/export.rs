// SPDX-License-Identifier: MPL-2.0
//! Filtered-video export: apply a filter to every frame and encode the
//! result to a new file.
//!
//! The export reads through a fresh handle on the source path, so the
//! caller's cursor and the original file are never touched. Output frames
//! must keep the source geometry; the container requires uniform frame
//! sizes, so the first mismatch aborts the export instead of silently
//! truncating. A failed export may leave a partial output file behind but
//! always reports the failure.

use crate::error::{Error, Result};
use crate::filter::FrameFilter;
use crate::media::Frame;
use crate::source::FrameSource;
use std::path::Path;

/// Applies `filter` to every frame of `source` and encodes the result to
/// `output_path` at the source's native frame rate and dimensions.
///
/// This is a synchronous O(total_frames) full decode and re-encode;
/// consider running it on a blocking task so it does not stall playback.
///
/// # Errors
///
/// Fails with [`Error::Export`] when the output container cannot be
/// created, a filtered frame changes geometry, or encoding/writing fails.
pub fn export_filtered<P: AsRef<Path>>(
    source: &FrameSource,
    filter: &dyn FrameFilter,
    output_path: P,
) -> Result<()> {
    let output_path = output_path.as_ref();
    let info = source.info().clone();

    if info.total_frames == 0 {
        return Err(Error::Export(
            "source video has no frames to export".to_string(),
        ));
    }

    // Independent read cursor; the caller's source position stays put.
    let mut reader = source.reopen()?;

    let mut octx = ffmpeg_next::format::output(&output_path)
        .map_err(|e| Error::Export(format!("Failed to create output container: {e}")))?;

    let codec_id = octx
        .format()
        .codec(&output_path, ffmpeg_next::media::Type::Video);
    let codec = ffmpeg_next::encoder::find(codec_id).ok_or_else(|| {
        Error::Export("No video encoder available for the output format".to_string())
    })?;

    let global_header = octx
        .format()
        .flags()
        .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

    let ost_index = {
        let ost = octx
            .add_stream(codec)
            .map_err(|e| Error::Export(format!("Failed to add output stream: {e}")))?;
        ost.index()
    };

    // Encoder time base: one tick per frame at the source rate, with
    // millihertz resolution to keep fractional rates exact.
    let fps_millis = ((info.fps * 1000.0).round() as i32).max(1);
    let time_base = ffmpeg_next::Rational::new(1000, fps_millis);

    let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
        .encoder()
        .video()
        .map_err(|e| Error::Export(format!("Failed to create encoder: {e}")))?;
    encoder_ctx.set_width(info.width);
    encoder_ctx.set_height(info.height);
    encoder_ctx.set_format(ffmpeg_next::format::Pixel::YUV420P);
    encoder_ctx.set_time_base(time_base);
    encoder_ctx.set_frame_rate(Some(ffmpeg_next::Rational::new(fps_millis, 1000)));
    if global_header {
        encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
    }

    let mut encoder = encoder_ctx
        .open_as(codec)
        .map_err(|e| Error::Export(format!("Failed to open encoder: {e}")))?;

    if let Some(mut ost) = octx.stream_mut(ost_index) {
        ost.set_parameters(&encoder);
    }

    octx.write_header()
        .map_err(|e| Error::Export(format!("Failed to write container header: {e}")))?;

    let ost_time_base = octx
        .stream(ost_index)
        .map(|s| s.time_base())
        .unwrap_or(time_base);

    let mut scaler = ffmpeg_next::software::scaling::Context::get(
        ffmpeg_next::format::Pixel::RGB24,
        info.width,
        info.height,
        ffmpeg_next::format::Pixel::YUV420P,
        info.width,
        info.height,
        ffmpeg_next::software::scaling::Flags::BILINEAR,
    )
    .map_err(|e| Error::Export(format!("Failed to create scaler: {e}")))?;

    for index in 0..info.total_frames {
        let frame = match reader.read_sequential() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                return Err(Error::Export(format!(
                    "Stream ended early at frame {index} of {}",
                    info.total_frames
                )))
            }
            Err(e) => return Err(Error::Export(format!("Decoding frame {index} failed: {e}"))),
        };

        let filtered = filter.apply(&frame);
        if filtered.width() != info.width || filtered.height() != info.height {
            return Err(Error::Export(format!(
                "Filter changed frame geometry at frame {index}: expected {}x{}, got {}x{}",
                info.width,
                info.height,
                filtered.width(),
                filtered.height()
            )));
        }

        let mut rgb = ffmpeg_next::frame::Video::new(
            ffmpeg_next::format::Pixel::RGB24,
            info.width,
            info.height,
        );
        copy_rgb_into(&filtered, &mut rgb);

        let mut yuv = ffmpeg_next::frame::Video::empty();
        scaler
            .run(&rgb, &mut yuv)
            .map_err(|e| Error::Export(format!("Scaling frame {index} failed: {e}")))?;
        yuv.set_pts(Some(index as i64));

        encoder
            .send_frame(&yuv)
            .map_err(|e| Error::Export(format!("Encoding frame {index} failed: {e}")))?;
        write_encoded_packets(&mut encoder, &mut octx, ost_index, time_base, ost_time_base)?;
    }

    encoder
        .send_eof()
        .map_err(|e| Error::Export(format!("Failed to flush encoder: {e}")))?;
    write_encoded_packets(&mut encoder, &mut octx, ost_index, time_base, ost_time_base)?;

    octx.write_trailer()
        .map_err(|e| Error::Export(format!("Failed to finalize output file: {e}")))?;

    Ok(())
}

/// Copies a frame's RGB24 pixels into an FFmpeg frame, honoring its stride.
fn copy_rgb_into(frame: &Frame, dst: &mut ffmpeg_next::frame::Video) {
    let width = frame.width() as usize;
    let height = frame.height() as usize;
    let stride = dst.stride(0);
    let data = dst.data_mut(0);
    let src = frame.image().as_raw();

    for y in 0..height {
        let src_start = y * width * 3;
        let dst_start = y * stride;
        data[dst_start..dst_start + width * 3]
            .copy_from_slice(&src[src_start..src_start + width * 3]);
    }
}

/// Drains every packet the encoder has ready and writes it interleaved.
fn write_encoded_packets(
    encoder: &mut ffmpeg_next::encoder::Video,
    octx: &mut ffmpeg_next::format::context::Output,
    ost_index: usize,
    enc_time_base: ffmpeg_next::Rational,
    ost_time_base: ffmpeg_next::Rational,
) -> Result<()> {
    let mut packet = ffmpeg_next::Packet::empty();
    while encoder.receive_packet(&mut packet).is_ok() {
        packet.set_stream(ost_index);
        packet.rescale_ts(enc_time_base, ost_time_base);
        packet
            .write_interleaved(octx)
            .map_err(|e| Error::Export(format!("Failed to write packet: {e}")))?;
    }
    Ok(())
}
