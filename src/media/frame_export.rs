// SPDX-License-Identifier: MPL-2.0
//! Still-image export for single video frames.
//!
//! Saves a decoded [`Frame`] to disk in PNG, JPEG, or WebP format using the
//! `image` crate. PNG is the lossless default.

use crate::error::{Error, Result};
use crate::media::Frame;
use image_rs::ImageFormat;
use std::path::Path;

/// Supported export formats for frame capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// PNG format (lossless, best quality).
    #[default]
    Png,
    /// JPEG format (lossy, smaller file size).
    Jpeg,
    /// WebP format (modern, good compression).
    WebP,
}

impl ExportFormat {
    /// Returns the file extension for this format.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::WebP => "webp",
        }
    }

    /// Returns the image format for the `image` crate.
    fn image_format(self) -> ImageFormat {
        match self {
            ExportFormat::Png => ImageFormat::Png,
            ExportFormat::Jpeg => ImageFormat::Jpeg,
            ExportFormat::WebP => ImageFormat::WebP,
        }
    }

    /// Returns a human-readable description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            ExportFormat::Png => "PNG (Lossless)",
            ExportFormat::Jpeg => "JPEG (Lossy)",
            ExportFormat::WebP => "WebP (Modern)",
        }
    }

    /// Returns all supported formats.
    #[must_use]
    pub fn all() -> &'static [ExportFormat] {
        &[ExportFormat::Png, ExportFormat::Jpeg, ExportFormat::WebP]
    }

    /// Detects format from file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<ExportFormat> {
        match ext.to_lowercase().as_str() {
            "png" => Some(ExportFormat::Png),
            "jpg" | "jpeg" => Some(ExportFormat::Jpeg),
            "webp" => Some(ExportFormat::WebP),
            _ => None,
        }
    }

    /// Detects format from file path extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<ExportFormat> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

/// Saves a frame to a file.
///
/// The format is determined by the file extension when not specified,
/// falling back to PNG for unknown extensions.
///
/// # Errors
///
/// Returns an error if the image cannot be encoded or written to disk.
pub fn save_frame<P: AsRef<Path>>(
    frame: &Frame,
    path: P,
    format: Option<ExportFormat>,
) -> Result<()> {
    let path = path.as_ref();
    let format = format
        .or_else(|| ExportFormat::from_path(path))
        .unwrap_or_default();

    frame
        .image()
        .save_with_format(path, format.image_format())
        .map_err(|e| Error::Io(format!("Failed to save frame: {e}")))
}

/// Generates a default filename for frame export.
///
/// Format: `{video_name}_frame_{index:06}.{ext}`
#[must_use]
pub fn generate_default_filename(
    video_path: &Path,
    frame_index: u64,
    format: ExportFormat,
) -> String {
    let video_name = video_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("video");

    format!(
        "{}_frame_{:06}.{}",
        video_name,
        frame_index,
        format.extension()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn export_format_extensions() {
        assert_eq!(ExportFormat::Png.extension(), "png");
        assert_eq!(ExportFormat::Jpeg.extension(), "jpg");
        assert_eq!(ExportFormat::WebP.extension(), "webp");
    }

    #[test]
    fn export_format_from_extension() {
        assert_eq!(ExportFormat::from_extension("png"), Some(ExportFormat::Png));
        assert_eq!(ExportFormat::from_extension("PNG"), Some(ExportFormat::Png));
        assert_eq!(
            ExportFormat::from_extension("jpg"),
            Some(ExportFormat::Jpeg)
        );
        assert_eq!(
            ExportFormat::from_extension("jpeg"),
            Some(ExportFormat::Jpeg)
        );
        assert_eq!(
            ExportFormat::from_extension("webp"),
            Some(ExportFormat::WebP)
        );
        assert_eq!(ExportFormat::from_extension("bmp"), None);
    }

    #[test]
    fn export_format_from_path_reads_extension() {
        assert_eq!(
            ExportFormat::from_path(Path::new("/tmp/shot.webp")),
            Some(ExportFormat::WebP)
        );
        assert_eq!(ExportFormat::from_path(Path::new("/tmp/noext")), None);
    }

    #[test]
    fn export_format_all_returns_three_formats() {
        assert_eq!(ExportFormat::all().len(), 3);
    }

    #[test]
    fn export_format_default_is_png() {
        assert_eq!(ExportFormat::default(), ExportFormat::Png);
    }

    #[test]
    fn generate_default_filename_formats_correctly() {
        let path = PathBuf::from("/videos/my_video.mp4");
        let filename = generate_default_filename(&path, 1234, ExportFormat::Png);
        assert_eq!(filename, "my_video_frame_001234.png");
    }

    #[test]
    fn generate_default_filename_handles_zero() {
        let path = PathBuf::from("video.mkv");
        let filename = generate_default_filename(&path, 0, ExportFormat::Jpeg);
        assert_eq!(filename, "video_frame_000000.jpg");
    }

    #[test]
    fn save_frame_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        let frame = Frame::filled(8, 8, [200, 100, 50], 0);

        save_frame(&frame, &path, None).unwrap();

        assert!(path.exists());
        let reloaded = image_rs::open(&path).unwrap().to_rgb8();
        assert_eq!(reloaded.width(), 8);
        assert_eq!(reloaded.get_pixel(0, 0).0, [200, 100, 50]);
    }

    #[test]
    fn save_frame_fails_for_unwritable_path() {
        let frame = Frame::filled(2, 2, [0, 0, 0], 0);
        let result = save_frame(&frame, "/nonexistent-dir/frame.png", None);
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
