// SPDX-License-Identifier: MPL-2.0
//! Error types for the playback engine.
//!
//! All operations return [`Result`]. Background loops never panic on decode
//! failures; they convert them into events carrying these errors instead.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A video file could not be opened or is not decodable.
    Open(OpenError),

    /// A seek or play operation was attempted on a zero-frame source.
    ///
    /// Seeks on a healthy source never produce this error; out-of-range
    /// indices are clamped instead.
    OutOfRange(String),

    /// Decoding failed mid-stream during playback or sequential reading.
    Playback(String),

    /// A filtered-video export failed (geometry mismatch or write failure).
    Export(String),

    /// A frame step was requested while the tick loop is running.
    Busy(&'static str),

    /// Generic I/O failure.
    Io(String),

    /// Configuration could not be read or written.
    Config(String),
}

/// Specific reasons a video file failed to open.
///
/// Categorized from the decoder's error values so callers can present
/// a meaningful message without string-matching themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenError {
    /// Container format is not recognized by the decoder.
    UnsupportedFormat,

    /// Video codec is not supported by the system's FFmpeg.
    UnsupportedCodec(String),

    /// File exists but its contents are invalid or truncated.
    CorruptedFile,

    /// File exists but contains no video stream.
    NoVideoStream,

    /// I/O error (file not found, permission denied, etc.)
    IoError(String),

    /// Generic error with raw message.
    Other(String),
}

impl OpenError {
    /// Categorizes an FFmpeg error raised while opening a file.
    pub fn from_ffmpeg(err: &ffmpeg_next::Error) -> Self {
        use ffmpeg_next::Error as Ff;
        match err {
            Ff::InvalidData => OpenError::CorruptedFile,
            Ff::DecoderNotFound => OpenError::UnsupportedCodec("unknown".to_string()),
            Ff::DemuxerNotFound | Ff::ProtocolNotFound => OpenError::UnsupportedFormat,
            Ff::StreamNotFound => OpenError::NoVideoStream,
            Ff::Eof => OpenError::CorruptedFile,
            Ff::Other { errno } => OpenError::IoError(format!("errno {errno}")),
            other => OpenError::Other(other.to_string()),
        }
    }
}

impl fmt::Display for OpenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpenError::UnsupportedFormat => write!(f, "Unsupported video format"),
            OpenError::UnsupportedCodec(codec) => {
                write!(f, "Unsupported video codec: {}", codec)
            }
            OpenError::CorruptedFile => write!(f, "Video file is corrupted"),
            OpenError::NoVideoStream => write!(f, "No video stream found"),
            OpenError::IoError(msg) => write!(f, "I/O error: {}", msg),
            OpenError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Open(e) => write!(f, "Open Error: {}", e),
            Error::OutOfRange(e) => write!(f, "Out of Range: {}", e),
            Error::Playback(e) => write!(f, "Playback Error: {}", e),
            Error::Export(e) => write!(f, "Export Error: {}", e),
            Error::Busy(e) => write!(f, "Busy: {}", e),
            Error::Io(e) => write!(f, "I/O Error: {}", e),
            Error::Config(e) => write!(f, "Config Error: {}", e),
        }
    }
}

impl std::error::Error for Error {}

impl From<OpenError> for Error {
    fn from(err: OpenError) -> Self {
        Error::Open(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
