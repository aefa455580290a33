//! Codec allow-lists and encoder name normalization.

use crate::{Error, Result};
use std::fmt;

/// Value that copies a stream without re-encoding it.
pub const PASSTHROUGH: &str = "copy";

/// Codec used when a profile names no audio codec.
pub const DEFAULT_AUDIO_CODEC: &str = "aac";

/// Codec used when a profile names no video codec.
pub const DEFAULT_VIDEO_CODEC: &str = "h264";

/// Kind of stream a codec applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serialize",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Medium {
    Audio,
    Video,
}

impl Medium {
    pub fn as_str(&self) -> &'static str {
        match self {
            Medium::Audio => "audio",
            Medium::Video => "video",
        }
    }

    /// The ffmpeg flag that selects this medium's encoder.
    pub fn codec_flag(&self) -> &'static str {
        match self {
            Medium::Audio => "-c:a",
            Medium::Video => "-c:v",
        }
    }
}

impl fmt::Display for Medium {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a codec value requests stream copy.
pub fn is_passthrough(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case(PASSTHROUGH)
}

/// Map a codec value onto the encoder name ffmpeg expects.
///
/// `copy` and native encoder names pass through unchanged; known aliases
/// collapse onto one canonical encoder per medium.
///
/// ```
/// use mp4forge_encoder::codec::{normalize, Medium};
///
/// assert_eq!(normalize(Medium::Video, "h264")?, "libx264");
/// assert_eq!(normalize(Medium::Audio, "copy")?, "copy");
/// assert!(normalize(Medium::Audio, "vorbis").is_err());
/// # Ok::<(), mp4forge_encoder::Error>(())
/// ```
pub fn normalize(medium: Medium, value: &str) -> Result<&'static str> {
    let key = value.trim().to_ascii_lowercase();
    if key == PASSTHROUGH {
        return Ok(PASSTHROUGH);
    }

    let canonical = match medium {
        Medium::Audio => match key.as_str() {
            "aac" | "libfaac" | "mp4a" => Some("aac"),
            "libfdk_aac" => Some("libfdk_aac"),
            _ => None,
        },
        Medium::Video => match key.as_str() {
            "h264" | "avc" | "x264" | "libx264" => Some("libx264"),
            _ => None,
        },
    };

    canonical.ok_or_else(|| {
        #[cfg(feature = "tracing")]
        tracing::error!(medium = %medium, codec = %value, "unsupported codec");

        Error::unsupported_codec(medium, value)
    })
}
