//! Media information types.

use mp4forge_encoder::SourceInfo;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Information about a media file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Path to the media file.
    pub file_path: PathBuf,
    /// File size in bytes.
    pub file_size: u64,
    /// Container format as reported by ffprobe (e.g. "matroska,webm").
    pub container: String,
    /// Duration of the media.
    pub duration: Option<Duration>,
    /// Video tracks in the file.
    pub video_tracks: Vec<VideoTrack>,
    /// Audio tracks in the file.
    pub audio_tracks: Vec<AudioTrack>,
}

/// Information about a video track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoTrack {
    /// Track index among the video tracks.
    pub index: u32,
    /// Video codec (e.g. "h264", "vp8").
    pub codec: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Frame rate in FPS.
    pub frame_rate: Option<f64>,
}

/// Information about an audio track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioTrack {
    /// Track index among the audio tracks.
    pub index: u32,
    /// Audio codec (e.g. "aac", "opus").
    pub codec: String,
    /// Number of channels.
    pub channels: u32,
    /// Sample rate in Hz.
    pub sample_rate: Option<u32>,
}

impl MediaInfo {
    /// Get the primary (first) video track.
    pub fn primary_video(&self) -> Option<&VideoTrack> {
        self.video_tracks.first()
    }

    /// Get the primary (first) audio track.
    pub fn primary_audio(&self) -> Option<&AudioTrack> {
        self.audio_tracks.first()
    }

    /// What the encoder needs to know about this file.
    ///
    /// Zero dimensions are treated as unknown.
    pub fn source_info(&self) -> SourceInfo {
        let Some(video) = self.primary_video() else {
            return SourceInfo::default();
        };

        SourceInfo {
            width: Some(video.width).filter(|w| *w > 0),
            height: Some(video.height).filter(|h| *h > 0),
            frame_rate: video.frame_rate,
        }
    }
}
