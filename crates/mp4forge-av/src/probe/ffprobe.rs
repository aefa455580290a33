//! FFprobe-based media probing.

use super::types::*;
use crate::runner::tool_name;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    format_name: Option<String>,
    duration: Option<String>,
    size: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    channels: Option<u32>,
    sample_rate: Option<String>,
}

/// Probe a media file using the given ffprobe binary.
pub fn probe_with_ffprobe(program: &Path, path: &Path) -> Result<MediaInfo> {
    if !path.exists() {
        return Err(Error::file_not_found(path));
    }

    let output = Command::new(program)
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .output()
        .map_err(|e| Error::from_spawn(&tool_name(program), e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::tool_failed(tool_name(program), stderr.trim().to_string()));
    }

    let json_str = String::from_utf8(output.stdout)
        .map_err(|e| Error::parse_error(tool_name(program), format!("Invalid UTF-8: {}", e)))?;

    parse_ffprobe_json(path, &json_str)
}

/// Parse the JSON document printed by `ffprobe -print_format json`.
pub fn parse_ffprobe_json(path: &Path, json: &str) -> Result<MediaInfo> {
    let output: FfprobeOutput = serde_json::from_str(json)?;
    Ok(parse_ffprobe_output(path, output))
}

fn parse_ffprobe_output(path: &Path, output: FfprobeOutput) -> MediaInfo {
    let format = output.format;
    let duration = format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(Duration::from_secs_f64);

    let mut info = MediaInfo {
        file_path: path.to_path_buf(),
        file_size: format
            .as_ref()
            .and_then(|f| f.size.as_deref())
            .and_then(|s| s.parse().ok())
            .unwrap_or(0),
        container: format.and_then(|f| f.format_name).unwrap_or_default(),
        duration,
        video_tracks: Vec::new(),
        audio_tracks: Vec::new(),
    };

    for stream in output.streams {
        match stream.codec_type.as_deref() {
            Some("video") => {
                info.video_tracks.push(VideoTrack {
                    index: info.video_tracks.len() as u32,
                    codec: stream.codec_name.unwrap_or_default(),
                    width: stream.width.unwrap_or(0),
                    height: stream.height.unwrap_or(0),
                    frame_rate: stream.r_frame_rate.as_deref().and_then(parse_frame_rate),
                });
            }
            Some("audio") => {
                info.audio_tracks.push(AudioTrack {
                    index: info.audio_tracks.len() as u32,
                    codec: stream.codec_name.unwrap_or_default(),
                    channels: stream.channels.unwrap_or(2),
                    sample_rate: stream.sample_rate.and_then(|s| s.parse().ok()),
                });
            }
            _ => {}
        }
    }

    info
}

/// Parse an ffprobe rate, either `num/den` or a plain decimal.
///
/// A zero denominator (ffprobe prints `0/0` for unknown rates) yields `None`.
pub fn parse_frame_rate(rate_str: &str) -> Option<f64> {
    if let Some((num, den)) = rate_str.split_once('/') {
        let num: f64 = num.trim().parse().ok()?;
        let den: f64 = den.trim().parse().ok()?;
        return (den != 0.0).then(|| num / den);
    }
    rate_str.trim().parse().ok().filter(|r: &f64| r.is_finite())
}
