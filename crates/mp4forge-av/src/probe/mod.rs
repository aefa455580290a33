//! Media file probing.
//!
//! Only ffprobe is supported. The encoder needs the first video stream's
//! frame size and frame rate; everything else is informational.

mod ffprobe;
mod types;

pub use ffprobe::{parse_ffprobe_json, parse_frame_rate, probe_with_ffprobe};
pub use types::*;

use crate::Result;
use std::path::Path;

/// Default ffprobe binary, resolved through PATH.
pub const FFPROBE: &str = "ffprobe";

/// Probe a media file with the ffprobe found on PATH.
pub fn probe(path: &Path) -> Result<MediaInfo> {
    probe_with_ffprobe(Path::new(FFPROBE), path)
}
