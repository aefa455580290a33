//! # mp4forge-av
//!
//! The outside world for mp4forge: everything that spawns a process or
//! touches the filesystem.
//!
//! - [`probe`] reads frame size and rate from a source with ffprobe
//! - [`runner`] runs the compiled ffmpeg command and scans its stderr
//! - [`tools`] finds the binaries
//! - [`Workspace`] stages outputs until the encode succeeds
//!
//! ## Features
//!
//! - `tracing` - Enable tracing support
//!
//! ## Example
//!
//! ```no_run
//! use mp4forge_av::probe;
//!
//! let info = probe("/path/to/video.mkv")?;
//! let source = info.source_info();
//! println!("Source: {:?} at {:?} fps", source.dimensions(), source.frame_rate);
//! # Ok::<(), mp4forge_av::Error>(())
//! ```

mod error;
pub mod probe;
pub mod runner;
pub mod tools;
pub mod workspace;

// Re-exports
pub use error::{Error, Result};
pub use probe::{AudioTrack, MediaInfo, VideoTrack, FFPROBE};
pub use runner::{run, ToolOutput};
pub use tools::{check_tool, check_tools, get_tool_path, require_tool, Tool, ToolStatus};
pub use workspace::Workspace;

/// Probe a media file with the ffprobe found on PATH.
pub fn probe<P: AsRef<std::path::Path>>(path: P) -> Result<MediaInfo> {
    probe::probe(path.as_ref())
}

/// Probe a media file with a specific ffprobe binary.
pub fn probe_with<P: AsRef<std::path::Path>, Q: AsRef<std::path::Path>>(
    ffprobe: P,
    path: Q,
) -> Result<MediaInfo> {
    probe::probe_with_ffprobe(ffprobe.as_ref(), path.as_ref())
}
