//! Locating and checking ffmpeg and ffprobe.

use crate::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

/// The external programs mp4forge drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Ffmpeg,
    Ffprobe,
}

impl Tool {
    pub const ALL: [Tool; 2] = [Tool::Ffmpeg, Tool::Ffprobe];

    /// Executable name looked up on PATH.
    pub fn name(&self) -> &'static str {
        match self {
            Tool::Ffmpeg => "ffmpeg",
            Tool::Ffprobe => "ffprobe",
        }
    }

    /// What the tool is used for.
    pub fn purpose(&self) -> &'static str {
        match self {
            Tool::Ffmpeg => "runs the compiled encode commands",
            Tool::Ffprobe => "reads source frame size and frame rate",
        }
    }

    /// Whether `encode` cannot run without it.
    ///
    /// Without ffprobe the source is unknown, which only presets that copy
    /// the video stream tolerate; `compile --source` never needs it.
    pub fn required_for_encode(&self) -> bool {
        matches!(self, Tool::Ffmpeg)
    }

    /// Path to run: the configured one if it exists, else a PATH lookup.
    pub fn locate(&self, configured: Option<&Path>) -> Result<PathBuf> {
        get_tool_path(self.name(), configured)
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of checking one tool.
#[derive(Debug, Clone)]
pub struct ToolStatus {
    pub tool: Tool,
    /// Where the tool was found, if anywhere.
    pub path: Option<PathBuf>,
    /// Version reported by `-version`, if it ran.
    pub version: Option<String>,
}

impl ToolStatus {
    /// Found and answered `-version` successfully.
    pub fn available(&self) -> bool {
        self.version.is_some()
    }
}

/// Check one tool, honoring a configured path.
pub fn check_tool(tool: Tool, configured: Option<&Path>) -> ToolStatus {
    let path = tool.locate(configured).ok();
    let version = path.as_deref().and_then(version_of);

    #[cfg(feature = "tracing")]
    tracing::debug!(tool = %tool, path = ?path, version = ?version, "checked tool");

    ToolStatus {
        tool,
        path,
        version,
    }
}

/// Check ffmpeg and ffprobe.
///
/// # Example
///
/// ```no_run
/// use mp4forge_av::check_tools;
///
/// for status in check_tools(None, None) {
///     println!("{}: {:?}", status.tool, status.version);
/// }
/// ```
pub fn check_tools(ffmpeg: Option<&Path>, ffprobe: Option<&Path>) -> Vec<ToolStatus> {
    vec![
        check_tool(Tool::Ffmpeg, ffmpeg),
        check_tool(Tool::Ffprobe, ffprobe),
    ]
}

fn version_of(path: &Path) -> Option<String> {
    let output = Command::new(path).arg("-version").output().ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    Some(parse_version(stdout.lines().next().unwrap_or_default()))
}

/// Version from the first line of `-version` output.
///
/// `ffmpeg version 6.1.1-3ubuntu5 Copyright (c) ...` gives `6.1.1-3ubuntu5`;
/// anything else is returned trimmed.
pub fn parse_version(first_line: &str) -> String {
    let mut words = first_line.split_whitespace();
    while let Some(word) = words.next() {
        if word == "version" {
            if let Some(version) = words.next() {
                return version.to_string();
            }
        }
    }
    first_line.trim().to_string()
}

/// Require that a tool is on PATH, returning its path.
///
/// # Errors
///
/// Returns an error if the tool is not found.
pub fn require_tool(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| Error::tool_not_found(name))
}

/// Get the path to a tool, preferring a configured path over PATH lookup.
pub fn get_tool_path(name: &str, config_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = config_path {
        if path.exists() {
            return Ok(path.to_path_buf());
        }

        #[cfg(feature = "tracing")]
        tracing::warn!(tool = %name, path = %path.display(), "configured tool path does not exist, using PATH");
    }

    require_tool(name)
}
