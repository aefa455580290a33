//! Running the encoder binary.

use crate::{Error, Result};
use std::path::Path;
use std::process::Command;

/// Captured result of a successful tool run.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
    /// Lines of stderr mentioning an error, in order.
    pub error_lines: Vec<String>,
}

/// Stderr lines that mention "error", case-insensitively.
///
/// ffmpeg rewrites its progress line with `\r`, so both `\r` and `\n`
/// separate lines.
pub fn error_lines(stderr: &str) -> Vec<&str> {
    stderr
        .split(['\r', '\n'])
        .map(str::trim)
        .filter(|line| line.to_ascii_lowercase().contains("error"))
        .collect()
}

/// Run `program` with `args` and wait for it to exit.
///
/// Every stderr line mentioning an error is logged at error level. A
/// non-zero exit status is reported as [`Error::ToolFailed`].
///
/// # Example
///
/// ```no_run
/// use mp4forge_av::runner::run;
/// use std::path::Path;
///
/// let args = vec!["-i".to_string(), "in.mkv".to_string(), "out.mp4".to_string()];
/// let output = run(Path::new("ffmpeg"), &args)?;
/// println!("{} error lines", output.error_lines.len());
/// # Ok::<(), mp4forge_av::Error>(())
/// ```
pub fn run(program: &Path, args: &[String]) -> Result<ToolOutput> {
    let tool = tool_name(program);

    #[cfg(feature = "tracing")]
    tracing::debug!(tool = %tool, args = ?args, "running tool");

    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| Error::from_spawn(&tool, e))?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    let errors: Vec<String> = error_lines(&stderr)
        .into_iter()
        .map(str::to_string)
        .collect();

    #[cfg(feature = "tracing")]
    for line in &errors {
        tracing::error!(tool = %tool, "{}", line);
    }

    if !output.status.success() {
        let message = errors
            .last()
            .cloned()
            .or_else(|| last_line(&stderr))
            .unwrap_or_else(|| output.status.to_string());
        return Err(Error::tool_failed(tool, message));
    }

    Ok(ToolOutput {
        stdout,
        stderr,
        error_lines: errors,
    })
}

/// Name used in errors and logs: the program's file name.
pub(crate) fn tool_name(program: &Path) -> String {
    program
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.display().to_string())
}

fn last_line(text: &str) -> Option<String> {
    text.split(['\r', '\n'])
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .last()
        .map(str::to_string)
}
