//! Staging area for encoder outputs.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary directory that holds an output until it is complete.
///
/// The encoder writes to [`Workspace::output`]; only a successful run is
/// moved to the destination with [`Workspace::finalize`], so a failed or
/// interrupted encode never leaves a truncated file behind. The directory
/// is created next to the destination so the final move is a rename.
///
/// # Example
///
/// ```no_run
/// use mp4forge_av::Workspace;
///
/// let workspace = Workspace::new("/media/out/movie-w768.mp4")?;
/// // run ffmpeg writing to workspace.output()
/// workspace.finalize()?;
/// # Ok::<(), mp4forge_av::Error>(())
/// ```
#[derive(Debug)]
pub struct Workspace {
    temp_dir: TempDir,
    destination: PathBuf,
    output_path: PathBuf,
}

impl Workspace {
    /// Create a workspace for an output that should end up at `destination`.
    pub fn new<P: AsRef<Path>>(destination: P) -> Result<Self> {
        let destination = destination.as_ref();

        let file_name = destination
            .file_name()
            .ok_or_else(|| Error::InvalidInput(format!("invalid output path: {:?}", destination)))?;

        let parent = match destination.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        if !parent.is_dir() {
            return Err(Error::Workspace(format!(
                "output directory does not exist: {:?}",
                parent
            )));
        }

        let temp_dir = tempfile::Builder::new()
            .prefix(".mp4forge-")
            .tempdir_in(parent)
            .map_err(|e| Error::Workspace(e.to_string()))?;
        let output_path = temp_dir.path().join(file_name);

        Ok(Self {
            temp_dir,
            destination: destination.to_path_buf(),
            output_path,
        })
    }

    /// Where the output will be moved on success.
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Path the encoder should write to.
    pub fn output(&self) -> &Path {
        &self.output_path
    }

    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Move the finished output to the destination.
    ///
    /// An existing destination is backed up first and restored if the move
    /// fails.
    pub fn finalize(self) -> Result<PathBuf> {
        let dest = self.destination.as_path();

        if !self.output_path.exists() {
            return Err(Error::Workspace(format!(
                "output file does not exist: {:?}",
                self.output_path
            )));
        }

        if dest.exists() {
            let backup = dest.with_extension("bak");
            std::fs::rename(dest, &backup).map_err(|e| {
                Error::Workspace(format!("failed to back up existing output: {}", e))
            })?;

            if let Err(e) = std::fs::rename(&self.output_path, dest) {
                let _ = std::fs::rename(&backup, dest);
                return Err(Error::Workspace(format!(
                    "failed to move output to destination: {}",
                    e
                )));
            }

            let _ = std::fs::remove_file(&backup);
        } else {
            std::fs::rename(&self.output_path, dest).map_err(|e| {
                Error::Workspace(format!("failed to move output to destination: {}", e))
            })?;
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(destination = %dest.display(), "output finalized");

        Ok(dest.to_path_buf())
    }

    /// Discard the output.
    pub fn cleanup(self) {
        drop(self.temp_dir);
    }
}
