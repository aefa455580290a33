//! Multi-preset encoding of one source file.
//!
//! Probing and running are the only side effects; everything between them is
//! a pure compilation through [`mp4forge_encoder::Encoder`].

use crate::config::{self, Config};
use anyhow::{Context, Result};
use mp4forge_av::{Tool, Workspace};
use mp4forge_encoder::{EncodeCommand, EncodeRequest, Encoder, Settings, SourceInfo};
use std::path::{Path, PathBuf};

/// One output to produce.
#[derive(Debug, Clone)]
pub struct EncodeJob {
    pub preset: String,
    pub request: EncodeRequest,
    /// Command compiled against the final destination.
    pub command: EncodeCommand,
}

impl EncodeJob {
    pub fn destination(&self) -> &Path {
        &self.request.output
    }
}

/// Encoder plus the tools and defaults from the configuration.
#[derive(Debug, Clone)]
pub struct Forge {
    encoder: Encoder,
    ffprobe: PathBuf,
    overrides: Settings,
}

impl Forge {
    pub fn from_config(config: &Config) -> Result<Self> {
        let registry = config::preset_registry(config)?;
        let ffmpeg = tool_path(Tool::Ffmpeg, config.tools.ffmpeg_path.as_deref());
        let ffprobe = tool_path(Tool::Ffprobe, config.tools.ffprobe_path.as_deref());

        Ok(Self {
            encoder: Encoder::with_registry(registry).program(ffmpeg.to_string_lossy()),
            ffprobe,
            overrides: config.overrides.clone(),
        })
    }

    pub fn encoder(&self) -> &Encoder {
        &self.encoder
    }

    /// Frame size and rate of the source.
    ///
    /// A failed probe returns [`SourceInfo::default`]. The frame rate then
    /// falls back to the first candidate, but every preset that scales needs
    /// the frame size, so [`Forge::plan`] rejects those with an error naming
    /// the unknown source.
    pub fn probe_source(&self, input: &Path) -> SourceInfo {
        match mp4forge_av::probe_with(&self.ffprobe, input) {
            Ok(info) => {
                let source = info.source_info();
                tracing::debug!("Source {:?}: {:?}", input, source);
                source
            }
            Err(e) => {
                tracing::warn!("Could not probe {:?}: {}", input, e);
                SourceInfo::default()
            }
        }
    }

    /// Merge configured overrides with command-line ones; the latter win.
    pub fn overrides(&self, cli: &Settings) -> Settings {
        let mut merged = self.overrides.clone();
        merged.extend(cli.iter().map(|(k, v)| (*k, v.clone())));
        merged
    }

    /// Compile one request per preset. Fails on the first preset that does not compile.
    pub fn plan(
        &self,
        input: &Path,
        output_dir: &Path,
        presets: &[String],
        overrides: &Settings,
        source: SourceInfo,
    ) -> Result<Vec<EncodeJob>> {
        let overrides = self.overrides(overrides);

        presets
            .iter()
            .map(|preset| {
                let output = output_path(input, output_dir, preset, self.encoder.file_extension());
                let request = EncodeRequest::new(preset.as_str(), input, output)
                    .with_overrides(&overrides)
                    .with_source(source);
                let command = self
                    .encoder
                    .compile(&request)
                    .with_context(|| match source.dimensions() {
                        Some(_) => format!("Preset '{}' does not compile", preset),
                        None => format!(
                            "Preset '{}' does not compile for {:?}: source frame size is unknown",
                            preset, input
                        ),
                    })?;

                Ok(EncodeJob {
                    preset: preset.clone(),
                    request,
                    command,
                })
            })
            .collect()
    }

    /// Run one job, writing through a workspace next to the destination.
    pub fn run(&self, job: &EncodeJob) -> Result<PathBuf> {
        let workspace = Workspace::new(job.destination())?;

        let mut request = job.request.clone();
        request.output = workspace.output().to_path_buf();
        let command = self.encoder.compile(&request)?;

        tracing::info!("Encoding {} -> {:?}", job.preset, job.destination());
        tracing::debug!("{}", command.command_line());

        let output = mp4forge_av::run(Path::new(&command.program), &command.args)
            .with_context(|| format!("Encoding preset '{}' failed", job.preset))?;
        if !output.error_lines.is_empty() {
            tracing::warn!(
                "{} reported {} error line(s) for preset '{}'",
                command.program,
                output.error_lines.len(),
                job.preset
            );
        }

        Ok(workspace.finalize()?)
    }
}

/// `<output_dir>/<input stem>-<preset>.<extension>`
pub fn output_path(input: &Path, output_dir: &Path, preset: &str, extension: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    output_dir.join(format!("{}-{}.{}", stem, preset, extension))
}

fn tool_path(tool: Tool, configured: Option<&Path>) -> PathBuf {
    match tool.locate(configured) {
        Ok(path) => path,
        Err(e) => {
            tracing::debug!("{}; using bare program name", e);
            PathBuf::from(tool.name())
        }
    }
}
