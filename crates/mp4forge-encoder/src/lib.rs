//! # mp4forge-encoder
//!
//! Compiles an encoding preset plus caller overrides into the exact ordered
//! argument list for an `ffmpeg` invocation that produces an H.264/AAC MP4.
//!
//! The crate never runs a process or touches a file. It:
//! - looks up a named [`Preset`] in an immutable [`PresetRegistry`]
//! - layers overrides and system defaults into a [`Profile`] ([`resolve`])
//! - renders every setting through its flag rule ([`flags`]), computing
//!   frame sizes, frame rates and keyframe intervals on the way ([`derive`])
//! - splices the rendered groups into a fixed argument [`Recipe`]
//!
//! ## Features
//!
//! - `serialize` - serde support for settings, values and profiles
//! - `tracing` - emit validation failures as tracing events
//!
//! ## Example
//!
//! ```
//! use mp4forge_encoder::{EncodeRequest, Encoder, Setting, SettingValue, SourceInfo};
//!
//! let encoder = Encoder::new();
//! let request = EncodeRequest::new("p192", "/in/parkjoy.ivf", "/out/p192.mp4")
//!     .with_override(Setting::AudioChannels, SettingValue::Int(2))
//!     .with_source(SourceInfo::with_dimensions(1280, 720).frame_rate(50.0));
//!
//! let command = encoder.compile(&request)?;
//! assert_eq!(command.program, "ffmpeg");
//! assert!(command.args.windows(2).any(|w| w == ["-s", "192x108"]));
//! # Ok::<(), mp4forge_encoder::Error>(())
//! ```

pub mod codec;
pub mod derive;
mod error;
pub mod flags;
pub mod preset;
mod profile;
pub mod recipe;
pub mod resolve;
mod setting;
mod source;

// Re-exports
pub use error::{Error, Result};
pub use flags::{CompiledFlags, FlagGroup};
pub use preset::{Preset, PresetEntry, PresetRegistry, DEFAULT_PRESET};
pub use profile::{Profile, Settings};
pub use recipe::Recipe;
pub use setting::{parse_assignment, Setting, SettingValue, ValueKind};
pub use source::SourceInfo;

use std::path::{Path, PathBuf};

/// Program the compiled arguments are meant for.
pub const DEFAULT_PROGRAM: &str = "ffmpeg";

/// Container extension of the produced files.
pub const FILE_EXTENSION: &str = "mp4";

/// One compilation request: which preset, which overrides, for which files.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeRequest {
    pub preset: String,
    pub overrides: Settings,
    pub source: SourceInfo,
    pub input: PathBuf,
    pub output: PathBuf,
}

impl EncodeRequest {
    pub fn new(preset: impl Into<String>, input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            preset: preset.into(),
            overrides: Settings::new(),
            source: SourceInfo::default(),
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
        }
    }

    pub fn with_override(mut self, setting: Setting, value: impl Into<SettingValue>) -> Self {
        self.overrides.insert(setting, value.into());
        self
    }

    pub fn with_overrides(mut self, overrides: &Settings) -> Self {
        self.overrides
            .extend(overrides.iter().map(|(k, v)| (*k, v.clone())));
        self
    }

    pub fn with_source(mut self, source: SourceInfo) -> Self {
        self.source = source;
        self
    }
}

/// The compiled invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeCommand {
    /// Program to run.
    pub program: String,
    /// Arguments, in order.
    pub args: Vec<String>,
    /// The resolved profile the arguments were compiled from.
    pub profile: Profile,
}

impl EncodeCommand {
    /// The invocation as a single shell command line.
    pub fn command_line(&self) -> String {
        recipe::to_command_line(&self.program, &self.args)
    }
}

/// Profile-to-command compiler.
///
/// Holds only immutable data and can be shared between threads.
#[derive(Debug, Clone)]
pub struct Encoder {
    registry: PresetRegistry,
    recipe: Recipe,
    program: String,
}

impl Encoder {
    /// Encoder with the built-in presets and the default recipe.
    pub fn new() -> Self {
        Self::with_registry(PresetRegistry::builtin().clone())
    }

    pub fn with_registry(registry: PresetRegistry) -> Self {
        Self {
            registry,
            recipe: Recipe::default(),
            program: DEFAULT_PROGRAM.to_string(),
        }
    }

    /// Use a different encoder binary, e.g. an absolute path.
    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn recipe(mut self, recipe: Recipe) -> Self {
        self.recipe = recipe;
        self
    }

    pub fn registry(&self) -> &PresetRegistry {
        &self.registry
    }

    pub fn file_extension(&self) -> &'static str {
        FILE_EXTENSION
    }

    /// Look up the preset and merge it with the overrides.
    pub fn resolve(&self, preset: &str, overrides: &Settings) -> Result<Profile> {
        let preset = self.registry.lookup(preset)?;
        Ok(resolve::resolve(&preset.settings, overrides))
    }

    /// Compile a request into a complete command.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownPreset`] if the preset is not registered
    /// - [`Error::UnsupportedCodec`] if a codec is outside its allow-list
    /// - [`Error::Profile`] if a setting is missing, mistyped or inconsistent
    pub fn compile(&self, request: &EncodeRequest) -> Result<EncodeCommand> {
        let profile = self.resolve(&request.preset, &request.overrides)?;
        let flags = flags::compile(&profile, &request.source)?;
        let args = self.recipe.assemble(&flags, &request.input, &request.output)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(preset = %request.preset, args = args.len(), "compiled encoder command");

        Ok(EncodeCommand {
            program: self.program.clone(),
            args,
            profile,
        })
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoder_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Encoder>();
        assert_send_sync::<EncodeCommand>();
    }

    #[test]
    fn test_custom_program() {
        let encoder = Encoder::new().program("/opt/ffmpeg/bin/ffmpeg");
        let request = EncodeRequest::new("w768", "in.mkv", "out.mp4")
            .with_source(SourceInfo::with_dimensions(1920, 1080));
        let command = encoder.compile(&request).unwrap();
        assert_eq!(command.program, "/opt/ffmpeg/bin/ffmpeg");
        assert!(command.command_line().starts_with("/opt/ffmpeg/bin/ffmpeg -i in.mkv "));
    }

    #[test]
    fn test_p192_full_command() {
        let request = EncodeRequest::new("p192", "parkjoy.ivf", "p192.mp4")
            .with_source(SourceInfo::with_dimensions(1280, 720).frame_rate(50.0));
        let command = Encoder::new().compile(&request).unwrap();

        assert_eq!(
            command.args.join(" "),
            "-i parkjoy.ivf \
             -c:a aac -ar 32000 -b:a 32000 -ac 1 \
             -c:v libx264 -s 192x108 -aspect 16:9 -b:v 90000 -maxrate 90000 -bufsize 90000 \
             -r 10 -g 40 -keyint_min 40 -profile:v baseline -level 3.0 -vf hqdn3d=4:3:6:4.5 \
             -y -threads 0 p192.mp4"
        );
    }
}
