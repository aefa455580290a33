use clap::{Parser, Subcommand};
use mp4forge_encoder::{parse_assignment, Setting, SettingValue, DEFAULT_PRESET};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mp4forge")]
#[command(author, version, about = "Compile encoding presets into ffmpeg invocations for MP4 output")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile a preset into an ffmpeg command without running it
    Compile {
        /// Input media file
        input: PathBuf,

        /// Output MP4 file
        output: PathBuf,

        /// Preset to compile
        #[arg(short, long, default_value = DEFAULT_PRESET)]
        preset: String,

        /// Override a setting, e.g. --set video_bit_rate=900000 (repeatable)
        #[arg(short = 's', long = "set", value_name = "NAME=VALUE", value_parser = parse_override)]
        overrides: Vec<(Setting, SettingValue)>,

        /// Source frame size instead of probing, e.g. 1280x720
        #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_dimensions)]
        source: Option<(u32, u32)>,

        /// Source frame rate instead of probing
        #[arg(long, value_name = "FPS")]
        source_fps: Option<f64>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Encode a file into one MP4 per preset
    Encode {
        /// Input media file
        #[arg(required = true)]
        input: PathBuf,

        /// Directory for the outputs (defaults to the configured one, then the input's)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Presets to produce (repeatable; defaults to the configured list)
        #[arg(short, long = "preset")]
        presets: Vec<String>,

        /// Override a setting for every preset (repeatable)
        #[arg(short = 's', long = "set", value_name = "NAME=VALUE", value_parser = parse_override)]
        overrides: Vec<(Setting, SettingValue)>,

        /// Show the commands without executing them
        #[arg(long)]
        dry_run: bool,
    },

    /// List presets, or show the resolved profile of one
    Presets {
        /// Preset to show
        name: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Probe a media file and display information
    Probe {
        /// File to probe
        #[arg(required = true)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

fn parse_override(s: &str) -> Result<(Setting, SettingValue), String> {
    parse_assignment(s).map_err(|e| e.to_string())
}

fn parse_dimensions(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
    let w = w.trim().parse().map_err(|_| format!("invalid width '{}'", w))?;
    let h = h.trim().parse().map_err(|_| format!("invalid height '{}'", h))?;
    Ok((w, h))
}
