mod types;

pub use types::*;

use anyhow::{Context, Result};
use mp4forge_encoder::PresetRegistry;
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)
        .with_context(|| format!("Invalid config file: {:?}", path))?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./mp4forge.toml",
        "~/.config/mp4forge/config.toml",
        "/etc/mp4forge/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Build the preset registry: built-in presets plus the configured ones.
pub fn preset_registry(config: &Config) -> Result<PresetRegistry> {
    let entries = config
        .presets
        .iter()
        .map(|(name, preset)| Ok((name.clone(), preset.to_entry(name)?)))
        .collect::<Result<Vec<_>>>()?;

    PresetRegistry::extend(entries).context("Invalid preset table")
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    let registry = preset_registry(config)?;

    if config.encode.presets.is_empty() {
        anyhow::bail!("[encode] presets cannot be empty");
    }

    for name in &config.encode.presets {
        if !registry.contains(name) {
            anyhow::bail!("[encode] names unknown preset '{}'", name);
        }
    }

    for (name, path) in [
        ("ffmpeg", &config.tools.ffmpeg_path),
        ("ffprobe", &config.tools.ffprobe_path),
    ] {
        if let Some(path) = path {
            if !path.exists() {
                tracing::warn!("Configured {} path does not exist: {:?}", name, path);
            }
        }
    }

    if let Some(dir) = &config.encode.output_dir {
        if !dir.is_dir() {
            tracing::warn!("Output directory does not exist: {:?}", dir);
        }
    }

    Ok(())
}
