use mp4forge_encoder::{PresetEntry, Settings, DEFAULT_PRESET};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub encode: EncodeConfig,

    /// Overrides applied to every compilation, below command-line overrides.
    #[serde(default)]
    pub overrides: Settings,

    /// Custom presets, added to the built-in table.
    #[serde(default)]
    pub presets: BTreeMap<String, PresetConfig>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    #[serde(default)]
    pub ffprobe_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EncodeConfig {
    /// Presets produced by `encode` when none are named on the command line.
    #[serde(default = "default_presets")]
    pub presets: Vec<String>,

    /// Where `encode` writes its outputs when no directory is given.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

fn default_presets() -> Vec<String> {
    vec![DEFAULT_PRESET.to_string()]
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            presets: default_presets(),
            output_dir: None,
        }
    }
}

/// A `[presets.<name>]` table.
///
/// Either `alias = "<other preset>"` on its own, or any number of settings:
///
/// ```toml
/// [presets.mobile]
/// width = 320
/// video_bit_rate = 250000
/// frame_rate = [29.97, 25]
///
/// [presets.phone]
/// alias = "mobile"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PresetConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    #[serde(flatten)]
    pub settings: Settings,
}

impl PresetConfig {
    /// Convert to a registry entry. Fails when a table mixes `alias` with settings.
    pub fn to_entry(&self, name: &str) -> anyhow::Result<PresetEntry> {
        match &self.alias {
            Some(target) if !self.settings.is_empty() => anyhow::bail!(
                "Preset '{}' is an alias of '{}' and cannot also define settings",
                name,
                target
            ),
            Some(target) => Ok(PresetEntry::Alias(target.clone())),
            None if self.settings.is_empty() => {
                anyhow::bail!("Preset '{}' defines no settings", name)
            }
            None => Ok(PresetEntry::Settings(self.settings.clone())),
        }
    }
}
