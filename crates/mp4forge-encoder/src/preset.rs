//! Named preset profiles.
//!
//! The built-in table mirrors the output variants commonly produced for web
//! and mobile playback:
//!
//! - **p192 / p480**: phone sizes, mono audio, baseline profile, constant bit rate
//! - **t960 / t1280**: tablet sizes, baseline profile
//! - **w620 / w768 / w1280 / w1920**: web player sizes, main profile
//!
//! `default` is an alias for `w768`.

use crate::profile::Settings;
use crate::setting::{Setting, SettingValue};
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Name of the preset used when the caller does not pick one.
pub const DEFAULT_PRESET: &str = "default";

/// One entry of a preset table before alias resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum PresetEntry {
    /// A preset defined by its own settings.
    Settings(Settings),
    /// A name that stands for another entry's settings.
    Alias(String),
}

/// A resolved preset.
#[derive(Debug, Clone, PartialEq)]
pub struct Preset {
    /// Name the preset was looked up by.
    pub name: String,
    /// The entry whose settings this preset carries, when `name` is an alias.
    pub alias_of: Option<String>,
    /// Partial profile contributed by the preset.
    pub settings: Settings,
}

/// Immutable table of presets, with aliases already resolved.
#[derive(Debug, Clone)]
pub struct PresetRegistry {
    presets: BTreeMap<String, Preset>,
}

static BUILTIN: LazyLock<PresetRegistry> = LazyLock::new(|| {
    PresetRegistry::from_entries(builtin_entries())
        .expect("built-in preset table has no dangling or cyclic aliases")
});

impl PresetRegistry {
    /// The process-wide registry of built-in presets.
    pub fn builtin() -> &'static PresetRegistry {
        &BUILTIN
    }

    /// Build a registry, resolving every alias to a concrete entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DanglingAlias`] when an alias chain ends at a missing
    /// name and [`Error::AliasCycle`] when aliases point at each other.
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, PresetEntry)>,
    {
        let entries: BTreeMap<String, PresetEntry> = entries.into_iter().collect();
        let mut presets = BTreeMap::new();

        for name in entries.keys() {
            let (target, settings) = follow_aliases(&entries, name)?;
            let alias_of = (target != *name).then(|| target.clone());
            presets.insert(
                name.clone(),
                Preset {
                    name: name.clone(),
                    alias_of,
                    settings: settings.clone(),
                },
            );
        }

        Ok(Self { presets })
    }

    /// The built-in table plus `extra` entries; an extra entry replaces a
    /// built-in one of the same name.
    pub fn extend<I>(extra: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, PresetEntry)>,
    {
        let mut entries: BTreeMap<String, PresetEntry> = builtin_entries().into_iter().collect();
        entries.extend(extra);
        Self::from_entries(entries)
    }

    /// Look up a preset by name.
    pub fn lookup(&self, name: &str) -> Result<&Preset> {
        self.presets.get(name).ok_or_else(|| {
            #[cfg(feature = "tracing")]
            tracing::warn!(preset = %name, "unknown preset requested");

            Error::unknown_preset(name)
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.presets.contains_key(name)
    }

    /// Preset names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Preset> {
        self.presets.values()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

fn follow_aliases<'a>(
    entries: &'a BTreeMap<String, PresetEntry>,
    name: &str,
) -> Result<(String, &'a Settings)> {
    let mut chain = vec![name.to_string()];
    let mut current = name;

    loop {
        match entries.get(current) {
            Some(PresetEntry::Settings(settings)) => return Ok((current.to_string(), settings)),
            Some(PresetEntry::Alias(target)) => {
                if chain.iter().any(|seen| seen == target) {
                    chain.push(target.clone());
                    return Err(Error::AliasCycle { chain });
                }
                chain.push(target.clone());
                current = target;
            }
            None => {
                return Err(Error::DanglingAlias {
                    alias: chain[chain.len() - 2].clone(),
                    target: current.to_string(),
                })
            }
        }
    }
}

fn entry<const N: usize>(pairs: [(Setting, SettingValue); N]) -> PresetEntry {
    PresetEntry::Settings(pairs.into_iter().collect())
}

/// The built-in preset table.
pub fn builtin_entries() -> Vec<(String, PresetEntry)> {
    use Setting::*;
    use SettingValue::{Bool, Int, List, Text};

    let web_rates = || List(vec![29.97, 25.0]);

    vec![
        (
            "p192".into(),
            entry([
                (VideoProfile, Text("baseline".into())),
                (ConstantBitRate, Bool(true)),
                (VideoBitRate, Int(90_000)),
                (AudioBitRate, Int(32_000)),
                (AudioSampleRate, Int(32_000)),
                (AudioChannels, Int(1)),
                (Width, Int(192)),
                (DimensionsModulus, Int(4)),
                (FrameRate, Int(10)),
            ]),
        ),
        (
            "p480".into(),
            entry([
                (VideoProfile, Text("baseline".into())),
                (ConstantBitRate, Bool(true)),
                (VideoBitRate, Int(400_000)),
                (AudioBitRate, Int(32_000)),
                (AudioSampleRate, Int(32_000)),
                (AudioChannels, Int(1)),
                (Width, Int(480)),
                (DimensionsModulus, Int(4)),
                (FrameRate, web_rates()),
            ]),
        ),
        (
            "t960".into(),
            entry([
                (VideoProfile, Text("baseline".into())),
                (ConstantBitRate, Bool(true)),
                (VideoBitRate, Int(1_800_000)),
                (AudioBitRate, Int(96_000)),
                (AudioSampleRate, Int(32_000)),
                (Width, Int(960)),
                (FrameRate, web_rates()),
            ]),
        ),
        (
            "t1280".into(),
            entry([
                (VideoProfile, Text("baseline".into())),
                (VideoBitRate, Int(2_800_000)),
                (AudioBitRate, Int(128_000)),
                (AudioSampleRate, Int(32_000)),
                (Width, Int(1280)),
                (FrameRate, web_rates()),
            ]),
        ),
        (
            "w620".into(),
            entry([
                (VideoBitRate, Int(1_000_000)),
                (AudioBitRate, Int(96_000)),
                (AudioSampleRate, Int(48_000)),
                (Width, Int(620)),
                (DimensionsModulus, Int(4)),
                (FrameRate, web_rates()),
            ]),
        ),
        (
            "w768".into(),
            entry([
                (VideoBitRate, Int(1_400_000)),
                (AudioBitRate, Int(128_000)),
                (AudioSampleRate, Int(48_000)),
                (Width, Int(768)),
                (FrameRate, web_rates()),
            ]),
        ),
        (
            "w1280".into(),
            entry([
                (VideoBitRate, Int(2_800_000)),
                (AudioBitRate, Int(192_000)),
                (AudioSampleRate, Int(48_000)),
                (Width, Int(1280)),
                (FrameRate, web_rates()),
            ]),
        ),
        (
            "w1920".into(),
            entry([
                (VideoBitRate, Int(4_500_000)),
                (AudioBitRate, Int(192_000)),
                (AudioSampleRate, Int(48_000)),
                (Width, Int(1920)),
                (FrameRate, web_rates()),
            ]),
        ),
        (DEFAULT_PRESET.into(), PresetEntry::Alias("w768".into())),
    ]
}
