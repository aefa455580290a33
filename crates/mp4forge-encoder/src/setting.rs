//! Setting names and values.

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// The fixed set of settings an encoding profile can carry.
///
/// The declaration order is the iteration order of a [`Profile`](crate::Profile).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serialize",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Setting {
    AnalyzeDuration,
    ProbeSize,
    TimeOffset,
    Duration,
    AudioCodec,
    AudioSampleRate,
    AudioBitRate,
    AudioChannels,
    AudioSync,
    VideoCodec,
    Width,
    Height,
    DimensionsModulus,
    AspectRatio,
    VideoBitRate,
    ConstantBitRate,
    FrameRate,
    GopDuration,
    VideoProfile,
    VideoCodecLevel,
    VideoFilter,
    EncoderOptions,
    Threads,
}

/// How a setting's textual value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Whole number (bit rates, pixel sizes, milliseconds).
    Integer,
    /// Free text (codec names, filter chains).
    Text,
    /// `true`/`false`.
    Flag,
    /// A single rate or a comma separated list of candidate rates.
    Rates,
    /// Seconds as a number, or a `hh:mm:ss` timestamp.
    Time,
}

impl Setting {
    /// Every setting, in profile order.
    pub const ALL: [Setting; 23] = [
        Setting::AnalyzeDuration,
        Setting::ProbeSize,
        Setting::TimeOffset,
        Setting::Duration,
        Setting::AudioCodec,
        Setting::AudioSampleRate,
        Setting::AudioBitRate,
        Setting::AudioChannels,
        Setting::AudioSync,
        Setting::VideoCodec,
        Setting::Width,
        Setting::Height,
        Setting::DimensionsModulus,
        Setting::AspectRatio,
        Setting::VideoBitRate,
        Setting::ConstantBitRate,
        Setting::FrameRate,
        Setting::GopDuration,
        Setting::VideoProfile,
        Setting::VideoCodecLevel,
        Setting::VideoFilter,
        Setting::EncoderOptions,
        Setting::Threads,
    ];

    /// The snake_case name used in presets, config files and `key=value` pairs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Setting::AnalyzeDuration => "analyze_duration",
            Setting::ProbeSize => "probe_size",
            Setting::TimeOffset => "time_offset",
            Setting::Duration => "duration",
            Setting::AudioCodec => "audio_codec",
            Setting::AudioSampleRate => "audio_sample_rate",
            Setting::AudioBitRate => "audio_bit_rate",
            Setting::AudioChannels => "audio_channels",
            Setting::AudioSync => "audio_sync",
            Setting::VideoCodec => "video_codec",
            Setting::Width => "width",
            Setting::Height => "height",
            Setting::DimensionsModulus => "dimensions_modulus",
            Setting::AspectRatio => "aspect_ratio",
            Setting::VideoBitRate => "video_bit_rate",
            Setting::ConstantBitRate => "constant_bit_rate",
            Setting::FrameRate => "frame_rate",
            Setting::GopDuration => "gop_duration",
            Setting::VideoProfile => "video_profile",
            Setting::VideoCodecLevel => "video_codec_level",
            Setting::VideoFilter => "video_filter",
            Setting::EncoderOptions => "encoder_options",
            Setting::Threads => "threads",
        }
    }

    /// How textual values for this setting are parsed.
    pub fn kind(&self) -> ValueKind {
        match self {
            Setting::AnalyzeDuration
            | Setting::ProbeSize
            | Setting::AudioSampleRate
            | Setting::AudioBitRate
            | Setting::AudioChannels
            | Setting::AudioSync
            | Setting::Width
            | Setting::Height
            | Setting::DimensionsModulus
            | Setting::VideoBitRate
            | Setting::GopDuration
            | Setting::Threads => ValueKind::Integer,
            Setting::TimeOffset | Setting::Duration => ValueKind::Time,
            Setting::ConstantBitRate => ValueKind::Flag,
            Setting::FrameRate => ValueKind::Rates,
            Setting::AudioCodec
            | Setting::VideoCodec
            | Setting::AspectRatio
            | Setting::VideoProfile
            | Setting::VideoCodecLevel
            | Setting::VideoFilter
            | Setting::EncoderOptions => ValueKind::Text,
        }
    }
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Setting {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim();
        Setting::ALL
            .into_iter()
            .find(|setting| setting.as_str() == name)
            .ok_or_else(|| Error::UnknownSetting {
                name: name.to_string(),
            })
    }
}

/// The value of a single setting.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialize",
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged)
)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<f64>),
}

impl SettingValue {
    /// Parse a textual value according to the setting's [`ValueKind`].
    ///
    /// ```
    /// use mp4forge_encoder::{Setting, SettingValue};
    ///
    /// let rates = SettingValue::parse(Setting::FrameRate, "29.97,25")?;
    /// assert_eq!(rates, SettingValue::List(vec![29.97, 25.0]));
    /// # Ok::<(), mp4forge_encoder::Error>(())
    /// ```
    pub fn parse(setting: Setting, text: &str) -> Result<Self> {
        let text = text.trim();
        let invalid = || Error::invalid_value(setting, text);

        match setting.kind() {
            ValueKind::Integer => text.parse().map(SettingValue::Int).map_err(|_| invalid()),
            ValueKind::Flag => match text.to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(SettingValue::Bool(true)),
                "false" | "no" | "0" => Ok(SettingValue::Bool(false)),
                _ => Err(invalid()),
            },
            ValueKind::Rates if text.contains(',') => text
                .split(',')
                .map(|part| part.trim().parse::<f64>())
                .collect::<std::result::Result<Vec<_>, _>>()
                .map(SettingValue::List)
                .map_err(|_| invalid()),
            ValueKind::Rates => parse_number(text).ok_or_else(invalid),
            ValueKind::Time => {
                if text.is_empty() {
                    return Err(invalid());
                }
                Ok(parse_number(text).unwrap_or_else(|| SettingValue::Text(text.to_string())))
            }
            ValueKind::Text if text.is_empty() => Err(invalid()),
            ValueKind::Text => Ok(SettingValue::Text(text.to_string())),
        }
    }

    /// Integer view; floats with no fractional part also qualify.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SettingValue::Int(v) => Some(*v),
            SettingValue::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }

    /// Numeric view of an integer or float.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SettingValue::Int(v) => Some(*v as f64),
            SettingValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Short name of the variant, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            SettingValue::Bool(_) => "boolean",
            SettingValue::Int(_) => "integer",
            SettingValue::Float(_) => "float",
            SettingValue::Text(_) => "string",
            SettingValue::List(_) => "list",
        }
    }
}

fn parse_number(text: &str) -> Option<SettingValue> {
    if let Ok(v) = text.parse::<i64>() {
        return Some(SettingValue::Int(v));
    }
    text.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(SettingValue::Float)
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Bool(b) => write!(f, "{}", b),
            SettingValue::Int(v) => write!(f, "{}", v),
            SettingValue::Float(v) => write!(f, "{}", v),
            SettingValue::Text(s) => f.write_str(s),
            SettingValue::List(values) => {
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", v)?;
                }
                Ok(())
            }
        }
    }
}

impl From<i64> for SettingValue {
    fn from(v: i64) -> Self {
        SettingValue::Int(v)
    }
}

impl From<f64> for SettingValue {
    fn from(v: f64) -> Self {
        SettingValue::Float(v)
    }
}

impl From<bool> for SettingValue {
    fn from(v: bool) -> Self {
        SettingValue::Bool(v)
    }
}

impl From<&str> for SettingValue {
    fn from(v: &str) -> Self {
        SettingValue::Text(v.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(v: String) -> Self {
        SettingValue::Text(v)
    }
}

impl From<Vec<f64>> for SettingValue {
    fn from(v: Vec<f64>) -> Self {
        SettingValue::List(v)
    }
}

/// Parse a `name=value` pair, as given on the command line.
pub fn parse_assignment(pair: &str) -> Result<(Setting, SettingValue)> {
    let (name, value) = pair.split_once('=').ok_or_else(|| Error::UnknownSetting {
        name: pair.to_string(),
    })?;
    let setting: Setting = name.parse()?;
    let value = SettingValue::parse(setting, value)?;
    Ok((setting, value))
}
