//! Resolved encoding profiles.

use crate::codec;
use crate::setting::{Setting, SettingValue};
use crate::{Error, Result};
use std::collections::BTreeMap;

/// A partial set of settings: a preset entry or a caller's overrides.
pub type Settings = BTreeMap<Setting, SettingValue>;

/// The fully merged set of settings for one compilation.
///
/// A profile is only produced by [`resolve`](crate::resolve::resolve) and
/// cannot be modified afterwards.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
#[cfg_attr(feature = "serialize", serde(transparent))]
pub struct Profile {
    settings: Settings,
}

impl Profile {
    pub(crate) fn from_settings(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn get(&self, setting: Setting) -> Option<&SettingValue> {
        self.settings.get(&setting)
    }

    pub fn contains(&self, setting: Setting) -> bool {
        self.settings.contains_key(&setting)
    }

    /// Settings in [`Setting`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Setting, &SettingValue)> {
        self.settings.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.settings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    /// Whether the video stream is copied without re-encoding.
    pub fn is_video_passthrough(&self) -> bool {
        self.get(Setting::VideoCodec)
            .and_then(SettingValue::as_str)
            .is_some_and(codec::is_passthrough)
    }

    /// Integer setting, if present. Any other value type is a profile error.
    pub fn integer(&self, setting: Setting) -> Result<Option<i64>> {
        match self.get(setting) {
            None => Ok(None),
            Some(value) => value
                .as_i64()
                .map(Some)
                .ok_or_else(|| type_error(setting, "an integer", value)),
        }
    }

    /// Numeric setting, if present.
    pub fn number(&self, setting: Setting) -> Result<Option<f64>> {
        match self.get(setting) {
            None => Ok(None),
            Some(value) => value
                .as_f64()
                .map(Some)
                .ok_or_else(|| type_error(setting, "a number", value)),
        }
    }

    /// Boolean setting; absent means `false`.
    pub fn flag(&self, setting: Setting) -> Result<bool> {
        match self.get(setting) {
            None => Ok(false),
            Some(value) => value
                .as_bool()
                .ok_or_else(|| type_error(setting, "a boolean", value)),
        }
    }

    /// String setting, if present.
    pub fn text(&self, setting: Setting) -> Result<Option<&str>> {
        match self.get(setting) {
            None => Ok(None),
            Some(value) => value
                .as_str()
                .map(Some)
                .ok_or_else(|| type_error(setting, "a string", value)),
        }
    }
}

pub(crate) fn type_error(setting: Setting, expected: &str, value: &SettingValue) -> Error {
    Error::profile(
        setting,
        format!("expected {}, got {} {}", expected, value.type_name(), value),
    )
}
