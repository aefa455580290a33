//! Layering of preset settings, overrides and system defaults.

use crate::codec::{self, DEFAULT_AUDIO_CODEC, DEFAULT_VIDEO_CODEC};
use crate::profile::{Profile, Settings};
use crate::setting::{Setting, SettingValue};

/// Video profile used when neither preset nor overrides pick one.
pub const DEFAULT_VIDEO_PROFILE: &str = "main";

/// Codec level for profiles without a dedicated entry.
pub const DEFAULT_VIDEO_CODEC_LEVEL: &str = "3.1";

/// Thread count meaning "let the encoder decide".
pub const AUTO_THREADS: i64 = 0;

/// Codec level for a video profile.
pub fn codec_level_for(video_profile: &str) -> &'static str {
    match video_profile {
        "baseline" => "3.0",
        _ => DEFAULT_VIDEO_CODEC_LEVEL,
    }
}

/// Denoise filter chain for a video profile, if it has one.
pub fn filter_for(video_profile: &str) -> Option<&'static str> {
    match video_profile {
        "baseline" => Some("hqdn3d=4:3:6:4.5"),
        "main" => Some("hqdn3d=1.5:1.5:6:6"),
        _ => None,
    }
}

/// Merge a preset and overrides into a profile, then fill system defaults.
///
/// Overrides win over the preset; defaults only fill settings that are still
/// unset. Resolution never fails, validation happens when the profile is
/// compiled.
pub fn resolve(preset: &Settings, overrides: &Settings) -> Profile {
    let mut settings = preset.clone();
    settings.extend(overrides.iter().map(|(k, v)| (*k, v.clone())));

    fill(&mut settings, Setting::VideoCodec, DEFAULT_VIDEO_CODEC.into());
    fill(&mut settings, Setting::AudioCodec, DEFAULT_AUDIO_CODEC.into());

    let passthrough = settings
        .get(&Setting::VideoCodec)
        .and_then(SettingValue::as_str)
        .is_some_and(codec::is_passthrough);

    // Stream copy never gets a profile, level or filter.
    if !passthrough {
        fill_encode_defaults(&mut settings);
    }

    fill(&mut settings, Setting::Threads, SettingValue::Int(AUTO_THREADS));

    Profile::from_settings(settings)
}

fn fill_encode_defaults(settings: &mut Settings) {
    fill(settings, Setting::VideoProfile, DEFAULT_VIDEO_PROFILE.into());

    let video_profile = settings
        .get(&Setting::VideoProfile)
        .map(|v| v.to_string())
        .unwrap_or_default();

    fill(
        settings,
        Setting::VideoCodecLevel,
        codec_level_for(&video_profile).into(),
    );
    if let Some(filter) = filter_for(&video_profile) {
        fill(settings, Setting::VideoFilter, filter.into());
    }
}

fn fill(settings: &mut Settings, setting: Setting, value: SettingValue) {
    settings.entry(setting).or_insert(value);
}
