//! End-to-end compilation tests.
//!
//! Every test goes through the public [`Encoder`] API: preset lookup,
//! resolution, flag rendering and recipe assembly.

use assert_matches::assert_matches;
use mp4forge_encoder::codec::Medium;
use mp4forge_encoder::{
    EncodeCommand, EncodeRequest, Encoder, Error, PresetEntry, PresetRegistry, Setting,
    SettingValue, Settings, SourceInfo,
};
use std::sync::Arc;
use std::thread;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn hd_source() -> SourceInfo {
    SourceInfo::with_dimensions(1920, 1080).frame_rate(25.0)
}

fn compile(preset: &str, overrides: &[(Setting, SettingValue)]) -> Result<EncodeCommand, Error> {
    let overrides: Settings = overrides.iter().cloned().collect();
    let request = EncodeRequest::new(preset, "/media/in/clip.mov", "/media/out/clip.mp4")
        .with_overrides(&overrides)
        .with_source(hd_source());
    Encoder::new().compile(&request)
}

/// Value following the first occurrence of `flag`.
fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn count(args: &[String], flag: &str) -> usize {
    args.iter().filter(|a| *a == flag).count()
}

// ---------------------------------------------------------------------------
// Presets
// ---------------------------------------------------------------------------

#[test]
fn every_builtin_preset_compiles() {
    let encoder = Encoder::new();
    for name in encoder.registry().names() {
        let request = EncodeRequest::new(name, "in.mkv", "out.mp4").with_source(hd_source());
        let command = encoder
            .compile(&request)
            .unwrap_or_else(|e| panic!("preset {} failed: {}", name, e));

        assert!(!command.args.is_empty(), "{}", name);
        assert_eq!(count(&command.args, "-c:a"), 1, "{}", name);
        assert_eq!(count(&command.args, "-c:v"), 1, "{}", name);
        assert_eq!(command.args.last().map(String::as_str), Some("out.mp4"));
    }
}

#[test]
fn default_preset_matches_w768() {
    let default = compile("default", &[]).unwrap();
    let w768 = compile("w768", &[]).unwrap();
    assert_eq!(default.args, w768.args);
    assert_eq!(flag_value(&default.args, "-s"), Some("768x432"));
}

#[test]
fn unknown_preset_yields_no_command() {
    assert_matches!(
        compile("w4k", &[]),
        Err(Error::UnknownPreset { name }) if name == "w4k"
    );
}

#[test]
fn configured_presets_compile() {
    let mobile: Settings = [
        (Setting::Width, SettingValue::Int(320)),
        (Setting::VideoBitRate, SettingValue::Int(250_000)),
    ]
    .into_iter()
    .collect();
    let registry = PresetRegistry::extend([
        ("mobile".to_string(), PresetEntry::Settings(mobile)),
        ("phone".to_string(), PresetEntry::Alias("mobile".into())),
    ])
    .unwrap();

    let request = EncodeRequest::new("phone", "in.mkv", "out.mp4").with_source(hd_source());
    let command = Encoder::with_registry(registry).compile(&request).unwrap();
    assert_eq!(flag_value(&command.args, "-s"), Some("320x184"));
    assert_eq!(flag_value(&command.args, "-b:v"), Some("250000"));
}

// ---------------------------------------------------------------------------
// Merge precedence
// ---------------------------------------------------------------------------

#[test]
fn override_beats_preset() {
    let command = compile(
        "w1280",
        &[
            (Setting::VideoBitRate, SettingValue::Int(3_000_000)),
            (Setting::AudioSampleRate, SettingValue::Int(44_100)),
        ],
    )
    .unwrap();

    assert_eq!(flag_value(&command.args, "-b:v"), Some("3000000"));
    assert_eq!(flag_value(&command.args, "-ar"), Some("44100"));
    assert!(!command.args.contains(&"2800000".to_string()));
    assert!(!command.args.contains(&"48000".to_string()));
}

#[test]
fn resolved_profile_is_returned() {
    let command = compile("t960", &[(Setting::AudioChannels, SettingValue::Int(2))]).unwrap();
    let profile = &command.profile;

    assert_eq!(profile.get(Setting::AudioChannels), Some(&SettingValue::Int(2)));
    assert_eq!(profile.get(Setting::VideoProfile), Some(&"baseline".into()));
    assert_eq!(profile.get(Setting::VideoCodecLevel), Some(&"3.0".into()));
}

// ---------------------------------------------------------------------------
// Derived values
// ---------------------------------------------------------------------------

#[test]
fn width_rounds_down_and_aspect_is_reduced() {
    let command = compile("w768", &[(Setting::Width, SettingValue::Int(767))]).unwrap();

    let size = flag_value(&command.args, "-s").unwrap();
    let (w, h) = size.split_once('x').unwrap();
    let (w, h): (u32, u32) = (w.parse().unwrap(), h.parse().unwrap());
    assert_eq!(w % 8, 0);
    assert!(w <= 767);
    assert_eq!(h % 8, 0);

    let aspect = flag_value(&command.args, "-aspect").unwrap();
    let (a, b) = aspect.split_once(':').unwrap();
    let (a, b): (u32, u32) = (a.parse().unwrap(), b.parse().unwrap());
    assert_eq!(mp4forge_encoder::derive::gcd(a, b), 1);
    assert!((f64::from(a) / f64::from(b) - 16.0 / 9.0).abs() < 0.02);
}

#[test]
fn preset_modulus_is_used() {
    // p480 rounds to multiples of 4.
    let request = EncodeRequest::new("p480", "in.mkv", "out.mp4")
        .with_source(SourceInfo::with_dimensions(720, 404));
    let command = Encoder::new().compile(&request).unwrap();
    assert_eq!(flag_value(&command.args, "-s"), Some("480x268"));
}

#[test]
fn frame_rate_matches_source() {
    let request = EncodeRequest::new("w768", "in.mkv", "out.mp4")
        .with_source(SourceInfo::with_dimensions(1920, 1080).frame_rate(25.0));
    let command = Encoder::new().compile(&request).unwrap();
    assert_eq!(flag_value(&command.args, "-r"), Some("25"));
    assert_eq!(flag_value(&command.args, "-g"), Some("100"));
    assert_eq!(flag_value(&command.args, "-keyint_min"), Some("100"));
}

#[test]
fn frame_rate_falls_back_to_first_candidate() {
    for rate in [Some(23.976), Some(60.0), None] {
        let source = SourceInfo {
            frame_rate: rate,
            ..SourceInfo::with_dimensions(1920, 1080)
        };
        let request = EncodeRequest::new("w768", "in.mkv", "out.mp4").with_source(source);
        let command = Encoder::new().compile(&request).unwrap();
        assert_eq!(flag_value(&command.args, "-r"), Some("29.97"), "{:?}", rate);
        assert_eq!(flag_value(&command.args, "-g"), Some("119"));
        assert_eq!(flag_value(&command.args, "-keyint_min"), Some("119"));
    }
}

#[test]
fn missing_source_dimensions_is_a_profile_error() {
    let request = EncodeRequest::new("w768", "in.mkv", "out.mp4");
    assert_matches!(
        Encoder::new().compile(&request),
        Err(Error::Profile { setting: Setting::Width, .. })
    );
}

// ---------------------------------------------------------------------------
// Pass-through
// ---------------------------------------------------------------------------

#[test]
fn passthrough_has_no_encode_only_flags() {
    for preset in ["p192", "w768", "w1920"] {
        let command = compile(preset, &[(Setting::VideoCodec, "copy".into())]).unwrap();
        let args = &command.args;

        assert_eq!(flag_value(args, "-c:v"), Some("copy"));
        for flag in ["-s", "-aspect", "-profile:v", "-level", "-vf"] {
            assert_eq!(count(args, flag), 0, "{} present for {}", flag, preset);
        }
        assert!(!command.profile.contains(Setting::VideoFilter));
        assert!(!command.profile.contains(Setting::VideoCodecLevel));
    }
}

#[test]
fn passthrough_does_not_need_source_dimensions() {
    let request = EncodeRequest::new("w768", "in.mkv", "out.mp4")
        .with_override(Setting::VideoCodec, "copy")
        .with_override(Setting::AudioCodec, "copy");
    let command = Encoder::new().compile(&request).unwrap();
    assert_eq!(flag_value(&command.args, "-c:a"), Some("copy"));
}

#[test]
fn explicit_filter_on_passthrough_is_rejected() {
    assert_matches!(
        compile(
            "w768",
            &[
                (Setting::VideoCodec, "copy".into()),
                (Setting::VideoFilter, "scale=640:-2".into()),
            ]
        ),
        Err(Error::Profile { setting: Setting::VideoFilter, .. })
    );
}

// ---------------------------------------------------------------------------
// Codecs
// ---------------------------------------------------------------------------

#[test]
fn unsupported_audio_codec_produces_no_command() {
    assert_matches!(
        compile("w768", &[(Setting::AudioCodec, "vorbis".into())]),
        Err(Error::UnsupportedCodec { medium: Medium::Audio, value }) if value == "vorbis"
    );
}

#[test]
fn unsupported_video_codec_produces_no_command() {
    assert_matches!(
        compile("p480", &[(Setting::VideoCodec, "theora".into())]),
        Err(Error::UnsupportedCodec { medium: Medium::Video, .. })
    );
}

#[test]
fn codec_aliases_normalize() {
    let command = compile(
        "w620",
        &[
            (Setting::VideoCodec, "avc".into()),
            (Setting::AudioCodec, "libfaac".into()),
        ],
    )
    .unwrap();
    assert_eq!(flag_value(&command.args, "-c:v"), Some("libx264"));
    assert_eq!(flag_value(&command.args, "-c:a"), Some("aac"));
}

// ---------------------------------------------------------------------------
// Recipe order and determinism
// ---------------------------------------------------------------------------

#[test]
fn trim_and_analysis_flags_surround_input() {
    let command = compile(
        "w768",
        &[
            (Setting::TimeOffset, SettingValue::Int(30)),
            (Setting::Duration, SettingValue::Int(10)),
            (Setting::AnalyzeDuration, SettingValue::Int(10_000_000)),
        ],
    )
    .unwrap();

    assert_eq!(
        &command.args[..8],
        [
            "-analyzeduration",
            "10000000",
            "-i",
            "/media/in/clip.mov",
            "-ss",
            "30",
            "-t",
            "10"
        ]
    );
}

#[test]
fn compilation_is_idempotent() {
    let overrides = [
        (Setting::FrameRate, SettingValue::List(vec![25.0, 29.97])),
        (Setting::ConstantBitRate, SettingValue::Bool(true)),
    ];
    let first = compile("t1280", &overrides).unwrap();
    let second = compile("t1280", &overrides).unwrap();
    assert_eq!(first.args, second.args);
    assert_eq!(first.command_line(), second.command_line());
}

#[test]
fn concurrent_compilation_shares_the_encoder() {
    let encoder = Arc::new(Encoder::new());
    let expected = compile("w1280", &[]).unwrap().args;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let encoder = Arc::clone(&encoder);
            thread::spawn(move || {
                let request = EncodeRequest::new("w1280", "/media/in/clip.mov", "/media/out/clip.mp4")
                    .with_source(hd_source());
                encoder.compile(&request).unwrap().args
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[cfg(feature = "serialize")]
#[test]
fn profile_serializes_as_map() {
    let command = compile("p192", &[]).unwrap();
    let json = serde_json::to_value(&command.profile).unwrap();
    assert_eq!(json["width"], 192);
    assert_eq!(json["constant_bit_rate"], true);
    assert_eq!(json["video_codec"], "h264");
}
