//! CLI end-to-end tests
//!
//! Tests for the mp4forge command-line interface. None of these need
//! ffmpeg installed: `compile` is given the source description directly.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

/// Get a command for the mp4forge binary
#[allow(deprecated)]
fn mp4forge_cmd() -> Command {
    Command::cargo_bin("mp4forge").unwrap()
}

#[test]
fn test_cli_no_args_shows_help() {
    let mut cmd = mp4forge_cmd();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_help_flag() {
    let mut cmd = mp4forge_cmd();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("mp4forge"))
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_version_command() {
    let mut cmd = mp4forge_cmd();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(concat!("mp4forge ", env!("CARGO_PKG_VERSION"))));
}

#[test]
fn test_cli_check_tools_command() {
    let mut cmd = mp4forge_cmd();
    cmd.arg("check-tools")
        .assert()
        .success()
        .stdout(predicate::str::contains("ffmpeg"))
        .stdout(predicate::str::contains("ffprobe"));
}

#[cfg(unix)]
#[test]
fn test_cli_check_tools_uses_configured_paths() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let ffmpeg = dir.path().join("ffmpeg-custom");
    fs::write(&ffmpeg, "#!/bin/sh\necho 'ffmpeg version 9.9-test Copyright'\n").unwrap();
    fs::set_permissions(&ffmpeg, fs::Permissions::from_mode(0o755)).unwrap();

    let config_file = dir.path().join("config.toml");
    fs::write(
        &config_file,
        format!("[tools]\nffmpeg_path = {:?}\n", ffmpeg.to_str().unwrap()),
    )
    .unwrap();

    let mut cmd = mp4forge_cmd();
    cmd.args(["--config", config_file.to_str().unwrap(), "check-tools"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ffmpeg (9.9-test)"))
        .stdout(predicate::str::contains("runs the compiled encode commands"));
}

#[test]
fn test_cli_presets_lists_builtins() {
    let mut cmd = mp4forge_cmd();
    cmd.arg("presets")
        .assert()
        .success()
        .stdout(predicate::str::contains("p192"))
        .stdout(predicate::str::contains("w1920"))
        .stdout(predicate::str::is_match(r"default\s+-> w768").unwrap());
}

#[test]
fn test_cli_presets_shows_resolved_profile() {
    let mut cmd = mp4forge_cmd();
    cmd.args(["presets", "t960"])
        .assert()
        .success()
        .stdout(predicate::str::contains("video_codec_level"))
        .stdout(predicate::str::contains("hqdn3d=4:3:6:4.5"));
}

#[test]
fn test_cli_presets_json() {
    let output = mp4forge_cmd()
        .args(["presets", "w768", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["width"], 768);
    assert_eq!(json["video_profile"], "main");
    assert_eq!(json["threads"], 0);
}

#[test]
fn test_cli_compile_p192() {
    let mut cmd = mp4forge_cmd();
    cmd.args([
        "compile",
        "parkjoy.ivf",
        "p192.mp4",
        "--preset",
        "p192",
        "--source",
        "1280x720",
        "--source-fps",
        "50",
    ])
    .assert()
    .success()
    .stdout(predicate::str::contains(
        "-i parkjoy.ivf -c:a aac -ar 32000 -b:a 32000 -ac 1 -c:v libx264 -s 192x108 -aspect 16:9",
    ))
    .stdout(predicate::str::contains("-y -threads 0 p192.mp4"));
}

#[test]
fn test_cli_compile_override() {
    let mut cmd = mp4forge_cmd();
    cmd.args([
        "compile",
        "in.mkv",
        "out.mp4",
        "--source",
        "1920x1080",
        "--set",
        "video_bit_rate=900000",
        "--set",
        "frame_rate=25",
    ])
    .assert()
    .success()
    .stdout(predicate::str::contains("-b:v 900000"))
    .stdout(predicate::str::contains("-r 25 -g 100 -keyint_min 100"));
}

#[test]
fn test_cli_compile_json() {
    let output = mp4forge_cmd()
        .args(["compile", "in.mkv", "out.mp4", "-p", "w1280", "--source", "1920x1080", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let args: Vec<&str> = json["args"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a.as_str().unwrap())
        .collect();
    assert_eq!(args.first(), Some(&"-i"));
    assert_eq!(args.last(), Some(&"out.mp4"));
    assert!(args.windows(2).any(|w| w == ["-s", "1280x720"]));
    assert_eq!(json["profile"]["video_bit_rate"], 2_800_000);
}

#[test]
fn test_cli_compile_unknown_preset() {
    let mut cmd = mp4forge_cmd();
    cmd.args(["compile", "in.mkv", "out.mp4", "-p", "w4k", "--source", "1920x1080"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown preset: w4k"));
}

#[test]
fn test_cli_compile_unsupported_codec() {
    let mut cmd = mp4forge_cmd();
    cmd.args([
        "compile",
        "in.mkv",
        "out.mp4",
        "--source",
        "1920x1080",
        "--set",
        "audio_codec=vorbis",
    ])
    .assert()
    .failure()
    .stdout(predicate::str::is_empty())
    .stderr(predicate::str::contains("unsupported audio codec: vorbis"));
}

#[test]
fn test_cli_compile_unknown_setting() {
    let mut cmd = mp4forge_cmd();
    cmd.args(["compile", "in.mkv", "out.mp4", "--set", "bogus=1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown setting: bogus"));
}

#[test]
fn test_cli_compile_passthrough_without_source() {
    let mut cmd = mp4forge_cmd();
    cmd.args([
        "compile",
        "in.mkv",
        "out.mp4",
        "--source-fps",
        "25",
        "--set",
        "video_codec=copy",
    ])
    .assert()
    .success()
    .stdout(predicate::str::contains("-c:v copy"))
    .stdout(predicate::str::contains("-aspect").not())
    .stdout(predicate::str::contains("-profile:v").not());
}

#[test]
fn test_cli_compile_with_config_preset() {
    let temp = tempdir().unwrap();
    let config_file = temp.path().join("mp4forge.toml");

    fs::write(
        &config_file,
        r#"
[overrides]
threads = 2

[presets.mobile]
width = 320
video_bit_rate = 250000
frame_rate = [29.97, 25]
"#,
    )
    .unwrap();

    let mut cmd = mp4forge_cmd();
    cmd.args([
        "--config",
        config_file.to_str().unwrap(),
        "compile",
        "in.mkv",
        "out.mp4",
        "-p",
        "mobile",
        "--source",
        "1920x1080",
    ])
    .assert()
    .success()
    .stdout(predicate::str::contains("-s 320x184"))
    .stdout(predicate::str::contains("-threads 2"));
}

#[test]
fn test_cli_validate_config() {
    let temp = tempdir().unwrap();
    let config_file = temp.path().join("mp4forge.toml");
    fs::write(
        &config_file,
        r#"
[encode]
presets = ["p192", "w768"]

[presets.phone]
alias = "p480"
"#,
    )
    .unwrap();

    let mut cmd = mp4forge_cmd();
    cmd.args(["validate", config_file.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("1 custom"));
}

#[test]
fn test_cli_validate_invalid_config() {
    let temp = tempdir().unwrap();
    let config_file = temp.path().join("mp4forge.toml");
    fs::write(&config_file, "[presets.phone]\nalias = \"nowhere\"\n").unwrap();

    let mut cmd = mp4forge_cmd();
    cmd.args(["validate", config_file.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nowhere"));
}

#[test]
fn test_cli_probe_nonexistent_file() {
    let mut cmd = mp4forge_cmd();
    cmd.args(["probe", "/nonexistent/path/movie.mkv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not exist"));
}

#[test]
fn test_cli_encode_nonexistent_file() {
    let mut cmd = mp4forge_cmd();
    cmd.args(["encode", "/nonexistent/path/movie.mkv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not exist"));
}
