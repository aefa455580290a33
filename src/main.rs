mod cli;

use mp4forge::config;
use mp4forge::encode::Forge;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use mp4forge_encoder::{EncodeCommand, EncodeRequest, Setting, SettingValue, Settings, SourceInfo};
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag.
    // Logs go to stderr so compiled commands on stdout stay pipeable.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "mp4forge=trace,mp4forge_encoder=trace,mp4forge_av=debug".to_string()
        } else {
            "mp4forge=info,mp4forge_encoder=warn,mp4forge_av=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Compile {
            input,
            output,
            preset,
            overrides,
            source,
            source_fps,
            json,
        } => compile(
            cli.config.as_deref(),
            &input,
            &output,
            &preset,
            overrides,
            source,
            source_fps,
            json,
        ),
        Commands::Encode {
            input,
            output_dir,
            presets,
            overrides,
            dry_run,
        } => encode(
            cli.config.as_deref(),
            &input,
            output_dir.as_deref(),
            presets,
            overrides,
            dry_run,
        ),
        Commands::Presets { name, json } => presets(cli.config.as_deref(), name.as_deref(), json),
        Commands::Probe { file, json } => probe_file(cli.config.as_deref(), &file, json),
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("mp4forge {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn compile(
    config_path: Option<&Path>,
    input: &Path,
    output: &Path,
    preset: &str,
    overrides: Vec<(Setting, SettingValue)>,
    source: Option<(u32, u32)>,
    source_fps: Option<f64>,
    json: bool,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let forge = Forge::from_config(&config)?;

    // Probe only when the caller did not describe the source.
    let source = match (source, source_fps) {
        (None, None) => forge.probe_source(input),
        (dimensions, fps) => SourceInfo {
            width: dimensions.map(|(w, _)| w),
            height: dimensions.map(|(_, h)| h),
            frame_rate: fps,
        },
    };

    let overrides: Settings = overrides.into_iter().collect();
    let request = EncodeRequest::new(preset, input, output)
        .with_overrides(&forge.overrides(&overrides))
        .with_source(source);
    let command = forge.encoder().compile(&request)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&command_json(&command))?);
    } else {
        println!("{}", command.command_line());
    }

    Ok(())
}

fn command_json(command: &EncodeCommand) -> serde_json::Value {
    serde_json::json!({
        "program": command.program,
        "args": command.args,
        "profile": command.profile,
    })
}

fn encode(
    config_path: Option<&Path>,
    input: &Path,
    output_dir: Option<&Path>,
    presets: Vec<String>,
    overrides: Vec<(Setting, SettingValue)>,
    dry_run: bool,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let forge = Forge::from_config(&config)?;

    if !input.exists() {
        anyhow::bail!("Input file does not exist: {:?}", input);
    }

    let presets = if presets.is_empty() {
        config.encode.presets.clone()
    } else {
        presets
    };
    let output_dir = output_dir
        .map(Path::to_path_buf)
        .or_else(|| config.encode.output_dir.clone())
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_default();

    tracing::info!("Processing file: {:?}", input);
    let source = forge.probe_source(input);
    let overrides: Settings = overrides.into_iter().collect();
    let jobs = forge.plan(input, &output_dir, &presets, &overrides, source)?;

    if dry_run {
        for job in &jobs {
            println!("[{}] {}", job.preset, job.command.command_line());
        }
        println!("\n[DRY RUN] Would produce {} files", jobs.len());
        return Ok(());
    }

    for (i, job) in jobs.iter().enumerate() {
        println!("[{}/{}] {} -> {}", i + 1, jobs.len(), job.preset, job.destination().display());
        let output = forge.run(job)?;
        println!("  done: {}", output.display());
    }

    println!("\nProcessing complete!");
    Ok(())
}

fn presets(config_path: Option<&Path>, name: Option<&str>, json: bool) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let forge = Forge::from_config(&config)?;
    let encoder = forge.encoder();

    if let Some(name) = name {
        let preset = encoder.registry().lookup(name)?;
        let profile = encoder.resolve(name, &config.overrides)?;

        if json {
            println!("{}", serde_json::to_string_pretty(&profile)?);
        } else {
            match &preset.alias_of {
                Some(target) => println!("{} (alias of {})", preset.name, target),
                None => println!("{}", preset.name),
            }
            for (setting, value) in profile.iter() {
                let marker = if preset.settings.contains_key(&setting) { "" } else { "  (default)" };
                println!("  {:<20} {}{}", setting.as_str(), value, marker);
            }
        }
        return Ok(());
    }

    if json {
        let presets: serde_json::Map<String, serde_json::Value> = encoder
            .registry()
            .iter()
            .map(|p| serde_json::to_value(&p.settings).map(|v| (p.name.clone(), v)))
            .collect::<serde_json::Result<_>>()?;
        println!("{}", serde_json::to_string_pretty(&presets)?);
        return Ok(());
    }

    for preset in encoder.registry().iter() {
        let settings: Vec<String> = preset
            .settings
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        match &preset.alias_of {
            Some(target) => println!("{:<10} -> {}", preset.name, target),
            None => println!("{:<10} {}", preset.name, settings.join(" ")),
        }
    }

    Ok(())
}

fn probe_file(config_path: Option<&Path>, file: &Path, json: bool) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let config = config::load_config_or_default(config_path)?;
    let ffprobe = config
        .tools
        .ffprobe_path
        .clone()
        .unwrap_or_else(|| mp4forge_av::FFPROBE.into());
    let media_info = mp4forge_av::probe_with(&ffprobe, file)?;

    if json {
        let json_str = serde_json::to_string_pretty(&media_info)?;
        println!("{}", json_str);
        return Ok(());
    }

    println!("File: {}", media_info.file_path.display());
    println!("Container: {}", media_info.container);
    println!("Size: {} bytes", media_info.file_size);
    if let Some(ref duration) = media_info.duration {
        let secs = duration.as_secs();
        let mins = secs / 60;
        let hours = mins / 60;
        println!("Duration: {:02}:{:02}:{:02}", hours, mins % 60, secs % 60);
    }

    println!("\nVideo Tracks: {}", media_info.video_tracks.len());
    for (i, track) in media_info.video_tracks.iter().enumerate() {
        print!("  [{}] {} {}x{}", i, track.codec, track.width, track.height);
        if let Some(fps) = track.frame_rate {
            print!(", {:.3} fps", fps);
        }
        println!();
    }

    println!("\nAudio Tracks: {}", media_info.audio_tracks.len());
    for (i, track) in media_info.audio_tracks.iter().enumerate() {
        print!("  [{}] {} {}ch", i, track.codec, track.channels);
        if let Some(rate) = track.sample_rate {
            print!(" {} Hz", rate);
        }
        println!();
    }

    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    println!("Checking external tools...\n");

    let statuses = mp4forge_av::check_tools(
        config.tools.ffmpeg_path.as_deref(),
        config.tools.ffprobe_path.as_deref(),
    );
    let mut can_encode = true;

    for status in &statuses {
        let mark = if status.available() {
            "✓"
        } else {
            if status.tool.required_for_encode() {
                can_encode = false;
            }
            "✗"
        };

        print!("{} {}", mark, status.tool);

        if let Some(ref version) = status.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = status.path {
            print!(" - {}", path.display());
        }

        println!();
        println!("    {}", status.tool.purpose());
    }

    println!();
    if !can_encode {
        println!("ffmpeg is missing: encode cannot run. `compile` still works.");
    } else if statuses.iter().all(|s| s.available()) {
        println!("All tools are available!");
    } else {
        println!("ffprobe is missing: encode only works for presets that copy the video stream.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            config::Config::default()
        }
    };

    let registry = config::preset_registry(&config)?;
    println!("  Presets: {} ({} custom)", registry.len(), config.presets.len());
    println!("  Encode presets: {}", config.encode.presets.join(", "));
    println!("  Global overrides: {}", config.overrides.len());
    if let Some(ref dir) = config.encode.output_dir {
        println!("  Output directory: {}", dir.display());
    }

    Ok(())
}
