//! Flag rules: one rendering function per setting.
//!
//! The rule table is static and immutable. Its order fixes the order of the
//! flags inside each [`FlagGroup`]; the order of the groups themselves is
//! fixed by the [`Recipe`](crate::recipe::Recipe).

use crate::codec::{self, Medium};
use crate::derive::{self, DEFAULT_DIMENSIONS_MODULUS, DEFAULT_GOP_DURATION_MS};
use crate::profile::{type_error, Profile};
use crate::setting::{Setting, SettingValue};
use crate::source::SourceInfo;
use crate::{Error, Result};
use std::collections::BTreeMap;

/// Part of the command line a flag belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FlagGroup {
    /// Input analysis flags, placed before the input.
    Global,
    /// Seek and duration flags.
    Trim,
    Audio,
    Video,
    Threads,
}

impl FlagGroup {
    pub const ALL: [FlagGroup; 5] = [
        FlagGroup::Global,
        FlagGroup::Trim,
        FlagGroup::Audio,
        FlagGroup::Video,
        FlagGroup::Threads,
    ];

    /// Name of the recipe placeholder this group fills.
    pub fn placeholder(&self) -> &'static str {
        match self {
            FlagGroup::Global => "global",
            FlagGroup::Trim => "trim",
            FlagGroup::Audio => "audio",
            FlagGroup::Video => "video",
            FlagGroup::Threads => "threads",
        }
    }
}

/// Everything a rule may look at besides its own value.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub profile: &'a Profile,
    pub source: &'a SourceInfo,
}

type RenderFn = fn(&SettingValue, &RenderContext<'_>) -> Result<Vec<String>>;

#[derive(Clone, Copy)]
enum Render {
    /// `flag value`, with the value rendered verbatim.
    Value(&'static str),
    /// A rule that needs other settings or validation.
    With(RenderFn),
}

/// The rendering rule registered for one setting.
#[derive(Clone, Copy)]
pub struct FlagRule {
    pub setting: Setting,
    pub group: FlagGroup,
    render: Render,
}

impl FlagRule {
    const fn value(setting: Setting, group: FlagGroup, flag: &'static str) -> Self {
        Self {
            setting,
            group,
            render: Render::Value(flag),
        }
    }

    const fn with(setting: Setting, group: FlagGroup, render: RenderFn) -> Self {
        Self {
            setting,
            group,
            render: Render::With(render),
        }
    }

    /// Render a value of this rule's setting.
    pub fn render(&self, value: &SettingValue, ctx: &RenderContext<'_>) -> Result<Vec<String>> {
        match self.render {
            Render::Value(flag) => match value {
                SettingValue::Bool(_) | SettingValue::List(_) => {
                    Err(type_error(self.setting, "a single value", value))
                }
                _ => Ok(vec![flag.to_string(), value.to_string()]),
            },
            Render::With(render) => render(value, ctx),
        }
    }
}

impl std::fmt::Debug for FlagRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlagRule")
            .field("setting", &self.setting)
            .field("group", &self.group)
            .finish()
    }
}

use FlagGroup::{Audio, Global, Threads, Trim, Video};

static RULES: [FlagRule; 19] = [
    FlagRule::value(Setting::AnalyzeDuration, Global, "-analyzeduration"),
    FlagRule::value(Setting::ProbeSize, Global, "-probesize"),
    FlagRule::value(Setting::TimeOffset, Trim, "-ss"),
    FlagRule::value(Setting::Duration, Trim, "-t"),
    FlagRule::with(Setting::AudioCodec, Audio, render_audio_codec),
    FlagRule::value(Setting::AudioSampleRate, Audio, "-ar"),
    FlagRule::value(Setting::AudioBitRate, Audio, "-b:a"),
    FlagRule::value(Setting::AudioChannels, Audio, "-ac"),
    FlagRule::value(Setting::AudioSync, Audio, "-async"),
    FlagRule::with(Setting::VideoCodec, Video, render_video_codec),
    FlagRule::with(Setting::Width, Video, render_dimensions),
    FlagRule::with(Setting::AspectRatio, Video, render_aspect_ratio),
    FlagRule::with(Setting::VideoBitRate, Video, render_video_bit_rate),
    FlagRule::with(Setting::FrameRate, Video, render_frame_rate),
    FlagRule::with(Setting::VideoProfile, Video, render_video_profile),
    FlagRule::with(Setting::VideoCodecLevel, Video, render_video_codec_level),
    FlagRule::with(Setting::VideoFilter, Video, render_video_filter),
    FlagRule::with(Setting::EncoderOptions, Video, render_encoder_options),
    FlagRule::value(Setting::Threads, Threads, "-threads"),
];

/// All registered rules, in rendering order.
pub fn rules() -> &'static [FlagRule] {
    &RULES
}

/// The rule that renders a setting, if it has one.
///
/// Settings such as `dimensions_modulus` or `gop_duration` only feed other
/// rules and render nothing themselves.
pub fn rule_for(setting: Setting) -> Option<&'static FlagRule> {
    RULES.iter().find(|rule| rule.setting == setting)
}

/// Rendered flags, grouped for the recipe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledFlags {
    groups: BTreeMap<FlagGroup, Vec<String>>,
}

impl CompiledFlags {
    /// Tokens of a group; empty when nothing in the group was set.
    pub fn group(&self, group: FlagGroup) -> &[String] {
        self.groups.get(&group).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every token, in group order.
    pub fn tokens(&self) -> impl Iterator<Item = &String> {
        self.groups.values().flatten()
    }

    fn push(&mut self, group: FlagGroup, tokens: Vec<String>) {
        if !tokens.is_empty() {
            self.groups.entry(group).or_default().extend(tokens);
        }
    }
}

/// Render every setting of a resolved profile that has a rule.
///
/// Fails on the first invalid setting; nothing is returned in that case.
pub fn compile(profile: &Profile, source: &SourceInfo) -> Result<CompiledFlags> {
    let ctx = RenderContext { profile, source };
    let mut flags = CompiledFlags::default();

    for rule in RULES.iter() {
        let Some(value) = profile.get(rule.setting) else {
            continue;
        };

        let tokens = rule.render(value, &ctx).inspect_err(|_err| {
            #[cfg(feature = "tracing")]
            tracing::error!(setting = %rule.setting, value = %value, error = %_err, "profile validation failed");
        })?;
        flags.push(rule.group, tokens);
    }

    Ok(flags)
}

fn text<'v>(setting: Setting, value: &'v SettingValue) -> Result<&'v str> {
    value
        .as_str()
        .ok_or_else(|| type_error(setting, "a string", value))
}

fn render_codec(medium: Medium, setting: Setting, value: &SettingValue) -> Result<Vec<String>> {
    let name = codec::normalize(medium, text(setting, value)?)?;
    Ok(vec![medium.codec_flag().to_string(), name.to_string()])
}

fn render_audio_codec(value: &SettingValue, _: &RenderContext<'_>) -> Result<Vec<String>> {
    render_codec(Medium::Audio, Setting::AudioCodec, value)
}

fn render_video_codec(value: &SettingValue, _: &RenderContext<'_>) -> Result<Vec<String>> {
    render_codec(Medium::Video, Setting::VideoCodec, value)
}

fn positive(setting: Setting, value: i64) -> Result<u32> {
    u32::try_from(value)
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| Error::profile(setting, format!("must be a positive integer, got {}", value)))
}

// Size and aspect are emitted together, otherwise the player may stretch
// the picture to non-square pixels.
fn render_dimensions(value: &SettingValue, ctx: &RenderContext<'_>) -> Result<Vec<String>> {
    let profile = ctx.profile;
    if profile.is_video_passthrough() {
        return Ok(Vec::new());
    }

    let width = value
        .as_i64()
        .ok_or_else(|| type_error(Setting::Width, "an integer", value))?;
    let width = positive(Setting::Width, width)?;
    let height = profile
        .integer(Setting::Height)?
        .map(|h| positive(Setting::Height, h))
        .transpose()?;
    let modulus = profile
        .integer(Setting::DimensionsModulus)?
        .map(|m| positive(Setting::DimensionsModulus, m))
        .transpose()?
        .unwrap_or(DEFAULT_DIMENSIONS_MODULUS);

    let size = derive::scale_dimensions(width, height, ctx.source.dimensions(), modulus)?;
    let aspect = match profile.text(Setting::AspectRatio)? {
        Some(explicit) => explicit.to_string(),
        None => size.aspect_ratio(),
    };

    Ok(vec![
        "-s".to_string(),
        size.to_string(),
        "-aspect".to_string(),
        aspect,
    ])
}

fn render_aspect_ratio(value: &SettingValue, ctx: &RenderContext<'_>) -> Result<Vec<String>> {
    let profile = ctx.profile;
    if profile.contains(Setting::Width) && !profile.is_video_passthrough() {
        // Already emitted next to the frame size.
        return Ok(Vec::new());
    }
    Ok(vec![
        "-aspect".to_string(),
        text(Setting::AspectRatio, value)?.to_string(),
    ])
}

fn render_video_bit_rate(value: &SettingValue, ctx: &RenderContext<'_>) -> Result<Vec<String>> {
    if ctx.profile.is_video_passthrough() {
        return Ok(Vec::new());
    }
    let rate = match value {
        SettingValue::Int(_) | SettingValue::Float(_) | SettingValue::Text(_) => value.to_string(),
        _ => return Err(type_error(Setting::VideoBitRate, "a bit rate", value)),
    };

    let mut tokens = vec!["-b:v".to_string(), rate.clone()];
    if ctx.profile.flag(Setting::ConstantBitRate)? {
        tokens.extend(["-maxrate".to_string(), rate.clone(), "-bufsize".to_string(), rate]);
    }
    Ok(tokens)
}

fn render_frame_rate(value: &SettingValue, ctx: &RenderContext<'_>) -> Result<Vec<String>> {
    // Rate and keyframe spacing are encoder parameters.
    if ctx.profile.is_video_passthrough() {
        return Ok(Vec::new());
    }
    let rate = match value {
        SettingValue::List(candidates) => derive::select_frame_rate(candidates, ctx.source.frame_rate)
            .ok_or_else(|| Error::profile(Setting::FrameRate, "candidate list is empty"))?,
        other => other
            .as_f64()
            .ok_or_else(|| type_error(Setting::FrameRate, "a number or a list", other))?,
    };
    if !(rate.is_finite() && rate > 0.0) {
        return Err(Error::profile(
            Setting::FrameRate,
            format!("must be positive, got {}", rate),
        ));
    }

    let gop_duration = ctx
        .profile
        .number(Setting::GopDuration)?
        .unwrap_or(f64::from(DEFAULT_GOP_DURATION_MS));
    let interval = derive::keyframe_interval(gop_duration, rate);
    if interval == 0 {
        return Err(Error::profile(
            Setting::GopDuration,
            format!("{} ms at {} fps leaves no frame between keyframes", gop_duration, rate),
        ));
    }

    let interval = interval.to_string();
    Ok(vec![
        "-r".to_string(),
        rate.to_string(),
        "-g".to_string(),
        interval.clone(),
        "-keyint_min".to_string(),
        interval,
    ])
}

fn render_video_profile(value: &SettingValue, ctx: &RenderContext<'_>) -> Result<Vec<String>> {
    if ctx.profile.is_video_passthrough() {
        return Ok(Vec::new());
    }
    Ok(vec![
        "-profile:v".to_string(),
        text(Setting::VideoProfile, value)?.to_string(),
    ])
}

fn render_video_codec_level(value: &SettingValue, ctx: &RenderContext<'_>) -> Result<Vec<String>> {
    if ctx.profile.is_video_passthrough() {
        return Ok(Vec::new());
    }
    let level = match value {
        SettingValue::Text(_) | SettingValue::Int(_) | SettingValue::Float(_) => value.to_string(),
        _ => return Err(type_error(Setting::VideoCodecLevel, "a level", value)),
    };
    Ok(vec!["-level".to_string(), level])
}

fn render_video_filter(value: &SettingValue, ctx: &RenderContext<'_>) -> Result<Vec<String>> {
    if ctx.profile.is_video_passthrough() {
        return Err(Error::profile(
            Setting::VideoFilter,
            "filters cannot be applied to a copied video stream",
        ));
    }
    Ok(vec![
        "-vf".to_string(),
        text(Setting::VideoFilter, value)?.to_string(),
    ])
}

/// `coder=0 bf=0` becomes `-coder 0 -bf 0`.
fn render_encoder_options(value: &SettingValue, ctx: &RenderContext<'_>) -> Result<Vec<String>> {
    if ctx.profile.is_video_passthrough() {
        return Ok(Vec::new());
    }

    let mut tokens = Vec::new();
    for option in text(Setting::EncoderOptions, value)?.split_whitespace() {
        let (key, arg) = match option.split_once('=') {
            Some((key, arg)) => (key, Some(arg)),
            None => (option, None),
        };
        let key = key.trim_start_matches('-');
        if key.is_empty() {
            return Err(Error::profile(
                Setting::EncoderOptions,
                format!("option without a name: {}", option),
            ));
        }
        tokens.push(format!("-{}", key));
        tokens.extend(arg.map(str::to_string));
    }
    Ok(tokens)
}
