//! Error types for mp4forge-encoder.

use crate::codec::Medium;
use crate::setting::Setting;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building presets or compiling a profile.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// The requested preset is not in the registry.
    #[error("unknown preset: {name}")]
    UnknownPreset { name: String },

    /// A codec value outside the allow-list for its medium.
    #[error("unsupported {medium} codec: {value}")]
    UnsupportedCodec { medium: Medium, value: String },

    /// Missing required settings or an inconsistent combination of settings.
    #[error("invalid profile setting {setting}: {message}")]
    Profile { setting: Setting, message: String },

    /// A setting name that is not part of the known set.
    #[error("unknown setting: {name}")]
    UnknownSetting { name: String },

    /// A textual value that could not be parsed for a setting.
    #[error("invalid value for {setting}: {value}")]
    InvalidValue { setting: Setting, value: String },

    /// A preset alias that points at no entry.
    #[error("preset alias {alias} points to missing preset {target}")]
    DanglingAlias { alias: String, target: String },

    /// Preset aliases that point at each other.
    #[error("preset alias cycle: {}", chain.join(" -> "))]
    AliasCycle { chain: Vec<String> },

    /// A recipe placeholder with no matching fragment.
    #[error("unknown recipe placeholder: {{{placeholder}}}")]
    Recipe { placeholder: String },
}

impl Error {
    /// Create an unknown preset error.
    pub fn unknown_preset(name: impl Into<String>) -> Self {
        Self::UnknownPreset { name: name.into() }
    }

    /// Create an unsupported codec error.
    pub fn unsupported_codec(medium: Medium, value: impl Into<String>) -> Self {
        Self::UnsupportedCodec {
            medium,
            value: value.into(),
        }
    }

    /// Create a profile error for a setting.
    pub fn profile(setting: Setting, message: impl Into<String>) -> Self {
        Self::Profile {
            setting,
            message: message.into(),
        }
    }

    /// Create an invalid value error.
    pub fn invalid_value(setting: Setting, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            setting,
            value: value.into(),
        }
    }

    /// Whether this error was raised while validating a resolved profile.
    pub fn is_compile_error(&self) -> bool {
        matches!(self, Self::UnsupportedCodec { .. } | Self::Profile { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::unsupported_codec(Medium::Audio, "vorbis");
        assert_eq!(err.to_string(), "unsupported audio codec: vorbis");

        let err = Error::AliasCycle {
            chain: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "preset alias cycle: a -> b -> a");

        let err = Error::Recipe {
            placeholder: "subtitles".into(),
        };
        assert_eq!(err.to_string(), "unknown recipe placeholder: {subtitles}");
    }

    #[test]
    fn test_is_compile_error() {
        assert!(Error::profile(Setting::Width, "too small").is_compile_error());
        assert!(!Error::unknown_preset("nope").is_compile_error());
    }
}
